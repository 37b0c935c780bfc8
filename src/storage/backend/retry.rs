//! `sessions` 表操作的瞬时错误重试
//!
//! 元数据中间件和 CLI（prune、logout）会并发写同一张表。SQLite 下常见的是
//! `database is locked`，MySQL/PostgreSQL 下是死锁和连接池耗尽，这些都值得重试；
//! 约束冲突、SQL 错误等则立即返回。

use std::future::Future;
use std::time::Duration;

use rand::RngExt;
use sea_orm::DbErr;
use sea_orm::error::RuntimeErr;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// SQLITE_BUSY / SQLITE_LOCKED，MySQL 锁等待超时 / 死锁，PostgreSQL 序列化失败 / 死锁
const CONTENTION_CODES: &[&str] = &["5", "6", "1205", "1213", "40001", "40P01"];

/// 没有错误码时按消息匹配
const CONTENTION_MESSAGES: &[&str] = &[
    "database is locked",
    "database table is locked",
    "deadlock",
    "lock wait timeout",
    "could not serialize access",
];

/// 可重试的错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transient {
    /// 取不到连接或连接断开
    Connection,
    /// 锁冲突
    Contention,
}

/// 判断错误是否瞬时；`None` 表示不应重试
pub fn classify(err: &DbErr) -> Option<Transient> {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => Some(Transient::Connection),
        DbErr::Exec(runtime) | DbErr::Query(runtime) => {
            is_contention(runtime).then_some(Transient::Contention)
        }
        _ => None,
    }
}

fn is_contention(err: &RuntimeErr) -> bool {
    let message = match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            if let Some(code) = sqlx_err.as_database_error().and_then(|db| db.code()) {
                let code: &str = &code;
                return CONTENTION_CODES.contains(&code);
            }
            sqlx_err.to_string()
        }
        RuntimeErr::Internal(msg) => msg.clone(),
        #[allow(unreachable_patterns)]
        _ => return false,
    };

    let message = message.to_lowercase();
    CONTENTION_MESSAGES.iter().any(|m| message.contains(m))
}

/// 重试次数与退避参数，来自 `[database]` 配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 首次执行之后最多再试几次
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl From<&DatabaseConfig> for RetryPolicy {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&DatabaseConfig::default())
    }
}

impl RetryPolicy {
    /// 第 `retry` 次重试（从 1 开始）前的等待：指数增长，封顶 `max_delay`，再加至多 25% 抖动
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        let capped = self.base_delay.saturating_mul(factor).min(self.max_delay);

        let capped_ms = u64::try_from(capped.as_millis()).unwrap_or(u64::MAX);
        let jitter = rand::rng().random_range(0..=capped_ms / 4);
        capped.saturating_add(Duration::from_millis(jitter))
    }
}

/// 执行一次会话表操作，遇到瞬时错误时按策略重试
pub async fn retry_transient<T, F, Fut>(
    policy: RetryPolicy,
    operation: &str,
    mut run: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut retries = 0;
    loop {
        let err = match run().await {
            Ok(value) => {
                if retries > 0 {
                    debug!("Session store {} succeeded after {} retries", operation, retries);
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        let Some(kind) = classify(&err) else {
            return Err(err);
        };

        if retries >= policy.max_retries {
            warn!(
                "Session store {} gave up after {} retries ({:?}): {}",
                operation, retries, kind, err
            );
            return Err(err);
        }

        retries += 1;
        let delay = policy.delay(retries);
        debug!(
            "Session store {} hit {:?} error, retry {}/{} in {:?}: {}",
            operation, kind, retries, policy.max_retries, delay, err
        );
        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn locked() -> DbErr {
        DbErr::Exec(RuntimeErr::Internal(
            "error returned from database: (code: 5) database is locked".to_string(),
        ))
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&locked()), Some(Transient::Contention));
        assert_eq!(
            classify(&DbErr::ConnectionAcquire(
                sea_orm::error::ConnAcquireErr::Timeout
            )),
            Some(Transient::Connection)
        );
        assert_eq!(
            classify(&DbErr::Query(RuntimeErr::Internal(
                "ERROR: could not serialize access due to concurrent update".into()
            ))),
            Some(Transient::Contention)
        );
        assert_eq!(
            classify(&DbErr::Exec(RuntimeErr::Internal(
                "UNIQUE constraint failed: sessions.id".into()
            ))),
            None
        );
        assert_eq!(classify(&DbErr::RecordNotFound("s1".into())), None);
    }

    #[test]
    fn test_policy_from_database_config() {
        let config = DatabaseConfig {
            retry_count: 5,
            retry_base_delay_ms: 20,
            retry_max_delay_ms: 400,
            ..DatabaseConfig::default()
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(20));
        assert_eq!(policy.max_delay, Duration::from_millis(400));
    }

    #[test]
    fn test_delay_grows_and_is_capped() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
        };
        let first = policy.delay(1).as_millis();
        let third = policy.delay(3).as_millis();
        let far = policy.delay(40).as_millis();

        assert!((100..=125).contains(&first));
        assert!((300..=375).contains(&third));
        assert!((300..=375).contains(&far));
    }

    #[tokio::test]
    async fn test_contention_is_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_transient(fast_policy(3), "touch(s1)", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err(locked()) } else { Ok(n) } }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result = retry_transient(fast_policy(2), "delete_expired", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(locked()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result = retry_transient(fast_policy(3), "get(s1)", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), _>(DbErr::Exec(RuntimeErr::Internal(
                    "no such table: sessions".into(),
                )))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

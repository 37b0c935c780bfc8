//! Storage backend tests
//!
//! Tests for SeaOrmSessionStore using temporary SQLite databases.

use chrono::Utc;
use session_manager::config::DatabaseConfig;
use session_manager::storage::backend::infer_backend_from_url;
use session_manager::storage::{SeaOrmSessionStore, SessionRecord, SessionStore, StorageFactory};
use tempfile::TempDir;

/// 创建测试用的会话行
fn create_test_session(id: &str, user: &str, last_activity: i64) -> SessionRecord {
    SessionRecord {
        id: id.to_string(),
        user_id: Some(user.to_string()),
        ip_address: Some("198.51.100.20".to_string()),
        user_agent: Some("Mozilla/5.0".to_string()),
        payload: None,
        last_activity,
    }
}

/// 创建临时 SQLite 数据库的存储实例
async fn create_temp_storage() -> (SeaOrmSessionStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("sessions.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..DatabaseConfig::default()
    };

    let storage = SeaOrmSessionStore::new(&config, "sqlite")
        .await
        .expect("Failed to create storage");

    (storage, temp_dir)
}

#[tokio::test]
async fn test_touch_inserts_and_reads_back() {
    let (storage, _dir) = create_temp_storage().await;
    let now = Utc::now().timestamp();

    storage
        .touch(&create_test_session("s1", "42", now))
        .await
        .unwrap();

    let row = storage.get("s1").await.unwrap().expect("row exists");
    assert_eq!(row.user_id.as_deref(), Some("42"));
    assert_eq!(row.ip_address.as_deref(), Some("198.51.100.20"));
    assert_eq!(row.last_activity, now);
    assert_eq!(row.payload, None);
}

#[tokio::test]
async fn test_touch_updates_existing_row() {
    let (storage, _dir) = create_temp_storage().await;

    storage
        .touch(&create_test_session("s1", "42", 1_000))
        .await
        .unwrap();

    let update = SessionRecord::touch("s1", "42", Some("203.0.113.5".into()), Some("curl".into()), 2_000);
    storage.touch(&update).await.unwrap();

    let row = storage.get("s1").await.unwrap().unwrap();
    assert_eq!(row.ip_address.as_deref(), Some("203.0.113.5"));
    assert_eq!(row.user_agent.as_deref(), Some("curl"));
    assert_eq!(row.last_activity, 2_000);
}

#[tokio::test]
async fn test_active_sessions_cutoff_and_order() {
    let (storage, _dir) = create_temp_storage().await;

    for (id, at) in [("a", 100), ("b", 300), ("c", 200), ("stale", 99)] {
        storage.touch(&create_test_session(id, "1", at)).await.unwrap();
    }
    storage
        .touch(&create_test_session("other", "2", 500))
        .await
        .unwrap();

    let rows = storage.active_sessions("1", 100).await.unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
    assert_eq!(storage.count_active("1", 100).await.unwrap(), 3);
}

#[tokio::test]
async fn test_delete_session_scoped() {
    let (storage, _dir) = create_temp_storage().await;
    storage.touch(&create_test_session("s1", "1", 100)).await.unwrap();

    assert_eq!(storage.delete_session("s1", Some("2")).await.unwrap(), 0);
    assert_eq!(storage.delete_session("s1", Some("1")).await.unwrap(), 1);
    assert_eq!(storage.delete_session("s1", None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_user_sessions_except_current() {
    let (storage, _dir) = create_temp_storage().await;
    for id in ["a", "b", "c"] {
        storage.touch(&create_test_session(id, "1", 100)).await.unwrap();
    }
    storage.touch(&create_test_session("x", "2", 100)).await.unwrap();

    assert_eq!(storage.delete_user_sessions("1", Some("b")).await.unwrap(), 2);
    assert!(storage.get("b").await.unwrap().is_some());
    assert!(storage.get("x").await.unwrap().is_some());

    assert_eq!(storage.delete_user_sessions("1", None).await.unwrap(), 1);
    assert!(storage.get("b").await.unwrap().is_none());
}

#[tokio::test]
async fn test_expired_rows_use_strict_boundary() {
    let (storage, _dir) = create_temp_storage().await;
    storage.touch(&create_test_session("old", "1", 99)).await.unwrap();
    storage.touch(&create_test_session("edge", "1", 100)).await.unwrap();
    storage.touch(&create_test_session("new", "1", 101)).await.unwrap();

    assert_eq!(storage.count_expired(100).await.unwrap(), 1);
    assert_eq!(storage.delete_expired(100).await.unwrap(), 1);
    assert!(storage.get("edge").await.unwrap().is_some());
    assert_eq!(storage.count_active("1", 100).await.unwrap(), 2);
}

#[tokio::test]
async fn test_storage_factory_infers_sqlite() {
    let temp_dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        database_url: temp_dir.path().join("factory.db").display().to_string(),
        ..DatabaseConfig::default()
    };

    let storage = StorageFactory::create(&config).await.unwrap();
    assert_eq!(storage.backend_name(), "sqlite");
    assert_eq!(infer_backend_from_url(&config.database_url).unwrap(), "sqlite");
}

#[tokio::test]
async fn test_touch_preserves_payload() {
    let (storage, _dir) = create_temp_storage().await;

    let mut original = create_test_session("s1", "42", 1_000);
    original.payload = Some("host-session-data".to_string());
    storage.touch(&original).await.unwrap();

    storage
        .touch(&SessionRecord::touch("s1", "42", None, None, 2_000))
        .await
        .unwrap();

    let row = storage.get("s1").await.unwrap().unwrap();
    assert_eq!(row.payload.as_deref(), Some("host-session-data"));
    assert_eq!(row.last_activity, 2_000);
}

//! Session metadata middleware
//!
//! For session drivers that do not write the `sessions` table themselves
//! (redis, file, cookie...), keeps a parallel row per authenticated session so
//! that sessions can be listed and revoked remotely. Writes are throttled per
//! session id.

use std::net::{IpAddr, SocketAddr};
use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
};
use chrono::Utc;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::sync::Cache;
use tracing::{debug, trace, warn};

use crate::config::SessionConfig;
use crate::storage::{SessionRecord, SessionStore};

/// Authenticated session of the current request
///
/// Inserted into the request extensions by the host's auth layer (or by the
/// handler); requests without it are left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub session_id: String,
    pub user_id: String,
}

impl SessionIdentity {
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Middleware factory
#[derive(Clone)]
pub struct SessionMetadata {
    store: Arc<dyn SessionStore>,
    /// touched session keys, expire after `throttle_seconds`
    throttle: Cache<String, ()>,
    enabled: bool,
}

impl SessionMetadata {
    pub fn new(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Self {
        let enabled = !config.uses_database_driver();
        if !enabled {
            debug!("Session driver is 'database', metadata middleware disabled");
        }

        Self {
            store,
            throttle: Cache::builder()
                .time_to_live(config.throttle())
                .max_capacity(100_000)
                .build(),
            enabled,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMetadata
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMetadataService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMetadataService {
            service: Rc::new(service),
            store: self.store.clone(),
            throttle: self.throttle.clone(),
            enabled: self.enabled,
        }))
    }
}

pub struct SessionMetadataService<S> {
    service: Rc<S>,
    store: Arc<dyn SessionStore>,
    throttle: Cache<String, ()>,
    enabled: bool,
}

impl<S, B> Service<ServiceRequest> for SessionMetadataService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let store = self.store.clone();
        let throttle = self.throttle.clone();
        let enabled = self.enabled;

        Box::pin(async move {
            let res = srv.call(req).await?;

            if !enabled {
                return Ok(res);
            }

            let Some(record) = touch_record(&res) else {
                return Ok(res);
            };

            // add-if-absent: only the first request per window writes
            let throttle_key = format!("session-index:touch:{}", record.id);
            if !throttle.entry(throttle_key.clone()).or_insert(()).is_fresh() {
                trace!("Session {} touched recently, skipping", record.id);
                return Ok(res);
            }

            if let Err(e) = store.touch(&record).await {
                warn!("Failed to record session metadata for {}: {}", record.id, e);
                // allow the next request to retry
                throttle.invalidate(&throttle_key);
            }

            Ok(res)
        })
    }
}

/// Build the row to upsert from the finished request
fn touch_record<B>(res: &ServiceResponse<B>) -> Option<SessionRecord> {
    let request = res.request();
    let identity = request.extensions().get::<SessionIdentity>().cloned()?;
    if identity.session_id.is_empty() || identity.user_id.is_empty() {
        return None;
    }

    let ip_address = request
        .connection_info()
        .realip_remote_addr()
        .map(strip_port);

    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    Some(SessionRecord::touch(
        identity.session_id,
        identity.user_id,
        ip_address,
        Some(user_agent),
        Utc::now().timestamp(),
    ))
}

/// `1.2.3.4:5678` / `[::1]:80` → bare address
fn strip_port(addr: &str) -> String {
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }
    match addr.parse::<IpAddr>() {
        Ok(ip) => ip.to_string(),
        Err(_) => addr.to_string(),
    }
}

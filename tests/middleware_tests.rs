//! Middleware tests
//!
//! Tests for the SessionMetadata middleware against an in-memory store.

#![cfg(feature = "server")]

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use actix_web::{App, HttpMessage, HttpRequest, HttpResponse, web};

use session_manager::config::SessionConfig;
use session_manager::middleware::{SessionIdentity, SessionMetadata};
use session_manager::storage::{MemorySessionStore, SessionStore};

// =============================================================================
// Test Setup
// =============================================================================

/// 模拟宿主应用的认证层：从查询参数中读取会话
async fn authenticated(req: HttpRequest) -> HttpResponse {
    let query = req.query_string().to_string();
    let mut session = None;
    let mut user = None;
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some(("sid", v)) => session = Some(v.to_string()),
            Some(("uid", v)) => user = Some(v.to_string()),
            _ => {}
        }
    }
    if let (Some(session), Some(user)) = (session, user) {
        req.extensions_mut()
            .insert(SessionIdentity::new(session, user));
    }
    HttpResponse::Ok().body("ok")
}

fn session_config(driver: &str, throttle_seconds: u64) -> SessionConfig {
    SessionConfig {
        driver: driver.to_string(),
        throttle_seconds,
        ..SessionConfig::default()
    }
}

fn request(uri: &str) -> TestRequest {
    TestRequest::get()
        .uri(uri)
        .peer_addr("203.0.113.9:51234".parse().unwrap())
        .insert_header((header::USER_AGENT, "Mozilla/5.0 (Windows NT 10.0; Win64; x64)"))
}

// =============================================================================
// Tests
// =============================================================================

#[actix_rt::test]
async fn test_authenticated_request_writes_row() {
    let store = Arc::new(MemorySessionStore::new());
    let app = test::init_service(
        App::new()
            .wrap(SessionMetadata::new(store.clone(), &session_config("redis", 60)))
            .route("/", web::get().to(authenticated)),
    )
    .await;

    let resp = test::call_service(&app, request("/?sid=abc&uid=7").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let row = store.get("abc").await.unwrap().expect("row written");
    assert_eq!(row.user_id.as_deref(), Some("7"));
    assert_eq!(row.ip_address.as_deref(), Some("203.0.113.9"));
    assert_eq!(
        row.user_agent.as_deref(),
        Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
    );
    assert!(row.last_activity > 0);
}

#[actix_rt::test]
async fn test_anonymous_request_is_ignored() {
    let store = Arc::new(MemorySessionStore::new());
    let app = test::init_service(
        App::new()
            .wrap(SessionMetadata::new(store.clone(), &session_config("redis", 60)))
            .route("/", web::get().to(authenticated)),
    )
    .await;

    let resp = test::call_service(&app, request("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(store.is_empty());
}

#[actix_rt::test]
async fn test_writes_are_throttled_per_session() {
    let store = Arc::new(MemorySessionStore::new());
    let app = test::init_service(
        App::new()
            .wrap(SessionMetadata::new(store.clone(), &session_config("file", 300)))
            .route("/", web::get().to(authenticated)),
    )
    .await;

    test::call_service(&app, request("/?sid=abc&uid=7").to_request()).await;
    let first = store.get("abc").await.unwrap().unwrap();

    // 手动改写，节流窗口内的请求不应覆盖
    store.insert(session_manager::storage::SessionRecord {
        last_activity: 1,
        ..first.clone()
    });
    test::call_service(&app, request("/?sid=abc&uid=7").to_request()).await;
    assert_eq!(store.get("abc").await.unwrap().unwrap().last_activity, 1);

    // 其他会话不受影响
    test::call_service(&app, request("/?sid=def&uid=7").to_request()).await;
    assert_eq!(store.len(), 2);
}

#[actix_rt::test]
async fn test_database_driver_disables_middleware() {
    let store = Arc::new(MemorySessionStore::new());
    let app = test::init_service(
        App::new()
            .wrap(SessionMetadata::new(store.clone(), &session_config("database", 60)))
            .route("/", web::get().to(authenticated)),
    )
    .await;

    let resp = test::call_service(&app, request("/?sid=abc&uid=7").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(store.is_empty());
}

#[actix_rt::test]
async fn test_forwarded_header_is_used_for_ip() {
    let store = Arc::new(MemorySessionStore::new());
    let app = test::init_service(
        App::new()
            .wrap(SessionMetadata::new(store.clone(), &session_config("redis", 60)))
            .route("/", web::get().to(authenticated)),
    )
    .await;

    let req = request("/?sid=xyz&uid=9")
        .insert_header(("X-Forwarded-For", "198.51.100.77"))
        .to_request();
    test::call_service(&app, req).await;

    let row = store.get("xyz").await.unwrap().unwrap();
    assert_eq!(row.ip_address.as_deref(), Some("198.51.100.77"));
}

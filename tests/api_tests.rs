//! HTTP API tests
//!
//! Full routing over a temporary SQLite database, wired exactly as the
//! server wires it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{App, test};
use async_trait::async_trait;
use chrono::Utc;
use ipshorter::errors::Result;
use ipshorter::runtime::lifetime::startup::StartupContext;
use ipshorter::runtime::modes::server::configure_app;
use ipshorter::services::Mailer;
use ipshorter::storage::{Logger, LoggerStore, Owner, OwnerDirectory, SeaOrmStorage};
use serde_json::{Value, json};
use tempfile::TempDir;

// =============================================================================
// Test Setup
// =============================================================================

#[derive(Default)]
struct RecordingMailer {
    bodies: Mutex<Vec<String>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, _to: &str, _subject: &str, html_body: &str) -> Result<()> {
        self.bodies.lock().unwrap().push(html_body.to_string());
        Ok(())
    }
}

async fn create_context() -> (StartupContext, Arc<RecordingMailer>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!(
        "sqlite://{}?mode=rwc",
        temp_dir.path().join("api.db").display()
    );
    let storage = Arc::new(SeaOrmStorage::open(&db_url, "sqlite", 1).await.unwrap());
    OwnerDirectory::create(
        &*storage,
        &Owner {
            email: "one@example.com".to_string(),
            api_key: "KEY1".to_string(),
        },
    )
    .await
    .unwrap();

    let mailer = Arc::new(RecordingMailer::default());
    let ctx = StartupContext::assemble(storage, mailer.clone(), "ApiKey | IPShorter".to_string());
    (ctx, mailer, temp_dir)
}

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(App::new().configure(|cfg| configure_app(cfg, &$ctx))).await
    };
}

// =============================================================================
// API key issuance
// =============================================================================

#[actix_web::test]
async fn test_get_api_key_issue_then_resend() {
    let (ctx, mailer, _temp) = create_context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/getApiKey")
        .set_form([("email", "new@example.com")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "message": "ApiKey sent to your email" }));

    let req = test::TestRequest::post()
        .uri("/api/getApiKey")
        .set_json(json!({ "email": "new@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "error": "User already has an apiKey, it was resent by email" })
    );

    let bodies = mailer.bodies.lock().unwrap().clone();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0], bodies[1]);
}

#[actix_web::test]
async fn test_get_api_key_invalid_email() {
    let (ctx, _mailer, _temp) = create_context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/getApiKey")
        .set_form([("email", "nope")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid email");
}

// =============================================================================
// Logger lifecycle
// =============================================================================

#[actix_web::test]
async fn test_create_then_conflict_for_other_key() {
    let (ctx, _mailer, _temp) = create_context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/createLogger/KEY1")
        .set_form([("url", "http://example.com")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["url"], "http://example.com");
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(created["dashboard"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/createLogger/KEY2")
        .set_form([("url", "http://example.com")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());

    let req = test::TestRequest::get()
        .uri("/api/getLoggers/KEY2")
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, json!([]));
}

#[actix_web::test]
async fn test_create_requires_url() {
    let (ctx, _mailer, _temp) = create_context().await;
    let app = init_app!(ctx);

    // 缺失请求体与空 url 都视为缺少 url
    let req = test::TestRequest::post()
        .uri("/api/createLogger/KEY1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "url is required" }));

    let req = test::TestRequest::post()
        .uri("/api/createLogger/KEY1")
        .set_json(json!({ "url": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/getLoggers/KEY1")
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, json!([]));
}

#[actix_web::test]
async fn test_create_with_unknown_key() {
    let (ctx, _mailer, _temp) = create_context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/createLogger/KEY9")
        .set_json(json!({ "url": "http://fresh.test" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "KEY9 does not exist as an apiKey");
}

#[actix_web::test]
async fn test_redirect_records_visit() {
    let (ctx, _mailer, _temp) = create_context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/createLogger/KEY1")
        .set_json(json!({ "url": "http://example.com" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let before = Utc::now();
    let req = test::TestRequest::get()
        .uri(&format!("/{}", id))
        .insert_header(("X-Forwarded-For", "203.0.113.7, 10.0.0.1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get("Location").unwrap(), "http://example.com");

    // 访问记录在后台任务中写入，轮询等待
    let mut logger = Value::Null;
    for _ in 0..100 {
        let req = test::TestRequest::get()
            .uri(&format!("/api/getLogger/KEY1/{}", id))
            .to_request();
        logger = test::call_and_read_body_json(&app, req).await;
        if logger["visitors"].as_array().is_some_and(|v| !v.is_empty()) && logger["clicks"] == 1 {
            break;
        }
        actix_rt::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(logger["clicks"], 1);
    let visitors = logger["visitors"].as_array().unwrap();
    assert_eq!(visitors.len(), 1);
    assert_eq!(visitors[0]["ips"], json!(["203.0.113.7", "10.0.0.1"]));
    let clicked_at: chrono::DateTime<Utc> =
        serde_json::from_value(visitors[0]["clickedAt"].clone()).unwrap();
    assert!(clicked_at >= before);
}

#[actix_web::test]
async fn test_url_with_control_characters_never_redirects() {
    let (ctx, _mailer, _temp) = create_context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/createLogger/KEY1")
        .set_json(json!({ "url": "http://example.com/a\nSet-Cookie: x=1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());

    let req = test::TestRequest::get()
        .uri("/api/getLoggers/KEY1")
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, json!([]));

    // 绕过创建校验直接落库的记录也只能得到 400
    LoggerStore::create(
        &*ctx.storage,
        &Logger::new(
            "badurl1".to_string(),
            "http://example.com/b\r\nX-Injected: 1".to_string(),
            "dash-bad".to_string(),
            "KEY1".to_string(),
        ),
    )
    .await
    .unwrap();

    let req = test::TestRequest::get().uri("/badurl1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.headers().get("Location").is_none());

    actix_rt::time::sleep(Duration::from_millis(50)).await;
    let logger = ctx.storage.find_by_id("badurl1").await.unwrap();
    assert_eq!(logger.clicks, 0);
    assert!(logger.visitors.is_empty());
}

#[actix_web::test]
async fn test_redirect_unknown_id() {
    let (ctx, _mailer, _temp) = create_context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/doesnotexist").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.headers().get("Location").is_none());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "error getting the destination url" }));
}

#[actix_web::test]
async fn test_ownership_mismatch_hides_logger() {
    let (ctx, _mailer, _temp) = create_context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/createLogger/KEY1")
        .set_json(json!({ "url": "http://example.com" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap();

    for uri in [
        format!("/api/getLogger/KEY2/{}", id),
        format!("/api/dashboard/KEY2/{}", id),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body: Value = test::read_body_json(resp).await;
        assert!(body.get("url").is_none());
        assert!(body["error"].is_string());
    }
}

#[actix_web::test]
async fn test_get_logger_and_dashboard_are_identical() {
    let (ctx, _mailer, _temp) = create_context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/createLogger/KEY1")
        .set_json(json!({ "url": "http://example.com" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/getLogger/KEY1/{}", id))
        .to_request();
    let via_get = test::call_and_read_body(&app, req).await;
    let req = test::TestRequest::get()
        .uri(&format!("/api/dashboard/KEY1/{}", id))
        .to_request();
    let via_dashboard = test::call_and_read_body(&app, req).await;

    assert_eq!(via_get, via_dashboard);
}

#[actix_web::test]
async fn test_shared_dashboard_by_token() {
    let (ctx, _mailer, _temp) = create_context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/createLogger/KEY1")
        .set_json(json!({ "url": "http://example.com" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let token = created["dashboard"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/shared/{}", token))
        .to_request();
    let shared: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(shared["id"], created["id"]);
    assert_eq!(shared["url"], "http://example.com");
    assert!(shared.get("apiKey").is_none());
}

#[actix_web::test]
async fn test_delete_logger() {
    let (ctx, _mailer, _temp) = create_context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/createLogger/KEY1")
        .set_json(json!({ "url": "http://example.com" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/deleteLogger/KEY2/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/deleteLogger/KEY1/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "message": "logger deleted" }));

    let req = test::TestRequest::get().uri(&format!("/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use edjr_backend::{
    AppState,
    config::Config,
    database::MemoryDocumentStore,
    mailer::{EmailMessage, MailError, Mailer},
    middleware::RateLimiter,
    router::create_router,
};
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-pass";

/// 记录发送的邮件，不做真实投递
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        self.sent.lock().push(message);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    pub config: Config,
}

pub fn test_config() -> Config {
    Config {
        jwt_secret: "integration-secret".into(),
        admin_username: ADMIN_USER.into(),
        admin_password: ADMIN_PASSWORD.into(),
        ..Config::default()
    }
}

pub fn test_app() -> TestApp {
    let config = test_config();
    let limiter = RateLimiter::new(
        config.contact_rate_limit_requests,
        config.contact_rate_limit_window(),
        config.contact_block_duration(),
    )
    .expect("valid limiter config");
    test_app_with(config, limiter)
}

pub fn test_app_with(config: Config, limiter: RateLimiter) -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(
        config.clone(),
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(limiter),
        mailer.clone(),
    );
    TestApp {
        router: create_router(state),
        mailer,
        config,
    }
}

pub fn short_limiter(limit: usize) -> RateLimiter {
    RateLimiter::new(limit, Duration::from_secs(60), Duration::from_secs(300)).unwrap()
}

pub fn basic_auth(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password)))
}

pub fn admin_auth() -> String {
    basic_auth(ADMIN_USER, ADMIN_PASSWORD)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn json_request(method: &str, uri: &str, body: &Value, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(router: &Router, req: Request<Body>) -> Response<Body> {
    router.clone().oneshot(req).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// 创建管理员并登录，返回访问令牌
pub async fn login_token(router: &Router) -> String {
    let created = send(
        router,
        json_request(
            "POST",
            "/users",
            &serde_json::json!({
                "email": "owner@example.com",
                "phone": "+100000",
                "password": "owner-password"
            }),
            Some(&admin_auth()),
        ),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let login = send(
        router,
        json_request(
            "POST",
            "/auth/login",
            &serde_json::json!({
                "email": "owner@example.com",
                "password": "owner-password"
            }),
            None,
        ),
    )
    .await;
    assert_eq!(login.status(), StatusCode::CREATED);
    body_json(login).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string()
}

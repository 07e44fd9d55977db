/// Common test utilities for integration tests
///
/// Tests run the full router over the in-memory store, so no database or
/// external service is needed. Outgoing email lands in a recording fake that
/// tests can inspect.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use serde_json::Value;
use tower::Service as _;

use findmyhelper_api::app::{build_router, AppState};
use findmyhelper_api::config::Config;
use findmyhelper_api::notify::Notifier;
use findmyhelper_api::services::email::{EmailError, EmailMessage, EmailSender};
use findmyhelper_api::services::object_store::LocalObjectStore;
use findmyhelper_shared::auth::password::hash_password;
use findmyhelper_shared::models::{CreateUser, UpdateUser, User};
use findmyhelper_shared::store::{ensure_default_categories, MemoryStore, Store};

/// Captures outgoing mail instead of sending it
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn messages_to(&self, address: &str) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.to == address)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Test context: router over a fresh in-memory store
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub config: Config,
}

impl TestContext {
    pub async fn new() -> Self {
        let config = Config::for_tests();
        let store = Arc::new(MemoryStore::new());
        ensure_default_categories(store.as_ref()).await.unwrap();

        let mailer = Arc::new(RecordingMailer::default());
        let notifier = Notifier::new(
            mailer.clone(),
            config.api.public_base_url.clone(),
            config.admin_notify_address.clone(),
        );
        let objects = Arc::new(LocalObjectStore::new(config.api.public_base_url.clone()));

        let state = AppState::new(store.clone(), config.clone(), notifier, objects);
        let app = build_router(state);

        TestContext {
            app,
            store,
            mailer,
            config,
        }
    }

    /// First seeded category id
    pub async fn category_id(&self) -> i64 {
        self.store.list_categories().await.unwrap()[0].id
    }

    /// Creates a verified local account directly in the store
    pub async fn create_verified_user(&self, email: &str, password: &str) -> User {
        self.store
            .create_user(CreateUser {
                email: email.to_string(),
                password_hash: Some(hash_password(password).unwrap()),
                auth_provider: None,
                full_name: Some("Test User".to_string()),
                phone: None,
                email_verified: true,
                verification_token: None,
            })
            .await
            .unwrap()
    }

    /// Creates a verified admin account
    pub async fn create_admin(&self, email: &str, password: &str) -> User {
        let user = self.create_verified_user(email, password).await;
        self.store
            .update_user(
                user.id,
                UpdateUser {
                    is_admin: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    /// Logs in through the API and returns the session cookie
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .send(request(
                "POST",
                "/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK, "login failed");
        extract_session_cookie(&response).expect("login set no session cookie")
    }

    /// Runs a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }

    /// Runs a request and parses the JSON response
    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.send(request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

/// Builds a request, optionally authenticated and with a JSON body
pub fn request(
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Pulls the `fmh_session` cookie pair out of a response
pub fn extract_session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .filter(|pair| pair.starts_with("fmh_session="))
        .map(|pair| pair.to_string())
}

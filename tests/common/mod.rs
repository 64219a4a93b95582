#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use herald::app::broker::Broker;
use herald::domain::notification::{
    DeliveryMethod, NewNotification, Notification, NotificationType,
};
use herald::domain::user::User;
use herald::infra::directory::UserDirectory;
use herald::infra::mailer::{EmailMessage, Mailer};
use herald::infra::memory::{MemoryDirectory, MemoryStore};
use herald::AppState;

// ---------------------------------------------------------------------------
// Mailer doubles
// ---------------------------------------------------------------------------

/// Accepts every message and keeps it for assertions.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Rejects every message, standing in for a dead relay.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: &EmailMessage) -> Result<()> {
        anyhow::bail!("relay unreachable")
    }
}

// ---------------------------------------------------------------------------
// Directory doubles
// ---------------------------------------------------------------------------

/// Fails every lookup, standing in for an unreachable directory.
pub struct FailingDirectory;

#[async_trait]
impl UserDirectory for FailingDirectory {
    async fn find(&self, _user_id: &str) -> Result<Option<User>> {
        anyhow::bail!("directory unreachable")
    }
}

// ---------------------------------------------------------------------------
// TestApp: memory-backed instance of the full router, one per test
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub directory: Arc<MemoryDirectory>,
    pub mailer: Arc<RecordingMailer>,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None, None)
    }

    /// Same wiring, but every email send fails at the relay.
    pub fn with_failing_mailer() -> Self {
        Self::build(None, Some(Arc::new(FailingMailer)))
    }

    /// Same wiring, but every directory lookup fails.
    pub fn with_failing_directory() -> Self {
        Self::build(Some(Arc::new(FailingDirectory)), None)
    }

    fn build(
        directory_override: Option<Arc<dyn UserDirectory>>,
        mailer_override: Option<Arc<dyn Mailer>>,
    ) -> Self {
        let directory = Arc::new(MemoryDirectory::new());
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState {
            store: Arc::new(MemoryStore::new()),
            directory: directory_override.unwrap_or_else(|| directory.clone()),
            mailer: mailer_override.unwrap_or_else(|| mailer.clone()),
            broker: Arc::new(Broker::new()),
        };

        let router = herald::http::router(state.clone());

        TestApp {
            router,
            state,
            directory,
            mailer,
        }
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        let request = if let Some(body) = body {
            builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        } else {
            builder.body(Body::empty()).unwrap()
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str) -> TestResponse {
        self.request(Method::PATCH, path, None).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path, None).await
    }

    // ------------------------------------------------------------------
    // Test data helpers
    // ------------------------------------------------------------------

    /// Register a user in the directory with a derived email address.
    pub fn seed_user(&self, id: &str, name: &str) {
        self.directory
            .put(User {
                id: id.to_string(),
                name: name.to_string(),
                email: Some(format!("{}@example.com", id)),
            })
            .expect("seed user failed");
    }

    /// Register a user the directory knows but has no email address for.
    pub fn seed_user_without_email(&self, id: &str, name: &str) {
        self.directory
            .put(User {
                id: id.to_string(),
                name: name.to_string(),
                email: None,
            })
            .expect("seed user failed");
    }

    /// Insert an in-app notification directly through the store. Returns
    /// the stored row.
    pub async fn create_notification(&self, user_id: &str, title: &str) -> Notification {
        self.state
            .store
            .insert(NewNotification {
                user_id: user_id.to_string(),
                kind: NotificationType::System,
                delivery_method: DeliveryMethod::InApp,
                title: title.to_string(),
                message: format!("{} body", title),
            })
            .await
            .expect("insert notification failed")
    }

    /// Serve the app on an ephemeral local port for tests that need a live
    /// socket. The task is dropped with the test runtime.
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind failed");
        let addr = listener.local_addr().expect("local_addr failed");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve failed");
        });
        addr
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// An unread in-app notification, fully populated, as a push or seed would
/// carry it.
pub fn sample_notification(user_id: &str) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        kind: NotificationType::System,
        delivery_method: DeliveryMethod::InApp,
        title: "maintenance window".to_string(),
        message: "the scheduler restarts at midnight".to_string(),
        is_read: false,
        created_at: OffsetDateTime::now_utc(),
    }
}

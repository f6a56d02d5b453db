/// Common test utilities for API integration tests
///
/// Builds the full router over an in-memory store, with a seeded user and a
/// signed access token for them.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::Duration;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tally_api::app::{build_router, AppState};
use tally_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use tally_shared::auth::jwt::Claims;
use tally_shared::models::user::User;
use tally_shared::store::MemoryStore;
use tower::Service as _;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
    pub user: User,
    pub token: String,
}

impl TestContext {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("alice@example.com").await;
        let token = token_for(user.id);

        let state = AppState::new(store.clone(), test_config());
        let app = build_router(state);

        TestContext {
            store,
            app,
            user,
            token,
        }
    }

    /// Seeds another user and returns them with a token
    pub async fn other_user(&self, email: &str) -> (User, String) {
        let user = self.store.add_user(email).await;
        let token = token_for(user.id);
        (user, token)
    }

    /// Sends a request as the seeded user
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(&self.token, method, uri, body).await
    }

    /// Sends a request with an explicit bearer token
    pub async fn send_as(
        &self,
        token: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", token));
        self.dispatch(request, body).await
    }

    /// Sends a request without credentials
    pub async fn send_anonymous(&self, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        self.dispatch(request, None).await
    }

    async fn dispatch(
        &self,
        request: axum::http::request::Builder,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, value)
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://localhost/unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
        },
    }
}

/// Signs an access token for `user_id` the way the auth service does
pub fn token_for(user_id: Uuid) -> String {
    sign(&Claims::new(user_id, Duration::hours(1)), TEST_SECRET)
}

pub fn sign(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

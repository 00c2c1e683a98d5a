//! Common test utilities and helpers
//!
//! - `TestApp` - the router over in-memory stores, driven with `oneshot`
//! - `seed_user` - insert an account straight into the user store
//! - `serve` / `serve_with` - bind the router to an ephemeral port for socket tests

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use surfchat::backend::auth::users::User;
use surfchat::backend::server::{build_app, AppState};
use surfchat::backend::store::Stores;
use surfchat::shared::ServerConfig;

pub const ADMIN_EMAIL: &str = "admin@surf.test";

/// Configuration with a cheap bcrypt cost
pub fn test_config() -> ServerConfig {
    ServerConfig::builder()
        .admin_email(ADMIN_EMAIL)
        .jwt_secret("integration-secret")
        .bcrypt_cost(4)
        .build()
        .unwrap()
}

pub struct TestApp {
    pub router: Router<()>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let (router, state) = build_app(test_config(), Stores::in_memory());
        Self { router, state }
    }

    /// Send a request and decode the JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, &[]).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), &[]).await
    }

    pub async fn seed_user(&self, username: &str, email: &str) -> User {
        seed_user(&self.state, username, email).await
    }

    /// Create a group through the API and return its JSON
    pub async fn create_group(&self, name: &str, password: &str, user_id: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/groups/create",
                serde_json::json!({ "name": name, "password": password, "userId": user_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", body);
        body["group"].clone()
    }
}

/// Insert an account without going through signup
pub async fn seed_user(state: &AppState, username: &str, email: &str) -> User {
    let user = User::new(
        username.to_string(),
        email.to_string(),
        String::new(),
        Some(username.to_string()),
    );
    state.stores.users.insert(user).await.unwrap()
}

/// Serve a fresh app on an ephemeral port
pub async fn serve() -> (SocketAddr, AppState) {
    serve_with(test_config()).await
}

/// Serve a fresh app built from `config` on an ephemeral port
pub async fn serve_with(config: ServerConfig) -> (SocketAddr, AppState) {
    let (router, state) = build_app(config, Stores::in_memory());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, state)
}

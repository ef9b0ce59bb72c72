//! Common test utilities for goalpost integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use goalpost_service::{create_router, AppState, ServiceConfig};
use goalpost_store::RocksStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(Arc::new(store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
        }
    }

    /// Register a profile and return its user ID.
    pub async fn create_user(&self, username: &str) -> String {
        let response = self
            .server
            .post("/v1/users")
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
            }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["user_id"].as_str().expect("user_id in response").to_string()
    }

    /// Register a profile and grant it a starting balance.
    pub async fn create_funded_user(&self, username: &str, balance_minutes: i64) -> String {
        let user_id = self.create_user(username).await;

        if balance_minutes > 0 {
            self.server
                .post("/v1/credits/add")
                .json(&json!({
                    "user_id": user_id,
                    "amount_minutes": balance_minutes,
                    "description": "Test funding",
                }))
                .await
                .assert_status_ok();
        }

        user_id
    }

    /// Register a field and return its ID.
    pub async fn create_field(&self, code: &str) -> String {
        let response = self
            .server
            .post("/v1/fields")
            .json(&json!({
                "code": code,
                "description": format!("Test field {code}"),
            }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["field_id"].as_str().expect("field_id in response").to_string()
    }

    /// Add a player to a field and return the player ID.
    pub async fn add_player(&self, field_id: &str, name: &str) -> String {
        let response = self
            .server
            .post(&format!("/v1/fields/{field_id}/players"))
            .json(&json!({ "name": name }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["player_id"].as_str().expect("player_id in response").to_string()
    }

    /// Start a session and return the session ID.
    pub async fn start_session(&self, user_id: &str) -> String {
        let response = self
            .server
            .post("/v1/sessions")
            .json(&json!({ "user_id": user_id }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["session_id"].as_str().expect("session_id in response").to_string()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

//! Goalpost HTTP client implementation.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientError;
use crate::types::{
    AddCreditsRequest, AddCreditsResponse, ApiErrorResponse, BalanceResponse, CreateUserRequest,
    FieldResponse, OpenSessionResponse, PlayerResponse, RecordEventRequest, RecordEventResponse,
    StartSessionResponse, StatLineResponse, StopSessionResponse, SuccessResponse, UserResponse,
};

/// Maximum retry attempts for retryable requests.
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration for retries (doubles with each attempt).
const INITIAL_BACKOFF_MS: u64 = 100;

/// Maximum backoff duration for retries.
const MAX_BACKOFF_MS: u64 = 2000;

/// Goalpost API client.
///
/// Reads and `start_session` are retried on transport failures with
/// exponential backoff: a start retry is safe because the server adopts the
/// already-open session instead of opening a second one. `stop_session` is
/// never auto-retried, since a retry after an ambiguous failure could report
/// a conflict for a stop that actually landed.
#[derive(Debug, Clone)]
pub struct GoalpostClient {
    client: Client,
    base_url: String,
}

impl GoalpostClient {
    /// Create a new goalpost client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the goalpost service (e.g., `"http://goalpost:8080"`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_options(base_url, &ClientOptions::default())
    }

    /// Create a new goalpost client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn with_options(base_url: impl Into<String>, options: &ClientOptions) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    // ========================================================================
    // Users & credits
    // ========================================================================

    /// Register a new profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_user(
        &self,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<UserResponse, ClientError> {
        let body = CreateUserRequest {
            username: username.into(),
            email: email.into(),
        };
        self.send_once(self.post("/v1/users").json(&body)).await
    }

    /// All registered profiles (admin). Retried on transport failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_users(&self) -> Result<Vec<UserResponse>, ClientError> {
        self.send_retrying(Method::GET, "/v1/admin/users", &[], None::<&()>)
            .await
    }

    /// A user's balance and recent ledger entries. Retried on transport
    /// failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_balance(&self, user_id: &str) -> Result<BalanceResponse, ClientError> {
        self.send_retrying(
            Method::GET,
            &format!("/v1/users/{user_id}/balance"),
            &[],
            None::<&()>,
        )
        .await
    }

    /// Grant credits to a user (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn add_credits(
        &self,
        request: AddCreditsRequest,
    ) -> Result<AddCreditsResponse, ClientError> {
        self.send_once(self.post("/v1/credits/add").json(&request))
            .await
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Start (or adopt) a session. Retried on transport failures: the server
    /// adopts the open session, so a duplicate start converges rather than
    /// double-opening.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InsufficientBalance`] when the balance is
    /// empty, or other errors if the request fails.
    pub async fn start_session(&self, user_id: &str) -> Result<StartSessionResponse, ClientError> {
        let body = serde_json::json!({ "user_id": user_id });
        self.send_retrying(Method::POST, "/v1/sessions", &[], Some(&body))
            .await
    }

    /// Stop a session and charge elapsed minutes. Never auto-retried.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session was already
    /// closed.
    pub async fn stop_session(&self, session_id: &str) -> Result<StopSessionResponse, ClientError> {
        self.send_once(
            self.post(&format!("/v1/sessions/{session_id}/stop"))
                .json(&serde_json::json!({})),
        )
        .await
    }

    /// All open sessions (admin). Retried on transport failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_open_sessions(&self) -> Result<Vec<OpenSessionResponse>, ClientError> {
        self.send_retrying(Method::GET, "/v1/admin/sessions/open", &[], None::<&()>)
            .await
    }

    /// Remove a stuck session without charging (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is unknown.
    pub async fn delete_session(&self, session_id: &str) -> Result<SuccessResponse, ClientError> {
        self.send_once(
            self.client
                .delete(format!("{}/v1/admin/sessions/{session_id}", self.base_url)),
        )
        .await
    }

    // ========================================================================
    // Fields, players, events
    // ========================================================================

    /// Register a new field.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_field(
        &self,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<FieldResponse, ClientError> {
        let body = serde_json::json!({
            "code": code.into(),
            "description": description.into(),
        });
        self.send_once(self.post("/v1/fields").json(&body)).await
    }

    /// Search fields by code or description. Retried on transport failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn find_fields(&self, query: &str) -> Result<Vec<FieldResponse>, ClientError> {
        self.send_retrying(Method::GET, "/v1/fields", &[("query", query)], None::<&()>)
            .await
    }

    /// Add a player to a field.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the field is unknown.
    pub async fn add_player(
        &self,
        field_id: &str,
        name: impl Into<String>,
        roles: Vec<goalpost_core::PlayerRole>,
    ) -> Result<PlayerResponse, ClientError> {
        let body = serde_json::json!({ "name": name.into(), "roles": roles });
        self.send_once(
            self.post(&format!("/v1/fields/{field_id}/players"))
                .json(&body),
        )
        .await
    }

    /// Flip a player's activation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the player is unknown.
    pub async fn toggle_player(&self, player_id: &str) -> Result<PlayerResponse, ClientError> {
        self.send_once(self.post(&format!("/v1/players/{player_id}/toggle")))
            .await
    }

    /// Log an in-game event. Requires the user to hold an open session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NoOpenSession`] when the user has no session.
    pub async fn record_event(
        &self,
        request: RecordEventRequest,
    ) -> Result<RecordEventResponse, ClientError> {
        self.send_once(self.post("/v1/events").json(&request)).await
    }

    /// Ranked stat lines for a field. Retried on transport failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the field is unknown.
    pub async fn field_stats(
        &self,
        field_id: &str,
        period: &str,
        sort: &str,
        order: &str,
    ) -> Result<Vec<StatLineResponse>, ClientError> {
        self.send_retrying(
            Method::GET,
            &format!("/v1/fields/{field_id}/stats"),
            &[("period", period), ("sort", sort), ("order", order)],
            None::<&()>,
        )
        .await
    }

    /// Remove a field's most recent event (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] when the field has no events.
    pub async fn undo_last_event(&self, field_id: &str) -> Result<SuccessResponse, ClientError> {
        let body = serde_json::json!({ "field_id": field_id });
        self.send_once(self.post("/v1/admin/events/undo").json(&body))
            .await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(format!("{}{path}", self.base_url))
    }

    /// Send without retry; used for everything not safe to repeat.
    async fn send_once<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Send with bounded exponential-backoff retry on transport failures.
    /// Server error responses are returned immediately, never retried.
    async fn send_retrying<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let mut backoff_ms = INITIAL_BACKOFF_MS;
        let mut attempt = 0;

        loop {
            let mut request = self.client.request(method.clone(), &url);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => return Self::handle_response(response).await,
                Err(err) if attempt < MAX_RETRIES => {
                    attempt += 1;
                    tracing::warn!(
                        error = %err,
                        attempt,
                        backoff_ms,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let message = api_error.error.message;

                match code {
                    "insufficient_balance" => {
                        let balance = api_error
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get("balance"))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0);
                        let required = api_error
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get("required"))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0);

                        Err(ClientError::InsufficientBalance { balance, required })
                    }
                    "not_found" => Err(ClientError::NotFound { message }),
                    "no_open_session" => Err(ClientError::NoOpenSession { message }),
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn start_session_parses_adoption_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "session_id": "0c6f1c9e-9f7a-4f8e-9f11-31bb2f1a2b3c",
                "adopted": true,
                "started_at": "2026-08-30T10:00:00Z",
            })))
            .mount(&server)
            .await;

        let client = GoalpostClient::new(server.uri());
        let response = client.start_session("some-user").await.unwrap();
        assert!(response.adopted);
    }

    #[tokio::test]
    async fn insufficient_balance_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/sessions"))
            .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
                "error": {
                    "code": "insufficient_balance",
                    "message": "insufficient balance: balance=0, required=1",
                    "details": { "balance": 0, "required": 1 },
                }
            })))
            .mount(&server)
            .await;

        let client = GoalpostClient::new(server.uri());
        let result = client.start_session("some-user").await;
        assert!(matches!(
            result,
            Err(ClientError::InsufficientBalance {
                balance: 0,
                required: 1
            })
        ));
    }

    #[tokio::test]
    async fn no_open_session_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/events"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "error": {
                    "code": "no_open_session",
                    "message": "user has no open session",
                }
            })))
            .mount(&server)
            .await;

        let client = GoalpostClient::new(server.uri());
        let result = client
            .record_event(RecordEventRequest {
                user_id: "u".into(),
                player_id: "p".into(),
                kind: goalpost_core::EventKind::Goal,
                timestamp: None,
            })
            .await;
        assert!(matches!(result, Err(ClientError::NoOpenSession { .. })));
    }

    #[tokio::test]
    async fn field_search_encodes_the_query_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/fields"))
            .and(query_param("query", "north pitch & annex"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "field_id": "0c6f1c9e-9f7a-4f8e-9f11-31bb2f1a2b3c",
                "code": "NP1",
                "description": "north pitch & annex",
            }])))
            .mount(&server)
            .await;

        let client = GoalpostClient::new(server.uri());
        let fields = client.find_fields("north pitch & annex").await.unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].code, "NP1");
    }

    #[tokio::test]
    async fn stats_query_carries_window_and_ordering() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/fields/f1/stats"))
            .and(query_param("period", "month"))
            .and(query_param("sort", "saves"))
            .and(query_param("order", "asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = GoalpostClient::new(server.uri());
        let lines = client.field_stats("f1", "month", "saves", "asc").await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn server_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/admin/sessions/open"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": { "code": "internal_error", "message": "boom" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GoalpostClient::new(server.uri());
        let result = client.list_open_sessions().await;
        assert!(matches!(result, Err(ClientError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn stop_session_reports_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/sessions/abc/stop"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "minutes_used": 7,
                "credits_charged": 5,
                "new_balance": 0,
            })))
            .mount(&server)
            .await;

        let client = GoalpostClient::new(server.uri());
        let receipt = client.stop_session("abc").await.unwrap();
        assert_eq!(receipt.minutes_used, 7);
        assert_eq!(receipt.credits_charged, 5);
        assert_eq!(receipt.new_balance, 0);
    }
}

//! Client error types.

/// Errors that can occur when using the goalpost client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a server response (connect failure,
    /// timeout, or a dropped connection). Retries are applied before this
    /// surfaces, and only for operations that are safe to repeat.
    #[error("transport failure: {0}")]
    TransportFailure(#[source] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Insufficient credit balance.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance in minutes.
        balance: i64,
        /// Required amount in minutes.
        required: i64,
    },

    /// Resource not found.
    #[error("not found: {message}")]
    NotFound {
        /// Server-provided detail.
        message: String,
    },

    /// Operation requires an open session.
    #[error("no open session: {message}")]
    NoOpenSession {
        /// Server-provided detail.
        message: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::TransportFailure(err)
    }
}

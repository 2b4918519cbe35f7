use thiserror::Error;

/// Failure taxonomy shared by both backend clients.
///
/// Only [`ClientError::Network`] and [`ClientError::Server`] are transient;
/// everything else propagates to the caller on the first occurrence.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response received: timeout, DNS failure, connection refused.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a 5xx status.
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },

    /// The backend rejected the request with a non-retryable status.
    #[error("request rejected with status {status}: {body}")]
    Client { status: u16, body: String },

    /// 401/403 from the server, or a locally detected invalid token.
    #[error("authentication failed: {body}")]
    Auth { status: Option<u16>, body: String },

    /// Malformed token payload or a response body that is not valid JSON.
    #[error("decode error: {0}")]
    Decode(String),

    /// Task-name dispatch received a name outside the known task set.
    #[error("unsupported task type: {0}")]
    UnsupportedTask(String),

    /// The token storage backend failed to read or write.
    #[error("token storage error: {0}")]
    Storage(String),

    /// The caller abandoned the request through its cancellation handle.
    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Whether the failure is eligible for automatic retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server { .. })
    }
}

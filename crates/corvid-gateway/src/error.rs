//! Error types for the Gateway transports.

/// Errors produced by the REST and realtime transports.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// `WebSocket` transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    /// HTTP error from the REST API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `WebSocket` connection closed with a code.
    #[error("Connection closed with code {0}")]
    Closed(u16),

    /// Authentication failed (close code 4004).
    #[error("Authentication failed (close code 4004)")]
    AuthenticationFailed,

    /// Invalid or disallowed intents (close code 4013 or 4014).
    #[error("Invalid or disallowed intents (close code {0})")]
    InvalidIntents(u16),

    /// Unrecoverable close code from the platform.
    #[error("Unrecoverable close code: {0}")]
    UnrecoverableClose(u16),

    /// The Gateway did not send a Hello payload in time.
    #[error("Timed out waiting for Hello from the Gateway")]
    HelloTimeout,

    /// Reconnect attempts were exhausted.
    #[error("Reconnect attempts exhausted after {0} tries")]
    ReconnectsExhausted(u32),

    /// `run` was called before `start` established a connection.
    #[error("Connection was not started")]
    NotStarted,

    /// Protocol violation from the Gateway.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for GatewayError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

impl GatewayError {
    /// Returns `true` if the error can never be recovered by
    /// reconnecting.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed
                | Self::InvalidIntents(_)
                | Self::UnrecoverableClose(_)
                | Self::ReconnectsExhausted(_)
                | Self::NotStarted
        )
    }
}

/// Result type for Gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

//! Error Types

use thiserror::Error;

/// Result type alias for paydesk operations
pub type Result<T> = std::result::Result<T, DeskError>;

/// Paydesk error types
///
/// Every variant is handled at the HTTP boundary; only `Config` is fatal,
/// and only at startup.
#[derive(Error, Debug)]
pub enum DeskError {
    /// Form input missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Path/identifier input malformed (empty token, non-numeric id)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Payment API returned a failure or was unreachable
    #[error("Remote call failed: {0}")]
    RemoteCall(String),

    /// Payment API response lacked a field the flow depends on
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DeskError {
    /// Nothing is retried automatically: ephemeral tokens are single-use.
    pub const fn is_retryable(&self) -> bool {
        false
    }

    /// Whether the failure came from the caller's input rather than the remote side
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidInput(_))
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => format!("Please check the form: {msg}"),
            Self::InvalidInput(msg) => format!("Invalid request: {msg}"),
            Self::RemoteCall(msg) | Self::Integrity(msg) => msg.clone(),
            Self::Config(_) => "Service configuration error.".into(),
        }
    }

    /// Underlying reason without the category prefix
    pub fn reason(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::InvalidInput(msg)
            | Self::RemoteCall(msg)
            | Self::Integrity(msg)
            | Self::Config(msg) => msg,
        }
    }
}

//! Gateway error types.

use thiserror::Error;

/// Errors reported by the remote collection gateway and everything layered on it.
///
/// Nothing in this crate retries on any of these; a retry is always a new
/// user-initiated request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The session token was rejected (or there is none). The stored token has
    /// been cleared and the user has to sign in again.
    #[error("Session is not valid. Log in again.")]
    Unauthorized,

    /// No connectivity, connection reset or request timeout
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// Any other non-2xx response, or a 2xx body that could not be decoded
    #[error("Server error ({status}): {message}")]
    ServerFault { status: u16, message: String },

    /// Client-side check failed; nothing was sent
    #[error("Invalid input: {0}")]
    ValidationFailure(String),
}

impl GatewayError {
    /// Returns true if the session ended and re-authentication is needed.
    pub fn is_session_ended(&self) -> bool {
        matches!(self, GatewayError::Unauthorized)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::ServerFault {
                status: e.status().map(|s| s.as_u16()).unwrap_or(200),
                message: format!("unreadable response body: {}", e),
            }
        } else if let Some(status) = e.status() {
            GatewayError::ServerFault {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            GatewayError::NetworkFailure(e.to_string())
        }
    }
}

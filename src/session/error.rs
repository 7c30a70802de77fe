use std::time::Duration;
use thiserror::Error;

/// Why an identity or logout call did not succeed
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No session cookie present")]
    NoCookie,

    #[error("Backend answered with status {0}")]
    Status(u16),

    #[error("Backend request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid identity payload: {0}")]
    Decode(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SessionError {
    /// True when the backend actually answered and refused the session
    pub fn is_rejection(&self) -> bool {
        matches!(self, SessionError::NoCookie | SessionError::Status(401 | 403))
    }
}

// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::session::SessionError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (identity backend misbehaved)
    BadGateway(String),

    // 504 Gateway Timeout (identity backend too slow)
    GatewayTimeout(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::GatewayTimeout(_) => 504,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::BadGateway(msg)
            | ApiError::GatewayTimeout(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::GatewayTimeout(_) => "GATEWAY_TIMEOUT",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        ApiError::GatewayTimeout(message.into())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NoCookie => ApiError::unauthorized("No active session"),
            SessionError::Status(401) | SessionError::Status(403) => {
                ApiError::unauthorized("Session rejected by backend")
            }
            SessionError::Status(status) => {
                tracing::error!("Identity backend answered {}", status);
                ApiError::bad_gateway("Identity backend error")
            }
            SessionError::Timeout(after) => {
                tracing::error!("Identity backend timed out after {:?}", after);
                ApiError::gateway_timeout("Identity backend did not answer in time")
            }
            SessionError::Transport(e) => {
                // Log the real error but return generic message
                tracing::error!("Identity backend unreachable: {}", e);
                ApiError::bad_gateway("Identity backend unreachable")
            }
            SessionError::Decode(msg) => {
                tracing::error!("Identity payload could not be decoded: {}", msg);
                ApiError::bad_gateway("Identity backend sent an invalid payload")
            }
            SessionError::InvalidUrl(e) => {
                tracing::error!("Identity backend URL is invalid: {}", e);
                ApiError::internal_server_error("Identity backend misconfigured")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn session_rejections_map_to_unauthorized() {
        for err in [SessionError::NoCookie, SessionError::Status(401), SessionError::Status(403)] {
            assert_eq!(ApiError::from(err).status_code(), 401);
        }
    }

    #[test]
    fn backend_failures_map_to_gateway_errors() {
        assert_eq!(ApiError::from(SessionError::Status(500)).status_code(), 502);
        assert_eq!(ApiError::from(SessionError::Decode("eof".into())).status_code(), 502);
        assert_eq!(
            ApiError::from(SessionError::Timeout(Duration::from_secs(1))).status_code(),
            504
        );
    }

    #[test]
    fn json_body_carries_code() {
        let body = ApiError::not_found("No route for /api/x").to_json();
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "No route for /api/x");
    }
}

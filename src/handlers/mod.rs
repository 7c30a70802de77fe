// Edge server handlers; pages themselves are static files behind the route guard

pub mod health;
pub mod session;

pub use health::health;

use axum::http::Uri;

use crate::error::ApiError;

/// Fallback when no static dir is configured
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

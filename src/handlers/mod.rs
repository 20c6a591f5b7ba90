// handlers/mod.rs - Two-tier handler layout
//
// Public (no token) → Protected (bearer token verified, fail-open)

pub mod protected;
pub mod public;

use axum::http::Uri;

use crate::error::ApiError;

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

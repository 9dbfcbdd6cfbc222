//! Authentication middleware
//!
//! Clients present the shared API key in `X-API-Key` or as a bearer token.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::AppState;

/// Header carrying the client API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests that do not carry the configured client API key
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = match extract_api_key(request.headers()) {
        Some(key) => key,
        None => {
            return AppError::Unauthorized(
                "Missing API key - provide it in the X-API-Key header".to_string(),
            )
            .into_response();
        }
    };

    if provided != state.config.auth.client_api_key {
        tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
        return AppError::Unauthorized("Invalid API key".to_string()).into_response();
    }

    next.run(request).await
}

/// API key from `X-API-Key`, falling back to `Authorization: Bearer <key>`
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|h| h.to_str().ok()) {
        return Some(key.trim().to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|key| key.trim().to_string())
}

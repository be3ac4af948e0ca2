//! Dashboard API key authentication middleware.
//!
//! This middleware intercepts every dashboard request to:
//! 1. Extract the key from the Authorization header
//! 2. Hash it and compare with the configured hash
//! 3. Reject unauthorized requests with HTTP 401

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::{error::AppError, state::AppState};

/// Hex-encoded SHA-256 of a presented key.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Dashboard authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <key>` header from request
/// 2. Hash the `<key>` using SHA-256
/// 3. Compare with `DASHBOARD_API_KEY_HASH` (case-insensitive hex)
/// 4. If equal: call next handler, otherwise 401 Unauthorized
///
/// Only the hash of the key is kept in configuration, so a leaked `.env`
/// does not leak the key itself.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidApiKey)?;

    // Expected format: "Bearer <key>"
    let api_key = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidApiKey)?;

    if !hash_key(api_key).eq_ignore_ascii_case(state.dashboard_key_hash.trim()) {
        tracing::warn!("Rejected dashboard request with invalid API key");
        return Err(AppError::InvalidApiKey);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_key_as_lowercase_hex_sha256() {
        assert_eq!(
            hash_key("secret"),
            "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
    }
}

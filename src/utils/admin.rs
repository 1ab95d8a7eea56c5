use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::{config::Config, error::AppError};

/// Header carrying the shared admin secret.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Axum Middleware: Admin Authorization.
///
/// Compares the `x-admin-token` header with `ADMIN_TOKEN`. When no token is
/// configured every admin request is refused.
pub async fn admin_token_middleware(
    State(config): State<Config>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let expected = config
        .admin_token
        .as_deref()
        .ok_or_else(|| AppError::AuthError("Admin operations are disabled".to_string()))?;

    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    if !provided.is_some_and(|token| tokens_match(token, expected)) {
        tracing::warn!("Rejected admin request to {}", req.uri().path());
        return Err(AppError::AuthError("Invalid admin token".to_string()));
    }

    Ok(next.run(req).await)
}

/// Compares SHA-256 digests so the running time does not depend on where the
/// two tokens first differ, nor on their lengths.
fn tokens_match(provided: &str, expected: &str) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

//! Password hashing and the bearer-token authorization gate.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::error::ApiError;
use crate::AppState;

const BEARER_SCHEME: &str = "bearer";

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Middleware protecting authenticated routes.
///
/// Expects `Authorization: Bearer <token>`; the scheme comparison is
/// case-insensitive. On success the verified payload is attached to the
/// request extensions so downstream handlers can resolve the caller's
/// account id.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    if header_value.is_empty() {
        return Err(ApiError::unauthorized(
            "authorization header is not provided",
        ));
    }

    let mut fields = header_value.split_whitespace();
    let (scheme, credential) = match (fields.next(), fields.next()) {
        (Some(scheme), Some(credential)) => (scheme, credential),
        _ => {
            return Err(ApiError::unauthorized(
                "invalid authorization header format",
            ))
        }
    };

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(ApiError::unauthorized("unsupported authorization type"));
    }

    let payload = state
        .token_maker
        .verify_token(credential)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    request.extensions_mut().insert(payload);
    Ok(next.run(request).await)
}

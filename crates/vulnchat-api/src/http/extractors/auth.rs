//! Session token authentication extractors.
//!
//! Extracts session tokens from:
//! - `Authorization: Bearer <token>` header
//! - `vulnchat_session` cookie
//!
//! Tokens are SHA-256 hashed and compared against the `sessions` table.
//! Two extractors are provided: [`Authenticated`] rejects anonymous
//! requests, [`MaybeAuthenticated`] resolves to `None` for them -- the chat
//! stream works unauthenticated (ephemeral exchanges), history CRUD does not.

use axum::extract::FromRequestParts;
use axum::http::header::HeaderMap;
use axum::http::request::Parts;

use vulnchat_types::identity::Identity;

use crate::http::error::AppError;
use crate::state::AppState;

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "vulnchat_session";

/// Authenticated request: extraction fails with 401 when no valid session
/// token is present.
pub struct Authenticated(pub Identity);

/// Optionally authenticated request: anonymous callers extract as `None`.
pub struct MaybeAuthenticated(pub Option<Identity>);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_identity(&parts.headers, state).await? {
            Some(identity) => Ok(Authenticated(identity)),
            None => Err(AppError::Unauthorized(
                "Sign in required. Provide a session token via 'Authorization: Bearer <token>' or the session cookie.".to_string(),
            )),
        }
    }
}

impl FromRequestParts<AppState> for MaybeAuthenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthenticated(
            resolve_identity(&parts.headers, state).await?,
        ))
    }
}

async fn resolve_identity(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<Option<Identity>, AppError> {
    let Some(token) = session_token_from_headers(headers) else {
        return Ok(None);
    };

    state
        .session_store
        .resolve(&token)
        .await
        .map_err(|e| AppError::Internal(format!("session lookup failed: {e}")))
}

/// Extract the session token from request headers, if any.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    // Try Authorization: Bearer <token>
    if let Some(auth) = headers.get("authorization") {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    // Try the session cookie
    if let Some(cookie) = headers.get("cookie") {
        if let Ok(cookie_str) = cookie.to_str() {
            for pair in cookie_str.split(';') {
                let value = pair
                    .trim()
                    .strip_prefix(SESSION_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='));
                if let Some(value) = value {
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }

    None
}

//! Account and session handlers.
//!
//! Endpoints:
//! - POST /api/v1/auth/signup - Create an account, issue a session token
//! - POST /api/v1/auth/login  - Verify credentials, issue a session token
//! - POST /api/v1/auth/logout - Revoke the current session token
//! - GET  /api/v1/auth/me     - The authenticated identity
//!
//! Passwords are stored as salted SHA-256 -- the textbook scheme this demo
//! exists to exhibit. An activation token is generated at signup but no mail
//! is delivered and login does not gate on activation.

use std::time::Instant;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use vulnchat_infra::crypto::hash::{generate_salt, hash_password, verify_password};
use vulnchat_types::identity::{Identity, UserRecord};

use crate::http::error::AppError;
use crate::http::extractors::auth::{session_token_from_headers, Authenticated};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for signup and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Minimum password length accepted at signup and login.
const MIN_PASSWORD_CHARS: usize = 6;

fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    let valid_email = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .unwrap_or(false);
    if !valid_email {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

/// POST /api/v1/auth/signup - Create an account and sign it in.
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    validate_credentials(&body.email, &body.password)?;

    let salt = generate_salt();
    let user = UserRecord {
        id: Uuid::now_v7(),
        email: body.email.clone(),
        password_hash: hash_password(&body.password, &salt),
        salt,
        is_active: false,
        activation_token: Some(Uuid::new_v4().to_string()),
        created_at: Utc::now(),
    };

    state.user_store.create_user(&user).await?;
    info!(user_id = %user.id, "account created");

    let token = state.session_store.issue(&user.id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({
            "token": token,
            "user": { "id": user.id, "email": user.email },
        }),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/auth/login - Verify credentials and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    validate_credentials(&body.email, &body.password)?;

    // Unknown email and wrong password produce the same answer.
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .user_store
        .get_user_by_email(&body.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&body.password, &user.salt, &user.password_hash) {
        return Err(invalid());
    }

    let token = state.session_store.issue(&user.id).await?;
    info!(user_id = %user.id, "signed in");

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({
            "token": token,
            "user": { "id": user.id, "email": user.email },
        }),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/auth/logout - Revoke the presented session token.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if let Some(token) = session_token_from_headers(&headers) {
        state.session_store.revoke(&token).await?;
    }

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"signed_out": true}),
        request_id,
        elapsed,
    )))
}

/// GET /api/v1/auth/me - The authenticated identity.
pub async fn me(
    Authenticated(actor): Authenticated,
) -> Result<Json<ApiResponse<Identity>>, AppError> {
    let request_id = Uuid::now_v7().to_string();
    Ok(Json(ApiResponse::success(actor, request_id, 0)))
}

//! Chat history CRUD handlers.
//!
//! Endpoints:
//! - GET    /api/v1/chats                 - List the actor's chats
//! - GET    /api/v1/chats/{id}            - Get a single chat
//! - DELETE /api/v1/chats/{id}            - Remove a chat
//! - DELETE /api/v1/chats                 - Clear all of the actor's chats
//! - POST   /api/v1/chats/{id}/share      - Share a chat (idempotent)
//! - PUT    /api/v1/chats/{id}/visibility - Set visibility in either direction
//! - GET    /api/v1/share/{id}            - Read a shared chat (no auth)

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use vulnchat_types::chat::ChatRecord;
use vulnchat_types::error::RepositoryError;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// GET /api/v1/chats - List the actor's chats, newest first.
pub async fn list_chats(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
) -> Result<Json<ApiResponse<Vec<ChatRecord>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let chats = state.chat_service.list_chats(&actor).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(chats, request_id, elapsed)))
}

/// GET /api/v1/chats/{id} - Get a chat by id, owner-scoped.
pub async fn get_chat(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ChatRecord>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    let chat = state
        .chat_service
        .get_chat(&actor, &id)
        .await?
        .ok_or(AppError::Repository(RepositoryError::NotFound))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(chat, request_id, elapsed)))
}

/// DELETE /api/v1/chats/{id} - Remove a chat.
pub async fn remove_chat(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    state.chat_service.remove_chat(&actor, &id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"deleted": true}),
        request_id,
        elapsed,
    )))
}

/// DELETE /api/v1/chats - Clear all of the actor's chats.
pub async fn clear_chats(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let cleared = state.chat_service.clear_chats(&actor).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"cleared": cleared}),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/chats/{id}/share - Share a chat. Idempotent: re-sharing
/// yields the same path.
pub async fn share_chat(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    let share_path = state.chat_service.share_chat(&actor, &id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"share_path": share_path}),
        request_id,
        elapsed,
    )))
}

/// Request body for the visibility endpoint.
#[derive(Debug, Deserialize)]
pub struct SetVisibilityRequest {
    pub shared: bool,
}

/// PUT /api/v1/chats/{id}/visibility - Set visibility in either direction.
pub async fn set_visibility(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
    Json(body): Json<SetVisibilityRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    let visibility = state
        .chat_service
        .set_visibility(&actor, &id, body.shared)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::to_value(&visibility)
            .map_err(|e| AppError::Internal(e.to_string()))?,
        request_id,
        elapsed,
    )))
}

/// GET /api/v1/share/{id} - Read a shared chat. No authentication; the
/// share link is the capability.
pub async fn get_shared_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ChatRecord>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    let chat = state
        .chat_service
        .get_shared_chat(&id)
        .await?
        .ok_or(AppError::Repository(RepositoryError::NotFound))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(chat, request_id, elapsed)))
}

//! Configuration handlers.
//!
//! GET /api/v1/config/missing-keys - Names of required credentials absent
//! from the environment, so the front end can prompt for a per-session key
//! before the first submission fails.

use std::time::Instant;

use axum::Json;
use uuid::Uuid;

use vulnchat_infra::secret::env::missing_keys;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;

/// GET /api/v1/config/missing-keys
pub async fn get_missing_keys() -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let missing = missing_keys();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"missing_keys": missing}),
        request_id,
        elapsed,
    )))
}

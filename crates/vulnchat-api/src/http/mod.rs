//! HTTP/REST API layer for VulnChat.
//!
//! Axum-based REST API at `/api/v1/` with session-token authentication,
//! envelope response format, SSE chat streaming, and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;

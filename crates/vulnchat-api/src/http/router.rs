//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Accounts & sessions
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        // Chat streaming
        .route("/chats/stream", post(handlers::chat::stream_new_chat))
        .route("/chats/{id}/stream", post(handlers::chat::stream_chat))
        // Chat history
        .route("/chats", get(handlers::history::list_chats))
        .route("/chats", delete(handlers::history::clear_chats))
        .route("/chats/{id}", get(handlers::history::get_chat))
        .route("/chats/{id}", delete(handlers::history::remove_chat))
        .route("/chats/{id}/share", post(handlers::history::share_chat))
        .route(
            "/chats/{id}/visibility",
            put(handlers::history::set_visibility),
        )
        // Shared chats (no auth; the link is the capability)
        .route("/share/{id}", get(handlers::history::get_shared_chat))
        // Configuration
        .route(
            "/config/missing-keys",
            get(handlers::config::get_missing_keys),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

//! Application state wiring all services together.
//!
//! `AppState` holds the concrete service instances used by the REST API.
//! The chat service is generic over the `ChatStore` trait, but AppState pins
//! it to the SQLite implementation.

use std::sync::Arc;

use vulnchat_core::chat::service::ChatService;
use vulnchat_infra::sqlite::chat::SqliteChatStore;
use vulnchat_infra::sqlite::pool::{resolve_data_dir, DatabasePool};
use vulnchat_infra::sqlite::session_token::SqliteSessionStore;
use vulnchat_infra::sqlite::user::SqliteUserStore;
use vulnchat_types::llm::{ModelConfig, DEFAULT_MODEL};

/// Concrete type alias for the service generic pinned to the SQLite store.
pub type ConcreteChatService = ChatService<SqliteChatStore>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub user_store: Arc<SqliteUserStore>,
    pub session_store: Arc<SqliteSessionStore>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to the DB, wire services.
    ///
    /// Environment is read here, once; everything downstream receives
    /// explicit configuration.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_url = format!("sqlite://{}?mode=rwc", data_dir.join("vulnchat.db").display());
        let db_pool = DatabasePool::new(&db_url).await?;

        let model = ModelConfig {
            model: std::env::var("VULNCHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            ..ModelConfig::default()
        };

        let chat_service = ChatService::new(SqliteChatStore::new(db_pool.clone()), model);

        Ok(Self {
            chat_service: Arc::new(chat_service),
            user_store: Arc::new(SqliteUserStore::new(db_pool.clone())),
            session_store: Arc::new(SqliteSessionStore::new(db_pool.clone())),
            db_pool,
        })
    }
}

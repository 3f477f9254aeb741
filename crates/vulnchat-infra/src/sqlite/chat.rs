//! SQLite chat store implementation.
//!
//! Implements `ChatStore` from `vulnchat-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct, reads on the reader
//! pool and mutations on the writer pool.
//!
//! Upsert semantics: the `DO UPDATE` clause deliberately omits `created_at`
//! and `share_path`. Creation time is fixed at first insert; share state
//! changes only through `set_visibility`. Every save re-applies the turn
//! validity filter, so a record's history can never contain a contentless
//! turn even if validation was bypassed upstream.

use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use vulnchat_core::chat::repository::ChatStore;
use vulnchat_types::chat::{ChatRecord, Visibility};
use vulnchat_types::error::RepositoryError;
use vulnchat_types::prompt::{PromptMode, Topic};
use vulnchat_types::turn::Turn;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatStore`.
pub struct SqliteChatStore {
    pool: DatabasePool,
}

impl SqliteChatStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Look up the stored owner of a chat, if any.
    async fn owner_of(&self, id: &Uuid) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT owner_id FROM chats WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|r| r.try_get::<String, _>("owner_id"))
            .transpose()
            .map_err(|e| RepositoryError::Query(e.to_string()))
    }

    /// Ownership gate for write paths: both an absent record and an owner
    /// mismatch surface as `Unauthorized`, so writes never leak existence.
    async fn require_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<(), RepositoryError> {
        match self.owner_of(id).await? {
            Some(owner) if owner == owner_id.to_string() => Ok(()),
            _ => Err(RepositoryError::Unauthorized),
        }
    }
}

/// Internal row type for mapping SQLite rows to domain ChatRecord.
struct ChatRow {
    id: String,
    title: String,
    owner_id: String,
    turns_json: String,
    share_path: Option<String>,
    topic: String,
    mode: String,
    created_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            owner_id: row.try_get("owner_id")?,
            turns_json: row.try_get("turns_json")?,
            share_path: row.try_get("share_path")?,
            topic: row.try_get("topic")?,
            mode: row.try_get("mode")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_record(self) -> Result<ChatRecord, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid chat id: {e}")))?;
        let owner_id = Uuid::parse_str(&self.owner_id)
            .map_err(|e| RepositoryError::Query(format!("invalid owner_id: {e}")))?;
        let turns: Vec<Turn> = serde_json::from_str(&self.turns_json)
            .map_err(|e| RepositoryError::Query(format!("invalid turns_json: {e}")))?;
        let topic: Topic = self
            .topic
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let mode: PromptMode = self
            .mode
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;
        let visibility = match self.share_path {
            Some(path) if !path.is_empty() => Visibility::Shared(path),
            _ => Visibility::Private,
        };

        Ok(ChatRecord {
            id,
            owner_id,
            title: self.title,
            turns,
            topic,
            mode,
            visibility,
            created_at,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl ChatStore for SqliteChatStore {
    async fn save_chat(&self, record: &ChatRecord) -> Result<(), RepositoryError> {
        // Ownership check runs before the write, not only on reads.
        if let Some(owner) = self.owner_of(&record.id).await? {
            if owner != record.owner_id.to_string() {
                return Err(RepositoryError::Unauthorized);
            }
        }

        let turns: Vec<&Turn> = record.turns.iter().filter(|t| t.is_valid()).collect();
        let turns_json = serde_json::to_string(&turns)
            .map_err(|e| RepositoryError::Query(format!("turn serialization: {e}")))?;
        let share_path = match &record.visibility {
            Visibility::Shared(path) => Some(path.clone()),
            Visibility::Private => None,
        };

        sqlx::query(
            r#"INSERT INTO chats (id, title, owner_id, turns_json, share_path, topic, mode, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   title = excluded.title,
                   turns_json = excluded.turns_json,
                   topic = excluded.topic,
                   mode = excluded.mode"#,
        )
        .bind(record.id.to_string())
        .bind(&record.title)
        .bind(record.owner_id.to_string())
        .bind(&turns_json)
        .bind(&share_path)
        .bind(record.topic.to_string())
        .bind(record.mode.to_string())
        .bind(format_datetime(&record.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        debug!(chat_id = %record.id, turns = turns.len(), "chat record upserted");
        Ok(())
    }

    async fn get_chat(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
    ) -> Result<Option<ChatRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chats WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let chat_row =
                    ChatRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                if chat_row.owner_id != owner_id.to_string() {
                    return Err(RepositoryError::Unauthorized);
                }
                Ok(Some(chat_row.into_record()?))
            }
            None => Ok(None),
        }
    }

    async fn get_shared_chat(&self, id: &Uuid) -> Result<Option<ChatRecord>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM chats WHERE id = ? AND share_path IS NOT NULL AND share_path != ''",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let chat_row =
                    ChatRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(chat_row.into_record()?))
            }
            None => Ok(None),
        }
    }

    async fn list_chats(&self, owner_id: &Uuid) -> Result<Vec<ChatRecord>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM chats WHERE owner_id = ? ORDER BY created_at DESC, id DESC")
                .bind(owner_id.to_string())
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut chats = Vec::with_capacity(rows.len());
        for row in &rows {
            let chat_row =
                ChatRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            chats.push(chat_row.into_record()?);
        }

        Ok(chats)
    }

    async fn remove_chat(&self, id: &Uuid, owner_id: &Uuid) -> Result<(), RepositoryError> {
        self.require_owner(id, owner_id).await?;

        sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn clear_chats(&self, owner_id: &Uuid) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM chats WHERE owner_id = ?")
            .bind(owner_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn set_visibility(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
        visibility: &Visibility,
    ) -> Result<Visibility, RepositoryError> {
        self.require_owner(id, owner_id).await?;

        let share_path = match visibility {
            Visibility::Shared(path) => Some(path.clone()),
            Visibility::Private => None,
        };

        sqlx::query("UPDATE chats SET share_path = ? WHERE id = ?")
            .bind(&share_path)
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(visibility.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;
    use vulnchat_types::turn::MessageRole;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    async fn create_test_user(pool: &DatabasePool) -> Uuid {
        let user_id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, salt, is_active, created_at) VALUES (?, ?, ?, ?, 1, ?)",
        )
        .bind(user_id.to_string())
        .bind(format!("{user_id}@example.com"))
        .bind("hash")
        .bind("salt")
        .bind(Utc::now().to_rfc3339())
        .execute(&pool.writer)
        .await
        .unwrap();
        user_id
    }

    fn make_record(owner_id: Uuid) -> ChatRecord {
        let id = Uuid::now_v7();
        ChatRecord {
            id,
            owner_id,
            title: "Hello".to_string(),
            turns: vec![Turn::user("Hello"), Turn::assistant("Hi there!")],
            topic: Topic::Llm01,
            mode: PromptMode::Insecure,
            visibility: Visibility::Private,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_get_chat() {
        let pool = test_pool().await;
        let store = SqliteChatStore::new(pool.clone());
        let owner = create_test_user(&pool).await;

        let record = make_record(owner);
        store.save_chat(&record).await.unwrap();

        let found = store.get_chat(&record.id, &owner).await.unwrap().unwrap();
        assert_eq!(found.id, record.id);
        assert_eq!(found.title, "Hello");
        assert_eq!(found.turns.len(), 2);
        assert_eq!(found.turns[0].role, MessageRole::User);
        assert_eq!(found.topic, Topic::Llm01);
        assert_eq!(found.mode, PromptMode::Insecure);
        assert_eq!(found.visibility, Visibility::Private);
    }

    #[tokio::test]
    async fn test_get_absent_chat_is_none() {
        let pool = test_pool().await;
        let store = SqliteChatStore::new(pool.clone());
        let owner = create_test_user(&pool).await;

        let found = store.get_chat(&Uuid::now_v7(), &owner).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_upsert_preserves_created_at_and_share_path() {
        let pool = test_pool().await;
        let store = SqliteChatStore::new(pool.clone());
        let owner = create_test_user(&pool).await;

        let mut record = make_record(owner);
        store.save_chat(&record).await.unwrap();
        store
            .set_visibility(&record.id, &owner, &Visibility::shared(&record.id))
            .await
            .unwrap();

        let original = store.get_chat(&record.id, &owner).await.unwrap().unwrap();

        // Second exchange: more turns, a later created_at on the incoming
        // record, visibility reported as Private by the service.
        record.turns.push(Turn::user("More"));
        record.turns.push(Turn::assistant("Sure"));
        record.created_at = Utc::now() + chrono::Duration::hours(1);
        record.visibility = Visibility::Private;
        store.save_chat(&record).await.unwrap();

        let updated = store.get_chat(&record.id, &owner).await.unwrap().unwrap();
        assert_eq!(updated.turns.len(), 4);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.visibility.is_shared(), "share state must survive upserts");
    }

    #[tokio::test]
    async fn test_save_filters_invalid_turns() {
        let pool = test_pool().await;
        let store = SqliteChatStore::new(pool.clone());
        let owner = create_test_user(&pool).await;

        let mut record = make_record(owner);
        record.turns.push(Turn::new(MessageRole::Assistant, "   "));
        record.turns.push(Turn::new(MessageRole::User, ""));
        store.save_chat(&record).await.unwrap();

        let found = store.get_chat(&record.id, &owner).await.unwrap().unwrap();
        assert_eq!(found.turns.len(), 2);
        assert!(found.turns.iter().all(|t| t.is_valid()));
    }

    #[tokio::test]
    async fn test_cross_owner_operations_are_unauthorized() {
        let pool = test_pool().await;
        let store = SqliteChatStore::new(pool.clone());
        let owner = create_test_user(&pool).await;
        let intruder = create_test_user(&pool).await;

        let record = make_record(owner);
        store.save_chat(&record).await.unwrap();

        assert!(matches!(
            store.get_chat(&record.id, &intruder).await,
            Err(RepositoryError::Unauthorized)
        ));
        assert!(matches!(
            store.remove_chat(&record.id, &intruder).await,
            Err(RepositoryError::Unauthorized)
        ));
        assert!(matches!(
            store
                .set_visibility(&record.id, &intruder, &Visibility::shared(&record.id))
                .await,
            Err(RepositoryError::Unauthorized)
        ));

        // Overwriting someone else's record by id is also refused.
        let stolen = ChatRecord {
            owner_id: intruder,
            ..record.clone()
        };
        assert!(matches!(
            store.save_chat(&stolen).await,
            Err(RepositoryError::Unauthorized)
        ));

        // Record untouched.
        let found = store.get_chat(&record.id, &owner).await.unwrap().unwrap();
        assert_eq!(found.owner_id, owner);
    }

    #[tokio::test]
    async fn test_remove_absent_chat_is_unauthorized() {
        let pool = test_pool().await;
        let store = SqliteChatStore::new(pool.clone());
        let owner = create_test_user(&pool).await;

        // Write path: absence is indistinguishable from a mismatch.
        assert!(matches!(
            store.remove_chat(&Uuid::now_v7(), &owner).await,
            Err(RepositoryError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_share_and_unshare() {
        let pool = test_pool().await;
        let store = SqliteChatStore::new(pool.clone());
        let owner = create_test_user(&pool).await;

        let record = make_record(owner);
        store.save_chat(&record).await.unwrap();

        // Never shared: not visible through the shared lookup.
        assert!(store.get_shared_chat(&record.id).await.unwrap().is_none());

        let shared = Visibility::shared(&record.id);
        let v1 = store
            .set_visibility(&record.id, &owner, &shared)
            .await
            .unwrap();
        let v2 = store
            .set_visibility(&record.id, &owner, &shared)
            .await
            .unwrap();
        assert_eq!(v1, v2, "re-sharing yields the same path");

        let found = store.get_shared_chat(&record.id).await.unwrap().unwrap();
        assert_eq!(found.visibility, Visibility::Shared(format!("/share/{}", record.id)));

        store
            .set_visibility(&record.id, &owner, &Visibility::Private)
            .await
            .unwrap();
        assert!(store.get_shared_chat(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_chats_newest_first() {
        let pool = test_pool().await;
        let store = SqliteChatStore::new(pool.clone());
        let owner = create_test_user(&pool).await;

        let mut old = make_record(owner);
        old.created_at = Utc::now() - chrono::Duration::days(1);
        old.title = "old".to_string();
        store.save_chat(&old).await.unwrap();

        let mut new = make_record(owner);
        new.title = "new".to_string();
        store.save_chat(&new).await.unwrap();

        let chats = store.list_chats(&owner).await.unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].title, "new");
        assert_eq!(chats[1].title, "old");
    }

    #[tokio::test]
    async fn test_clear_chats_scoped_to_owner() {
        let pool = test_pool().await;
        let store = SqliteChatStore::new(pool.clone());
        let alice = create_test_user(&pool).await;
        let bob = create_test_user(&pool).await;

        store.save_chat(&make_record(alice)).await.unwrap();
        store.save_chat(&make_record(alice)).await.unwrap();
        store.save_chat(&make_record(bob)).await.unwrap();

        let removed = store.clear_chats(&alice).await.unwrap();
        assert_eq!(removed, 2);
        assert!(store.list_chats(&alice).await.unwrap().is_empty());
        assert_eq!(store.list_chats(&bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_chats() {
        let pool = test_pool().await;
        let store = SqliteChatStore::new(pool.clone());
        let owner = create_test_user(&pool).await;

        let record = make_record(owner);
        store.save_chat(&record).await.unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(owner.to_string())
            .execute(&pool.writer)
            .await
            .unwrap();

        assert!(store.get_chat(&record.id, &owner).await.unwrap().is_none());
    }
}

//! ChatStore trait definition.
//!
//! Owner-scoped CRUD over durable chat records. Implementations live in
//! `vulnchat-infra` (e.g., `SqliteChatStore`). Uses native async fn in
//! traits (RPITIT, Rust 2024 edition).
//!
//! Error discipline, applied uniformly by implementations:
//! - read paths surface an absent record as `Ok(None)`;
//! - owner-scoped reads of an *existing* record owned by someone else fail
//!   with `RepositoryError::Unauthorized`;
//! - owner-scoped writes fail with `Unauthorized` both on owner mismatch and
//!   on an absent record, so write paths never leak record existence.

use uuid::Uuid;

use vulnchat_types::chat::{ChatRecord, Visibility};
use vulnchat_types::error::RepositoryError;

/// Repository trait for durable chat records.
pub trait ChatStore: Send + Sync {
    /// Upsert a chat record: insert when `record.id` is unseen, otherwise
    /// overwrite title, turns, topic, and mode while preserving `created_at`
    /// and the share path from the first insert. The ownership check runs
    /// before the write. Turns without content are filtered on every save.
    fn save_chat(
        &self,
        record: &ChatRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a chat by id, scoped to its owner.
    fn get_chat(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatRecord>, RepositoryError>> + Send;

    /// Get a chat by id regardless of owner, provided it has been shared.
    /// Never-shared and absent chats both surface as `Ok(None)`.
    fn get_shared_chat(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatRecord>, RepositoryError>> + Send;

    /// All chats for an owner, newest first.
    fn list_chats(
        &self,
        owner_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatRecord>, RepositoryError>> + Send;

    /// Delete a single chat.
    fn remove_chat(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete all chats for an owner. Returns the number removed.
    fn clear_chats(
        &self,
        owner_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Set a chat's visibility in either direction. Sharing an
    /// already-shared chat is a no-op yielding the same path. Returns the
    /// resulting visibility.
    fn set_visibility(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
        visibility: &Visibility,
    ) -> impl std::future::Future<Output = Result<Visibility, RepositoryError>> + Send;
}

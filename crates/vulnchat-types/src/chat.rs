//! Durable chat record types for VulnChat.
//!
//! A [`ChatRecord`] is the checkpointed form of a chat session: the full
//! ordered turn list plus ownership, title, and visibility metadata. Records
//! are upserted whole at finalize time; `created_at` is set on first insert
//! and preserved by every later upsert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prompt::{PromptMode, Topic};
use crate::turn::{MessageRole, Turn};

/// Maximum number of characters taken from the first user turn for a title.
pub const TITLE_MAX_CHARS: usize = 100;

/// Visibility of a chat record.
///
/// `Shared` carries the stable share path derived from the chat id, so
/// re-sharing an already-shared chat is a no-op producing the same path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "path")]
pub enum Visibility {
    Private,
    Shared(String),
}

impl Visibility {
    /// The share path for a chat id: `/share/{id}`.
    pub fn share_path(chat_id: &Uuid) -> String {
        format!("/share/{chat_id}")
    }

    /// Shared visibility with the derived path for `chat_id`.
    pub fn shared(chat_id: &Uuid) -> Self {
        Visibility::Shared(Self::share_path(chat_id))
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Visibility::Shared(_))
    }
}

/// A durable chat conversation owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    /// Equal to the session id of the conversation it checkpoints.
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub turns: Vec<Turn>,
    pub topic: Topic,
    pub mode: PromptMode,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

impl ChatRecord {
    /// Derive a title from the first user turn: its leading
    /// [`TITLE_MAX_CHARS`] characters, char-boundary safe.
    ///
    /// Falls back to "New chat" when no user turn exists yet.
    pub fn derive_title(turns: &[Turn]) -> String {
        turns
            .iter()
            .find(|t| t.role == MessageRole::User)
            .map(|t| t.content.chars().take(TITLE_MAX_CHARS).collect())
            .unwrap_or_else(|| "New chat".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_path_is_stable() {
        let id = Uuid::now_v7();
        assert_eq!(Visibility::share_path(&id), format!("/share/{id}"));
        assert_eq!(Visibility::shared(&id), Visibility::shared(&id));
        assert!(Visibility::shared(&id).is_shared());
        assert!(!Visibility::Private.is_shared());
    }

    #[test]
    fn test_derive_title_truncates_to_100_chars() {
        let long = "x".repeat(250);
        let turns = vec![Turn::user(&long)];
        let title = ChatRecord::derive_title(&turns);
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn test_derive_title_short_content() {
        let turns = vec![Turn::user("Hello")];
        assert_eq!(ChatRecord::derive_title(&turns), "Hello");
    }

    #[test]
    fn test_derive_title_multibyte_boundary() {
        // 150 two-byte chars; a byte-indexed substring would panic or split
        // a code point.
        let long = "é".repeat(150);
        let turns = vec![Turn::user(&long)];
        let title = ChatRecord::derive_title(&turns);
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn test_derive_title_skips_non_user_turns() {
        let turns = vec![
            Turn::new(MessageRole::System, "be helpful"),
            Turn::user("Actual question"),
        ];
        assert_eq!(ChatRecord::derive_title(&turns), "Actual question");
    }

    #[test]
    fn test_derive_title_empty_history() {
        assert_eq!(ChatRecord::derive_title(&[]), "New chat");
    }

    #[test]
    fn test_chat_record_serde_roundtrip() {
        let id = Uuid::now_v7();
        let record = ChatRecord {
            id,
            owner_id: Uuid::now_v7(),
            title: "Hello".to_string(),
            turns: vec![Turn::user("Hello"), Turn::assistant("Hi!")],
            topic: Topic::Llm01,
            mode: PromptMode::Insecure,
            visibility: Visibility::shared(&id),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: ChatRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.turns.len(), 2);
        assert_eq!(parsed.topic, Topic::Llm01);
        assert!(parsed.visibility.is_shared());
    }
}

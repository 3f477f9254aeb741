//! Conversation turn types for VulnChat.
//!
//! A [`Turn`] is one message in a conversation. Turns are immutable once
//! appended to a session; conversation order is append order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::error::SessionError;

/// Role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// One conversational unit within a session.
///
/// `name` carries an optional speaker label forwarded verbatim to the
/// provider; it plays no role in validation or ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Turn {
    /// Create a turn with a fresh time-sortable id.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            content: content.into(),
            name: None,
        }
    }

    /// Create a user turn. Content is trimmed, matching the submission form.
    pub fn user(content: &str) -> Self {
        Self::new(MessageRole::User, content.trim())
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Whether this turn may enter a session or a durable record.
    ///
    /// The same predicate backs both the append-time check and the filter
    /// applied before every persistence, so an invalid turn can never reach
    /// storage even if append validation was bypassed upstream.
    pub fn is_valid(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// Validate for append, surfacing the session-level error.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(SessionError::InvalidTurn(
                "turn content must not be empty".to_string(),
            ))
        }
    }
}

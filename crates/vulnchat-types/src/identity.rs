//! Authenticated identity and user account types.
//!
//! The authentication boundary produces an [`Identity`] or none; session and
//! persistence operations take `Option<Identity>` and treat `None` as an
//! anonymous caller whose exchanges are never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated actor attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// A user account row.
///
/// `password_hash` is the hex SHA-256 of `password + salt` -- deliberately
/// textbook, this application demonstrates weak patterns. `activation_token`
/// is issued at signup but never gates login (no mail delivery exists).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub salt: String,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub activation_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// The identity this account resolves to once authenticated.
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            email: self.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> UserRecord {
        UserRecord {
            id: Uuid::now_v7(),
            email: "user@example.com".to_string(),
            password_hash: "abc123".to_string(),
            salt: "salt".to_string(),
            is_active: false,
            activation_token: Some("token".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_identity_from_user() {
        let user = test_user();
        let identity = user.identity();
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.email, "user@example.com");
    }

    #[test]
    fn test_user_serialization_hides_credentials() {
        let user = test_user();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("abc123"));
        assert!(!json.contains("salt"));
        assert!(!json.contains("activation_token"));
        assert!(json.contains("user@example.com"));
    }
}

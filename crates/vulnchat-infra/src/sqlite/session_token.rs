//! Session token issuance and resolution.
//!
//! Login produces a random bearer token; only its SHA-256 hash is stored, so
//! a leaked database does not leak live sessions. Tokens expire after
//! [`SESSION_TTL_DAYS`]; expired rows are removed lazily on lookup.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::Row;
use uuid::Uuid;

use vulnchat_types::error::RepositoryError;
use vulnchat_types::identity::Identity;

use super::pool::DatabasePool;

/// Lifetime of an issued session token.
pub const SESSION_TTL_DAYS: i64 = 30;

/// Compute the SHA-256 hash of a session token (lowercase hex).
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{:x}", digest)
}

/// SQLite-backed session token store.
pub struct SqliteSessionStore {
    pool: DatabasePool,
}

impl SqliteSessionStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Issue a fresh session token for a user. Returns the plaintext token;
    /// it is never stored and cannot be recovered later.
    pub async fn issue(&self, user_id: &Uuid) -> Result<String, RepositoryError> {
        let token = format!(
            "vchat_{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        let now = Utc::now();
        let expires_at = now + Duration::days(SESSION_TTL_DAYS);

        sqlx::query(
            r#"INSERT INTO sessions (id, user_id, token_hash, created_at, expires_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(Uuid::now_v7().to_string())
        .bind(user_id.to_string())
        .bind(hash_token(&token))
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(token)
    }

    /// Resolve a plaintext token to the identity it was issued for.
    ///
    /// Unknown and expired tokens both resolve to `None`; expired rows are
    /// deleted on the way out.
    pub async fn resolve(&self, token: &str) -> Result<Option<Identity>, RepositoryError> {
        let token_hash = hash_token(token);
        let row = sqlx::query(
            r#"SELECT s.token_hash, s.expires_at, u.id AS user_id, u.email
               FROM sessions s JOIN users u ON u.id = s.user_id
               WHERE s.token_hash = ?"#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: String = row
            .try_get("expires_at")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))?;

        if expires_at <= Utc::now() {
            // Best effort cleanup; the token is invalid either way.
            let _ = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
                .bind(&token_hash)
                .execute(&self.pool.writer)
                .await;
            return Ok(None);
        }

        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let user_id = Uuid::parse_str(&user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        let email: String = row
            .try_get("email")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(Some(Identity { user_id, email }))
    }

    /// Revoke a token (logout). Revoking an unknown token is a no-op.
    pub async fn revoke(&self, token: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_token(token))
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
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

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let pool = test_pool().await;
        let store = SqliteSessionStore::new(pool.clone());
        let user_id = create_test_user(&pool).await;

        let token = store.issue(&user_id).await.unwrap();
        assert!(token.starts_with("vchat_"));

        let identity = store.resolve(&token).await.unwrap().unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email, format!("{user_id}@example.com"));
    }

    #[tokio::test]
    async fn test_unknown_token_resolves_to_none() {
        let pool = test_pool().await;
        let store = SqliteSessionStore::new(pool.clone());

        assert!(store.resolve("vchat_bogus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoked_token_stops_resolving() {
        let pool = test_pool().await;
        let store = SqliteSessionStore::new(pool.clone());
        let user_id = create_test_user(&pool).await;

        let token = store.issue(&user_id).await.unwrap();
        store.revoke(&token).await.unwrap();

        assert!(store.resolve(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_token_resolves_to_none() {
        let pool = test_pool().await;
        let store = SqliteSessionStore::new(pool.clone());
        let user_id = create_test_user(&pool).await;

        let token = store.issue(&user_id).await.unwrap();

        // Force the expiry into the past.
        sqlx::query("UPDATE sessions SET expires_at = ? WHERE token_hash = ?")
            .bind((Utc::now() - Duration::hours(1)).to_rfc3339())
            .bind(hash_token(&token))
            .execute(&pool.writer)
            .await
            .unwrap();

        assert!(store.resolve(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_token_stored_hashed() {
        let pool = test_pool().await;
        let store = SqliteSessionStore::new(pool.clone());
        let user_id = create_test_user(&pool).await;

        let token = store.issue(&user_id).await.unwrap();

        let stored: (String,) = sqlx::query_as("SELECT token_hash FROM sessions LIMIT 1")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_ne!(stored.0, token);
        assert_eq!(stored.0, hash_token(&token));
    }
}

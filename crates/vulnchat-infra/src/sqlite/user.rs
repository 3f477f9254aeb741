//! SQLite user account store.
//!
//! Plain CRUD over the `users` table. The authentication flow lives in the
//! API layer; this store only reads and writes account rows.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use vulnchat_types::error::RepositoryError;
use vulnchat_types::identity::UserRecord;

use super::pool::DatabasePool;

/// SQLite-backed user account store.
pub struct SqliteUserStore {
    pool: DatabasePool,
}

impl SqliteUserStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Insert a new account. A duplicate email surfaces as
    /// `RepositoryError::Conflict`.
    pub async fn create_user(&self, user: &UserRecord) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"INSERT INTO users (id, email, password_hash, salt, is_active, activation_token, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.salt)
        .bind(user.is_active as i64)
        .bind(&user.activation_token)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                RepositoryError::Conflict(format!("email '{}' already registered", user.email)),
            ),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    /// Fetch an account by email.
    pub async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|r| user_from_row(&r)).transpose()
    }

    /// Fetch an account by id.
    pub async fn get_user(&self, id: &Uuid) -> Result<Option<UserRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|r| user_from_row(&r)).transpose()
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<UserRecord, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let id =
        Uuid::parse_str(&id).map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))?;
    let is_active: i64 = row
        .try_get("is_active")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(UserRecord {
        id,
        email: row
            .try_get("email")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        password_hash: row
            .try_get("password_hash")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        salt: row
            .try_get("salt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        is_active: is_active != 0,
        activation_token: row
            .try_get("activation_token")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        created_at,
    })
}

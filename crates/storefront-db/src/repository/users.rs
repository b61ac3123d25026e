//! User operations

use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NewUser, User};
use crate::repository::Database;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user, assigning it a fresh external uuid
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();
        let uuid = Uuid::new_v4().to_string();

        let result = sqlx::query(
            r#"
            INSERT INTO users (uuid, name, password_hash, user_type, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&uuid)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.user_type)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, format!("User uuid '{}' already exists", uuid)))?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            uuid,
            name: user.name,
            password_hash: user.password_hash,
            user_type: user.user_type,
            created_at: now,
        })
    }

    /// Get the oldest user with the given name
    pub async fn get_user_by_name(&self, name: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, uuid, name, password_hash, user_type, created_at
            FROM users
            WHERE name = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by external uuid
    pub async fn get_user_by_uuid(&self, uuid: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, uuid, name, password_hash, user_type, created_at
            FROM users
            WHERE uuid = ?
            "#,
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all users
    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, uuid, name, password_hash, user_type, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Delete a user by external uuid
    pub async fn delete_user(&self, uuid: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE uuid = ?")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

//! # User Repository
//!
//! Back-office users. Password hashing happens in the server's auth module;
//! this repository only ever sees the argon2 PHC string.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tillpoint_core::{User, STATUS_DISABLED};

/// Fields accepted when creating or updating a user.
#[derive(Debug, Clone)]
pub struct UserInput {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub role: i64,
    pub status: i64,
    pub location_id: Option<i64>,
}

const USER_COLUMNS: &str =
    "id, username, password_hash, name, role, status, location_id, created_at";

/// Repository for user operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Lists all users.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Lists users assigned to a location.
    pub async fn list_by_location(&self, location_id: i64) -> DbResult<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE location_id = ?1 ORDER BY id");
        let users = sqlx::query_as::<_, User>(&query)
            .bind(location_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Gets a user by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets a user by username (login lookup).
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Inserts a user and returns the stored row.
    pub async fn create(&self, input: &UserInput) -> DbResult<User> {
        debug!(username = %input.username, "Creating user");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, name, role, status, location_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(&input.name)
        .bind(input.role)
        .bind(input.status)
        .bind(input.location_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Updates a user's fields (including a fresh password hash).
    pub async fn update(&self, id: i64, input: &UserInput) -> DbResult<User> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = ?2,
                password_hash = ?3,
                name = ?4,
                role = ?5,
                status = ?6,
                location_id = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(&input.name)
        .bind(input.role)
        .bind(input.status)
        .bind(input.location_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Soft-disables a user (status = 0).
    pub async fn disable(&self, id: i64) -> DbResult<User> {
        let result = sqlx::query("UPDATE users SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(STATUS_DISABLED)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tillpoint_core::STATUS_ACTIVE;

    fn sample_user(username: &str) -> UserInput {
        UserInput {
            username: username.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$hash".to_string(),
            name: "Test Cashier".to_string(),
            role: 1,
            status: STATUS_ACTIVE,
            location_id: None,
        }
    }

    #[tokio::test]
    async fn test_username_lookup_and_uniqueness() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        repo.create(&sample_user("cashier01")).await.unwrap();
        assert!(repo
            .find_by_username("cashier01")
            .await
            .unwrap()
            .is_some());
        assert!(repo.find_by_username("nobody").await.unwrap().is_none());

        let err = repo.create(&sample_user("cashier01")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}

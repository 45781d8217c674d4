//! # Location Repository

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use tillpoint_core::{Location, STATUS_DISABLED};

/// Repository for store location operations.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: SqlitePool,
}

impl LocationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LocationRepository { pool }
    }

    /// Lists all locations.
    pub async fn list(&self) -> DbResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT id, name, status, created_at FROM locations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    /// Gets a location by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            "SELECT id, name, status, created_at FROM locations WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    /// Inserts a location and returns the stored row.
    pub async fn create(&self, name: &str, status: i64) -> DbResult<Location> {
        let now = Utc::now();

        let result =
            sqlx::query("INSERT INTO locations (name, status, created_at) VALUES (?1, ?2, ?3)")
                .bind(name)
                .bind(status)
                .bind(now)
                .execute(&self.pool)
                .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", id))
    }

    /// Updates a location's fields.
    pub async fn update(&self, id: i64, name: &str, status: i64) -> DbResult<Location> {
        let result = sqlx::query("UPDATE locations SET name = ?2, status = ?3 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Location", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", id))
    }

    /// Soft-disables a location (status = 0).
    pub async fn disable(&self, id: i64) -> DbResult<Location> {
        let result = sqlx::query("UPDATE locations SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(STATUS_DISABLED)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Location", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", id))
    }
}

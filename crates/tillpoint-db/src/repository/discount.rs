//! # Discount Repository
//!
//! Percentage discount definitions. The checkout workflow resolves a line's
//! discount id through [`DiscountRepository::find_active`]: a missing or
//! disabled discount silently degrades to 0%, it is never an error.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use tillpoint_core::{Discount, STATUS_ACTIVE, STATUS_DISABLED};

/// Repository for discount operations.
#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    /// Lists all discounts, newest first.
    pub async fn list(&self) -> DbResult<Vec<Discount>> {
        let discounts = sqlx::query_as::<_, Discount>(
            "SELECT id, name, percentage, status, created_at FROM discounts ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    /// Gets a discount by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Discount>> {
        let discount = sqlx::query_as::<_, Discount>(
            "SELECT id, name, percentage, status, created_at FROM discounts WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(discount)
    }

    /// Gets an *active* discount by ID. Returns None for missing or
    /// disabled discounts.
    pub async fn find_active(&self, id: i64) -> DbResult<Option<Discount>> {
        let discount = sqlx::query_as::<_, Discount>(
            r#"
            SELECT id, name, percentage, status, created_at
            FROM discounts
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(STATUS_ACTIVE)
        .fetch_optional(&self.pool)
        .await?;

        Ok(discount)
    }

    /// Inserts a discount and returns the stored row.
    pub async fn create(&self, name: &str, percentage: i64, status: i64) -> DbResult<Discount> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO discounts (name, percentage, status, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(name)
        .bind(percentage)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Discount", id))
    }

    /// Updates a discount's fields.
    pub async fn update(
        &self,
        id: i64,
        name: &str,
        percentage: i64,
        status: i64,
    ) -> DbResult<Discount> {
        let result = sqlx::query(
            "UPDATE discounts SET name = ?2, percentage = ?3, status = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(name)
        .bind(percentage)
        .bind(status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Discount", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Discount", id))
    }

    /// Soft-disables a discount (status = 0).
    pub async fn disable(&self, id: i64) -> DbResult<Discount> {
        let result = sqlx::query("UPDATE discounts SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(STATUS_DISABLED)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Discount", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Discount", id))
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use tillpoint_core::STATUS_ACTIVE;

    #[tokio::test]
    async fn test_find_active_skips_disabled() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.discounts();

        let senior = repo.create("Senior", 20, STATUS_ACTIVE).await.unwrap();
        assert!(repo.find_active(senior.id).await.unwrap().is_some());

        repo.disable(senior.id).await.unwrap();
        assert!(repo.find_active(senior.id).await.unwrap().is_none());

        // Missing id is None, not an error
        assert!(repo.find_active(424242).await.unwrap().is_none());
    }
}

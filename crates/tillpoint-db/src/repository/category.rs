//! # Category Repository

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use tillpoint_core::{Category, STATUS_DISABLED};

/// Repository for product category operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories, newest first.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, status, created_at FROM categories ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, status, created_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a category and returns the stored row.
    pub async fn create(&self, name: &str, status: i64) -> DbResult<Category> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO categories (name, status, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(name)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Updates a category's fields.
    pub async fn update(&self, id: i64, name: &str, status: i64) -> DbResult<Category> {
        let result = sqlx::query("UPDATE categories SET name = ?2, status = ?3 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Soft-disables a category (status = 0).
    pub async fn disable(&self, id: i64) -> DbResult<Category> {
        let result = sqlx::query("UPDATE categories SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(STATUS_DISABLED)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use tillpoint_core::STATUS_ACTIVE;

    #[tokio::test]
    async fn test_category_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let created = repo.create("Beverages", STATUS_ACTIVE).await.unwrap();
        assert_eq!(created.name, "Beverages");
        assert_eq!(created.status, STATUS_ACTIVE);

        let updated = repo
            .update(created.id, "Drinks", STATUS_ACTIVE)
            .await
            .unwrap();
        assert_eq!(updated.name, "Drinks");

        let disabled = repo.disable(created.id).await.unwrap();
        assert_eq!(disabled.status, 0);

        assert!(repo.get(9999).await.unwrap().is_none());
        assert!(repo.update(9999, "x", 1).await.is_err());
    }
}

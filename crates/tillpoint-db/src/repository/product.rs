//! # Product Repository
//!
//! Catalog products. Products referenced by orders are never hard-deleted;
//! `disable` flips the soft-disable flag instead.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use tillpoint_core::{Money, Product, STATUS_ACTIVE, STATUS_DISABLED};

/// Fields accepted when creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub barcode: String,
    pub name: String,
    pub description: Option<String>,
    pub supplier_price_cents: Money,
    pub retail_price_cents: Money,
    pub wholesale_price_cents: Money,
    pub reorder_level: i64,
    pub is_vat: i64,
    pub status: i64,
    pub category_id: Option<i64>,
}

/// Product listing row with the category name joined in.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductListing {
    pub id: i64,
    pub barcode: String,
    pub name: String,
    pub description: Option<String>,
    pub supplier_price_cents: Money,
    pub retail_price_cents: Money,
    pub wholesale_price_cents: Money,
    pub reorder_level: i64,
    pub is_vat: i64,
    pub status: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str = "id, barcode, name, description, supplier_price_cents, \
     retail_price_cents, wholesale_price_cents, reorder_level, is_vat, status, \
     category_id, created_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products with their category names, newest first.
    pub async fn list(&self) -> DbResult<Vec<ProductListing>> {
        let products = sqlx::query_as::<_, ProductListing>(
            r#"
            SELECT
                p.id, p.barcode, p.name, p.description,
                p.supplier_price_cents, p.retail_price_cents, p.wholesale_price_cents,
                p.reorder_level, p.is_vat, p.status, p.category_id,
                c.name AS category_name,
                p.created_at
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            ORDER BY p.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its unique barcode.
    pub async fn find_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1");
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Checks that a product exists and is active.
    pub async fn is_active(&self, id: i64) -> DbResult<bool> {
        is_active_on(&mut *self.pool.acquire().await?, id).await
    }

    /// Inserts a product and returns the stored row.
    pub async fn create(&self, input: &ProductInput) -> DbResult<Product> {
        debug!(barcode = %input.barcode, name = %input.name, "Creating product");

        let mut conn = self.pool.acquire().await?;
        let id = insert_on(&mut conn, input).await?;
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts many products in one transaction.
    ///
    /// Used by bulk import: the first failing row aborts the whole batch,
    /// leaving nothing committed.
    pub async fn create_bulk(&self, inputs: &[ProductInput]) -> DbResult<Vec<i64>> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(inputs.len());

        for input in inputs {
            ids.push(insert_on(&mut tx, input).await?);
        }

        tx.commit().await?;
        Ok(ids)
    }

    /// Updates a product's fields.
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<Product> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                barcode = ?2,
                name = ?3,
                description = ?4,
                supplier_price_cents = ?5,
                retail_price_cents = ?6,
                wholesale_price_cents = ?7,
                reorder_level = ?8,
                is_vat = ?9,
                status = ?10,
                category_id = ?11
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.barcode)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.supplier_price_cents)
        .bind(input.retail_price_cents)
        .bind(input.wholesale_price_cents)
        .bind(input.reorder_level)
        .bind(input.is_vat)
        .bind(input.status)
        .bind(input.category_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-disables a product (status = 0). Products stay on past orders.
    pub async fn disable(&self, id: i64) -> DbResult<Product> {
        let result = sqlx::query("UPDATE products SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(STATUS_DISABLED)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }
}

/// Inserts one product on an arbitrary executor (pool connection or
/// transaction).
pub(crate) async fn insert_on(conn: &mut SqliteConnection, input: &ProductInput) -> DbResult<i64> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO products (
            barcode, name, description,
            supplier_price_cents, retail_price_cents, wholesale_price_cents,
            reorder_level, is_vat, status, category_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&input.barcode)
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.supplier_price_cents)
    .bind(input.retail_price_cents)
    .bind(input.wholesale_price_cents)
    .bind(input.reorder_level)
    .bind(input.is_vat)
    .bind(input.status)
    .bind(input.category_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Checks product existence + active status on an arbitrary executor.
pub(crate) async fn is_active_on(conn: &mut SqliteConnection, id: i64) -> DbResult<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM products WHERE id = ?1 AND status = ?2")
            .bind(id)
            .bind(STATUS_ACTIVE)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample_input(barcode: &str) -> ProductInput {
        ProductInput {
            barcode: barcode.to_string(),
            name: "Cola 330ml".to_string(),
            description: Some("Canned soda".to_string()),
            supplier_price_cents: Money::from_cents(5500),
            retail_price_cents: Money::from_cents(10000),
            wholesale_price_cents: Money::from_cents(8500),
            reorder_level: 24,
            is_vat: 1,
            status: STATUS_ACTIVE,
            category_id: None,
        }
    }

    #[tokio::test]
    async fn test_product_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let created = repo.create(&sample_input("4800001")).await.unwrap();
        assert_eq!(created.retail_price_cents.cents(), 10000);

        let by_barcode = repo.find_by_barcode("4800001").await.unwrap().unwrap();
        assert_eq!(by_barcode.id, created.id);

        assert!(repo.is_active(created.id).await.unwrap());
        repo.disable(created.id).await.unwrap();
        assert!(!repo.is_active(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.create(&sample_input("4800002")).await.unwrap();
        let err = repo.create(&sample_input("4800002")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_create_bulk_rolls_back_on_failure() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        // Second row collides with the first: nothing may land
        let rows = vec![sample_input("4800003"), sample_input("4800003")];
        assert!(repo.create_bulk(&rows).await.is_err());
        assert!(repo.find_by_barcode("4800003").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_listing_joins_category_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = db.categories().create("Drinks", STATUS_ACTIVE).await.unwrap();

        let mut input = sample_input("4800004");
        input.category_id = Some(category.id);
        db.products().create(&input).await.unwrap();

        let listing = db.products().list().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].category_name.as_deref(), Some("Drinks"));
    }
}

//! # Inventory Repository
//!
//! Per (product, location) unit counts. Three things mutate a level:
//! stock-in (+), stock adjustment (signed), and order fulfillment (-).
//! The mutating SQL lives in executor-generic helpers so the stock and
//! order workflows can run them inside their own transactions.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DbError, DbResult};
use tillpoint_core::{InventoryLevel, Money, STATUS_ACTIVE, STATUS_DISABLED};

/// Inventory listing row with product and location names joined in.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InventoryListing {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub barcode: String,
    pub location_id: i64,
    pub location_name: String,
    pub units: i64,
    pub reorder_level: i64,
    pub status: i64,
}

/// Point-of-sale lookup row: live stock joined with sell prices.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PosListing {
    pub product_id: i64,
    pub barcode: String,
    pub product_name: String,
    pub retail_price_cents: Money,
    pub wholesale_price_cents: Money,
    pub is_vat: i64,
    pub location_id: i64,
    pub units: i64,
}

const LEVEL_COLUMNS: &str = "id, product_id, location_id, units, status, created_at";

/// Repository for inventory level operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Lists all raw inventory rows.
    pub async fn list(&self) -> DbResult<Vec<InventoryLevel>> {
        let query = format!("SELECT {LEVEL_COLUMNS} FROM inventory ORDER BY id");
        let levels = sqlx::query_as::<_, InventoryLevel>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(levels)
    }

    /// Lists inventory with product and location names joined in.
    pub async fn list_detailed(&self) -> DbResult<Vec<InventoryListing>> {
        let listings = sqlx::query_as::<_, InventoryListing>(
            r#"
            SELECT
                i.id, i.product_id, p.name AS product_name, p.barcode,
                i.location_id, l.name AS location_name,
                i.units, p.reorder_level, i.status
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            JOIN locations l ON l.id = i.location_id
            ORDER BY i.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(listings)
    }

    /// Point-of-sale lookup: active products with live stock for a location.
    pub async fn pos_listing(&self, location_id: i64) -> DbResult<Vec<PosListing>> {
        let listings = sqlx::query_as::<_, PosListing>(
            r#"
            SELECT
                p.id AS product_id, p.barcode, p.name AS product_name,
                p.retail_price_cents, p.wholesale_price_cents, p.is_vat,
                i.location_id, i.units
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            WHERE i.location_id = ?1 AND p.status = ?2
            ORDER BY p.name
            "#,
        )
        .bind(location_id)
        .bind(STATUS_ACTIVE)
        .fetch_all(&self.pool)
        .await?;

        Ok(listings)
    }

    /// Gets an inventory row by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<InventoryLevel>> {
        let query = format!("SELECT {LEVEL_COLUMNS} FROM inventory WHERE id = ?1");
        let level = sqlx::query_as::<_, InventoryLevel>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(level)
    }

    /// Gets the inventory row for a (product, location) pair.
    pub async fn level_for(
        &self,
        product_id: i64,
        location_id: i64,
    ) -> DbResult<Option<InventoryLevel>> {
        level_for_on(&mut *self.pool.acquire().await?, product_id, location_id).await
    }

    /// Inserts an inventory row. The UNIQUE(product_id, location_id)
    /// constraint rejects a second row for the same pair.
    pub async fn create(
        &self,
        product_id: i64,
        location_id: i64,
        units: i64,
        status: i64,
    ) -> DbResult<InventoryLevel> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO inventory (product_id, location_id, units, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .bind(units)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory", id))
    }

    /// Overwrites an inventory row's unit count and status.
    pub async fn update(&self, id: i64, units: i64, status: i64) -> DbResult<InventoryLevel> {
        let result = sqlx::query("UPDATE inventory SET units = ?2, status = ?3 WHERE id = ?1")
            .bind(id)
            .bind(units)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Inventory", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory", id))
    }

    /// Soft-disables an inventory row (status = 0).
    pub async fn disable(&self, id: i64) -> DbResult<InventoryLevel> {
        let result = sqlx::query("UPDATE inventory SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(STATUS_DISABLED)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Inventory", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory", id))
    }
}

// =============================================================================
// Executor-Generic Mutations
// =============================================================================
// Used inside the order and stock transactions.

/// Fetches the level row for a (product, location) pair.
pub(crate) async fn level_for_on(
    conn: &mut SqliteConnection,
    product_id: i64,
    location_id: i64,
) -> DbResult<Option<InventoryLevel>> {
    let query =
        format!("SELECT {LEVEL_COLUMNS} FROM inventory WHERE product_id = ?1 AND location_id = ?2");
    let level = sqlx::query_as::<_, InventoryLevel>(&query)
        .bind(product_id)
        .bind(location_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(level)
}

/// Adds units to a (product, location), creating the row if absent.
pub(crate) async fn add_units_on(
    conn: &mut SqliteConnection,
    product_id: i64,
    location_id: i64,
    units: i64,
) -> DbResult<()> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO inventory (product_id, location_id, units, status, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (product_id, location_id)
        DO UPDATE SET units = units + excluded.units
        "#,
    )
    .bind(product_id)
    .bind(location_id)
    .bind(units)
    .bind(STATUS_ACTIVE)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Removes units from a (product, location) with a floor check in the
/// UPDATE predicate. Returns false when the row is missing or the count
/// would go negative - the caller decides which error that is.
pub(crate) async fn try_remove_units_on(
    conn: &mut SqliteConnection,
    product_id: i64,
    location_id: i64,
    units: i64,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE inventory SET units = units - ?3
        WHERE product_id = ?1 AND location_id = ?2 AND units >= ?3
        "#,
    )
    .bind(product_id)
    .bind(location_id)
    .bind(units)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::ProductInput;

    async fn seed(db: &Database) -> (i64, i64) {
        let location = db.locations().create("L1", STATUS_ACTIVE).await.unwrap();
        let product = db
            .products()
            .create(&ProductInput {
                barcode: "4800010".to_string(),
                name: "Instant Noodles".to_string(),
                description: None,
                supplier_price_cents: Money::from_cents(700),
                retail_price_cents: Money::from_cents(1200),
                wholesale_price_cents: Money::from_cents(1000),
                reorder_level: 10,
                is_vat: 0,
                status: STATUS_ACTIVE,
                category_id: None,
            })
            .await
            .unwrap();
        (product.id, location.id)
    }

    #[tokio::test]
    async fn test_unique_pair_constraint() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (product_id, location_id) = seed(&db).await;

        db.inventory()
            .create(product_id, location_id, 5, STATUS_ACTIVE)
            .await
            .unwrap();
        let err = db
            .inventory()
            .create(product_id, location_id, 3, STATUS_ACTIVE)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_add_units_upserts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (product_id, location_id) = seed(&db).await;

        let mut conn = db.pool().acquire().await.unwrap();
        add_units_on(&mut conn, product_id, location_id, 5)
            .await
            .unwrap();
        add_units_on(&mut conn, product_id, location_id, 7)
            .await
            .unwrap();
        drop(conn);

        let level = db
            .inventory()
            .level_for(product_id, location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(level.units, 12);
    }

    #[tokio::test]
    async fn test_remove_units_floor_check() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (product_id, location_id) = seed(&db).await;

        db.inventory()
            .create(product_id, location_id, 10, STATUS_ACTIVE)
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(try_remove_units_on(&mut conn, product_id, location_id, 10)
            .await
            .unwrap());
        // Count is now zero; any further removal must refuse
        assert!(!try_remove_units_on(&mut conn, product_id, location_id, 1)
            .await
            .unwrap());
        // Unknown pair also refuses rather than erroring
        assert!(!try_remove_units_on(&mut conn, product_id + 1, location_id, 1)
            .await
            .unwrap());
    }
}

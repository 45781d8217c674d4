//! # Stock Movement Repository
//!
//! Stock-in deliveries and manual adjustments. Both run inside an explicit
//! transaction: validate, apply the signed delta, write the audit row,
//! commit. Any failure rolls the whole operation back - the bulk variants
//! extend the same transaction over every imported row, so the first invalid
//! row aborts the entire import.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::{DbError, DbResult, WorkflowResult};
use tillpoint_core::{validation, CoreError, StockAction, StockIn};

use crate::repository::{inventory, product};

// =============================================================================
// Commands
// =============================================================================

/// One inbound stock delivery.
#[derive(Debug, Clone)]
pub struct StockInInput {
    pub supplier_id: i64,
    pub product_id: i64,
    pub location_id: i64,
    pub units: i64,
    pub user_id: i64,
    pub status: i64,
}

/// One manual inventory correction.
#[derive(Debug, Clone)]
pub struct StockAdjustmentInput {
    pub product_id: i64,
    pub units: i64,
    pub reason: String,
    pub user_id: i64,
    pub location_id: i64,
    pub action: StockAction,
}

/// Adjustment result: the audit row plus the level it left behind.
#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentReceipt {
    pub adjustment_id: i64,
    pub product_id: i64,
    pub location_id: i64,
    pub current_units: i64,
}

/// Adjustment listing row with names joined in.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdjustmentListing {
    pub id: i64,
    pub product_name: String,
    pub units: i64,
    pub reason: String,
    pub user_name: String,
    pub location_name: String,
    pub action: i64,
    pub created_at: chrono::DateTime<Utc>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for stock-in and stock adjustment operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Records one stock-in delivery and adds the units to inventory,
    /// creating the level row if this is the first delivery for the pair.
    pub async fn stock_in(&self, input: StockInInput) -> WorkflowResult<StockIn> {
        validation::validate_units(input.units).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;
        let id = stock_in_on(&mut tx, &input).await?;
        tx.commit().await?;

        info!(
            stock_in_id = id,
            product_id = input.product_id,
            units = input.units,
            "Stock-in recorded"
        );

        self.get_stock_in(id)
            .await?
            .ok_or_else(|| DbError::not_found("StockIn", id).into())
    }

    /// Records many stock-in rows in one transaction. The first invalid row
    /// aborts the whole batch.
    pub async fn stock_in_bulk(&self, inputs: &[StockInInput]) -> WorkflowResult<usize> {
        let mut tx = self.pool.begin().await?;

        for input in inputs {
            validation::validate_units(input.units).map_err(CoreError::from)?;

            // Bulk imports reference suppliers by spreadsheet id; verify each
            let supplier: Option<i64> =
                sqlx::query_scalar("SELECT id FROM suppliers WHERE id = ?1")
                    .bind(input.supplier_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if supplier.is_none() {
                return Err(DbError::not_found("Supplier", input.supplier_id).into());
            }

            stock_in_on(&mut tx, input).await?;
        }

        tx.commit().await?;

        info!(rows = inputs.len(), "Stock-in import committed");
        Ok(inputs.len())
    }

    /// Applies one manual adjustment: adds or removes units (remove is
    /// floor-checked) and writes the audit row.
    pub async fn adjust(&self, input: StockAdjustmentInput) -> WorkflowResult<AdjustmentReceipt> {
        validation::validate_units(input.units).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;
        let receipt = adjust_on(&mut tx, &input).await?;
        tx.commit().await?;

        info!(
            adjustment_id = receipt.adjustment_id,
            product_id = input.product_id,
            action = input.action.code(),
            units = input.units,
            "Stock adjustment applied"
        );

        Ok(receipt)
    }

    /// Applies many adjustments in one transaction. The first invalid row
    /// aborts the whole batch.
    pub async fn adjust_bulk(
        &self,
        inputs: &[StockAdjustmentInput],
    ) -> WorkflowResult<Vec<AdjustmentReceipt>> {
        let mut tx = self.pool.begin().await?;

        let mut receipts = Vec::with_capacity(inputs.len());
        for input in inputs {
            validation::validate_units(input.units).map_err(CoreError::from)?;
            receipts.push(adjust_on(&mut tx, input).await?);
        }

        tx.commit().await?;

        info!(rows = inputs.len(), "Adjustment import committed");
        Ok(receipts)
    }

    /// Gets one stock-in audit row.
    pub async fn get_stock_in(&self, id: i64) -> DbResult<Option<StockIn>> {
        let row = sqlx::query_as::<_, StockIn>(
            r#"
            SELECT id, reference_no, supplier_id, product_id, location_id,
                   units, user_id, status, created_at
            FROM stock_ins
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists all adjustments with product, user, and location names.
    pub async fn list_adjustments(&self) -> DbResult<Vec<AdjustmentListing>> {
        let rows = sqlx::query_as::<_, AdjustmentListing>(
            r#"
            SELECT
                a.id, p.name AS product_name, a.units, a.reason,
                u.name AS user_name, l.name AS location_name,
                a.action, a.created_at
            FROM stock_adjustments a
            JOIN products p ON p.id = a.product_id
            JOIN users u ON u.id = a.user_id
            JOIN locations l ON l.id = a.location_id
            ORDER BY a.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Transaction Bodies
// =============================================================================

/// Per-row stock-in logic, shared by the single and bulk paths.
async fn stock_in_on(tx: &mut SqliteConnection, input: &StockInInput) -> WorkflowResult<i64> {
    if !product::is_active_on(tx, input.product_id).await? {
        return Err(CoreError::ProductNotFound(input.product_id).into());
    }

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO stock_ins (
            reference_no, supplier_id, product_id, location_id,
            units, user_id, status, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(delivery_reference())
    .bind(input.supplier_id)
    .bind(input.product_id)
    .bind(input.location_id)
    .bind(input.units)
    .bind(input.user_id)
    .bind(input.status)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    inventory::add_units_on(tx, input.product_id, input.location_id, input.units).await?;

    Ok(result.last_insert_rowid())
}

/// Per-row adjustment logic, shared by the single and bulk paths.
async fn adjust_on(
    tx: &mut SqliteConnection,
    input: &StockAdjustmentInput,
) -> WorkflowResult<AdjustmentReceipt> {
    if !product::is_active_on(tx, input.product_id).await? {
        return Err(CoreError::ProductNotFound(input.product_id).into());
    }

    // Adjustments require an existing level row; they never create one
    let level = inventory::level_for_on(tx, input.product_id, input.location_id)
        .await?
        .ok_or_else(|| {
            DbError::not_found(
                "Inventory",
                format!("product {} at location {}", input.product_id, input.location_id),
            )
        })?;

    match input.action {
        StockAction::Add => {
            inventory::add_units_on(tx, input.product_id, input.location_id, input.units).await?;
        }
        StockAction::Remove => {
            let removed = inventory::try_remove_units_on(
                tx,
                input.product_id,
                input.location_id,
                input.units,
            )
            .await?;
            if !removed {
                return Err(CoreError::InsufficientStock {
                    product_id: input.product_id,
                    available: level.units,
                    requested: input.units,
                }
                .into());
            }
        }
    }

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO stock_adjustments (
            product_id, units, reason, user_id, location_id, action, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(input.product_id)
    .bind(input.units)
    .bind(&input.reason)
    .bind(input.user_id)
    .bind(input.location_id)
    .bind(input.action.code())
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let current = inventory::level_for_on(tx, input.product_id, input.location_id)
        .await?
        .map(|l| l.units)
        .unwrap_or(0);

    Ok(AdjustmentReceipt {
        adjustment_id: result.last_insert_rowid(),
        product_id: input.product_id,
        location_id: input.location_id,
        current_units: current,
    })
}

/// 6-digit delivery reference derived from the clock.
fn delivery_reference() -> i64 {
    100_000 + (Utc::now().timestamp_micros() % 900_000).abs()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::ProductInput;
    use crate::repository::supplier::SupplierInput;
    use crate::repository::user::UserInput;
    use tillpoint_core::{Money, STATUS_ACTIVE};

    struct Fixture {
        db: Database,
        product_id: i64,
        location_id: i64,
        supplier_id: i64,
        user_id: i64,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let location = db.locations().create("L1", STATUS_ACTIVE).await.unwrap();
        let supplier = db
            .suppliers()
            .create(&SupplierInput {
                name: "Acme Trading".to_string(),
                address: "12 Pier St".to_string(),
                contact_person: "Ben".to_string(),
                contact_no: "09180000001".to_string(),
                status: STATUS_ACTIVE,
            })
            .await
            .unwrap();
        let user = db
            .users()
            .create(&UserInput {
                username: "stock01".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                name: "Stock Controller".to_string(),
                role: 3,
                status: STATUS_ACTIVE,
                location_id: Some(location.id),
            })
            .await
            .unwrap();
        let product = db
            .products()
            .create(&ProductInput {
                barcode: "4800200".to_string(),
                name: "Canned Tuna".to_string(),
                description: None,
                supplier_price_cents: Money::from_cents(2000),
                retail_price_cents: Money::from_cents(3500),
                wholesale_price_cents: Money::from_cents(3000),
                reorder_level: 12,
                is_vat: 1,
                status: STATUS_ACTIVE,
                category_id: None,
            })
            .await
            .unwrap();

        Fixture {
            db,
            product_id: product.id,
            location_id: location.id,
            supplier_id: supplier.id,
            user_id: user.id,
        }
    }

    fn stock_in_input(f: &Fixture, units: i64) -> StockInInput {
        StockInInput {
            supplier_id: f.supplier_id,
            product_id: f.product_id,
            location_id: f.location_id,
            units,
            user_id: f.user_id,
            status: STATUS_ACTIVE,
        }
    }

    #[tokio::test]
    async fn test_stock_in_creates_then_tops_up_level() {
        let f = fixture().await;
        let repo = f.db.stock();

        let first = repo.stock_in(stock_in_input(&f, 24)).await.unwrap();
        assert!(first.reference_no >= 100_000 && first.reference_no < 1_000_000);

        repo.stock_in(stock_in_input(&f, 6)).await.unwrap();

        let level = f
            .db
            .inventory()
            .level_for(f.product_id, f.location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(level.units, 30);
    }

    #[tokio::test]
    async fn test_stock_in_inactive_product_rejected() {
        let f = fixture().await;
        f.db.products().disable(f.product_id).await.unwrap();

        let err = f
            .db
            .stock()
            .stock_in(stock_in_input(&f, 5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::WorkflowError::Core(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_adjust_add_and_remove() {
        let f = fixture().await;
        f.db.stock().stock_in(stock_in_input(&f, 10)).await.unwrap();

        let receipt = f
            .db
            .stock()
            .adjust(StockAdjustmentInput {
                product_id: f.product_id,
                units: 5,
                reason: "Found in backroom".to_string(),
                user_id: f.user_id,
                location_id: f.location_id,
                action: StockAction::Add,
            })
            .await
            .unwrap();
        assert_eq!(receipt.current_units, 15);

        let receipt = f
            .db
            .stock()
            .adjust(StockAdjustmentInput {
                product_id: f.product_id,
                units: 4,
                reason: "Damaged".to_string(),
                user_id: f.user_id,
                location_id: f.location_id,
                action: StockAction::Remove,
            })
            .await
            .unwrap();
        assert_eq!(receipt.current_units, 11);

        let listing = f.db.stock().list_adjustments().await.unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].product_name, "Canned Tuna");
    }

    #[tokio::test]
    async fn test_adjust_remove_past_zero_rejected() {
        let f = fixture().await;
        f.db.stock().stock_in(stock_in_input(&f, 3)).await.unwrap();

        let err = f
            .db
            .stock()
            .adjust(StockAdjustmentInput {
                product_id: f.product_id,
                units: 4,
                reason: "Shrinkage".to_string(),
                user_id: f.user_id,
                location_id: f.location_id,
                action: StockAction::Remove,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::WorkflowError::Core(CoreError::InsufficientStock { available: 3, .. })
        ));

        // Level unchanged
        let level = f
            .db
            .inventory()
            .level_for(f.product_id, f.location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(level.units, 3);
    }

    #[tokio::test]
    async fn test_adjust_requires_existing_level() {
        let f = fixture().await;

        let err = f
            .db
            .stock()
            .adjust(StockAdjustmentInput {
                product_id: f.product_id,
                units: 1,
                reason: "Count".to_string(),
                user_id: f.user_id,
                location_id: f.location_id,
                action: StockAction::Add,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::WorkflowError::Db(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_bulk_import_aborts_whole_batch() {
        let f = fixture().await;

        // Second row names a nonexistent supplier: nothing may land
        let rows = vec![
            stock_in_input(&f, 10),
            StockInInput {
                supplier_id: 999,
                ..stock_in_input(&f, 5)
            },
        ];
        assert!(f.db.stock().stock_in_bulk(&rows).await.is_err());

        let level = f
            .db
            .inventory()
            .level_for(f.product_id, f.location_id)
            .await
            .unwrap();
        assert!(level.is_none());
    }
}

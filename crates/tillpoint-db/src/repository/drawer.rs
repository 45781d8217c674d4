//! # Cash Drawer Repository
//!
//! Cash drawer sessions and their child records.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Cash Drawer Lifecycle                           │
//! │                                                                     │
//! │  1. START                                                           │
//! │     └── start() → drawer { time_end: NULL, status: 1 }              │
//! │         at most one open drawer per (user, location)                │
//! │                                                                     │
//! │  2. RUNNING TOTALS                                                  │
//! │     ├── order creation  → apply_posting_on() (sales buckets)        │
//! │     ├── settlement      → apply_posting_on() (settled credit)       │
//! │     ├── add_expense()   → child row, cash down                      │
//! │     ├── add_withdrawal()→ child row, cash down (floor-checked)      │
//! │     └── add_cash()      → child row, cash up                        │
//! │                                                                     │
//! │  3. END                                                             │
//! │     └── end() → stamp time_end, status 0                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation is a relative `SET col = col + ?` update, so concurrent
//! postings cannot lose an increment.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult, WorkflowError, WorkflowResult};
use tillpoint_core::{
    validation, CashDrawer, CoreError, DrawerEntry, DrawerPosting, Money, STATUS_ACTIVE,
    STATUS_DISABLED,
};

/// Drawer listing row with the owning user's name joined in.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DrawerListing {
    pub id: i64,
    pub cashier: Option<String>,
    pub user_id: i64,
    pub user_name: String,
    pub location_id: i64,
    pub initial_cash_cents: Money,
    pub total_sales_cents: Money,
    pub withdrawals_cents: Money,
    pub expense_cents: Money,
    pub drawer_cash_cents: Money,
    pub time_start: chrono::DateTime<Utc>,
    pub time_end: Option<chrono::DateTime<Utc>>,
    pub status: i64,
}

const DRAWER_COLUMNS: &str = "id, cashier, user_id, location_id, initial_cash_cents, \
     total_sales_cents, withdrawals_cents, expense_cents, drawer_cash_cents, \
     total_amount_cents, total_discount_cents, total_vat_sale_cents, \
     total_vat_amount_cents, total_vat_exempt_cents, total_cash_sales_cents, \
     total_ewallet_sales_cents, total_bank_transfer_sales_cents, \
     total_credit_sales_cents, total_settled_credit_cents, time_start, time_end, \
     status, created_at";

/// Repository for cash drawer operations.
#[derive(Debug, Clone)]
pub struct DrawerRepository {
    pool: SqlitePool,
}

impl DrawerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DrawerRepository { pool }
    }

    /// Lists all drawer sessions with the owning user joined in.
    pub async fn list(&self) -> DbResult<Vec<DrawerListing>> {
        let drawers = sqlx::query_as::<_, DrawerListing>(
            r#"
            SELECT
                d.id, d.cashier, d.user_id, u.name AS user_name, d.location_id,
                d.initial_cash_cents, d.total_sales_cents, d.withdrawals_cents,
                d.expense_cents, d.drawer_cash_cents,
                d.time_start, d.time_end, d.status
            FROM cash_drawers d
            JOIN users u ON u.id = d.user_id
            ORDER BY d.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(drawers)
    }

    /// Gets a drawer by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<CashDrawer>> {
        let query = format!("SELECT {DRAWER_COLUMNS} FROM cash_drawers WHERE id = ?1");
        let drawer = sqlx::query_as::<_, CashDrawer>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(drawer)
    }

    /// Gets the open drawer for a (user, location), if any.
    pub async fn open_for(&self, user_id: i64, location_id: i64) -> DbResult<Option<CashDrawer>> {
        open_for_on(&mut *self.pool.acquire().await?, user_id, location_id).await
    }

    /// Starts a new drawer session.
    ///
    /// Fails when the initial cash is negative or when an open drawer
    /// already exists for the (user, location). The partial unique index on
    /// open drawers backstops the pre-check.
    pub async fn start(
        &self,
        user_id: i64,
        location_id: i64,
        cashier: Option<String>,
        initial_cash: Money,
    ) -> WorkflowResult<CashDrawer> {
        validation::validate_non_negative_amount("initial_cash", initial_cash)
            .map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        if open_for_on(&mut tx, user_id, location_id).await?.is_some() {
            return Err(CoreError::DrawerAlreadyOpen {
                user_id,
                location_id,
            }
            .into());
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO cash_drawers (
                cashier, user_id, location_id,
                initial_cash_cents, drawer_cash_cents,
                time_start, time_end, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?4, ?5, NULL, ?6, ?5)
            "#,
        )
        .bind(&cashier)
        .bind(user_id)
        .bind(location_id)
        .bind(initial_cash)
        .bind(now)
        .bind(STATUS_ACTIVE)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        tx.commit().await?;

        debug!(drawer_id = id, user_id, location_id, "Cash drawer started");

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("CashDrawer", id).into())
    }

    /// Ends an open drawer session: stamps the close time, sets status 0.
    pub async fn end(&self, drawer_id: i64) -> WorkflowResult<CashDrawer> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE cash_drawers SET time_end = ?2, status = ?3
            WHERE id = ?1 AND time_end IS NULL
            "#,
        )
        .bind(drawer_id)
        .bind(now)
        .bind(STATUS_DISABLED)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::DrawerClosed(drawer_id).into());
        }

        self.get(drawer_id)
            .await?
            .ok_or_else(|| DbError::not_found("CashDrawer", drawer_id).into())
    }

    /// Records an expense against an open drawer: appends a child row,
    /// reduces drawer cash, increases the expense running total.
    pub async fn add_expense(
        &self,
        drawer_id: i64,
        description: String,
        amount: Money,
        remarks: Option<String>,
    ) -> WorkflowResult<DrawerEntry> {
        validation::validate_positive_amount("expense amount", amount).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        if fetch_open_on(&mut tx, drawer_id).await?.is_none() {
            return Err(CoreError::DrawerClosed(drawer_id).into());
        }

        let entry_id =
            insert_entry_on(&mut tx, "drawer_expenses", drawer_id, &description, amount, &remarks)
                .await?;

        sqlx::query(
            r#"
            UPDATE cash_drawers SET
                expense_cents = expense_cents + ?2,
                drawer_cash_cents = drawer_cash_cents - ?2
            WHERE id = ?1
            "#,
        )
        .bind(drawer_id)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        let entry = fetch_entry_on(&mut tx, "drawer_expenses", entry_id).await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Records a cash withdrawal against an open drawer. Fails when the
    /// drawer holds less cash than the withdrawal.
    pub async fn add_withdrawal(
        &self,
        drawer_id: i64,
        description: String,
        amount: Money,
        remarks: Option<String>,
    ) -> WorkflowResult<DrawerEntry> {
        validation::validate_positive_amount("withdrawal amount", amount)
            .map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let drawer = fetch_open_on(&mut tx, drawer_id)
            .await?
            .ok_or(CoreError::DrawerClosed(drawer_id))?;

        if drawer.drawer_cash_cents < amount {
            return Err(CoreError::InsufficientDrawerCash {
                available: drawer.drawer_cash_cents,
                requested: amount,
            }
            .into());
        }

        let entry_id = insert_entry_on(
            &mut tx,
            "drawer_withdrawals",
            drawer_id,
            &description,
            amount,
            &remarks,
        )
        .await?;

        sqlx::query(
            r#"
            UPDATE cash_drawers SET
                withdrawals_cents = withdrawals_cents + ?2,
                drawer_cash_cents = drawer_cash_cents - ?2
            WHERE id = ?1
            "#,
        )
        .bind(drawer_id)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        let entry = fetch_entry_on(&mut tx, "drawer_withdrawals", entry_id).await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Adds a cash top-up to an open drawer: bumps both the initial-cash
    /// total and the drawer cash.
    pub async fn add_cash(
        &self,
        drawer_id: i64,
        description: String,
        amount: Money,
        remarks: Option<String>,
    ) -> WorkflowResult<DrawerEntry> {
        validation::validate_positive_amount("initial cash amount", amount)
            .map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        if fetch_open_on(&mut tx, drawer_id).await?.is_none() {
            return Err(CoreError::DrawerClosed(drawer_id).into());
        }

        let entry_id = insert_entry_on(
            &mut tx,
            "drawer_cash_additions",
            drawer_id,
            &description,
            amount,
            &remarks,
        )
        .await?;

        sqlx::query(
            r#"
            UPDATE cash_drawers SET
                initial_cash_cents = initial_cash_cents + ?2,
                drawer_cash_cents = drawer_cash_cents + ?2
            WHERE id = ?1
            "#,
        )
        .bind(drawer_id)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        let entry = fetch_entry_on(&mut tx, "drawer_cash_additions", entry_id).await?;
        tx.commit().await?;

        Ok(entry)
    }
}

// =============================================================================
// Executor-Generic Helpers
// =============================================================================
// The order workflow posts into the drawer from inside its own transaction.

/// Fetches the open drawer for a (user, location) pair.
pub(crate) async fn open_for_on(
    conn: &mut SqliteConnection,
    user_id: i64,
    location_id: i64,
) -> DbResult<Option<CashDrawer>> {
    let query = format!(
        "SELECT {DRAWER_COLUMNS} FROM cash_drawers \
         WHERE user_id = ?1 AND location_id = ?2 AND time_end IS NULL"
    );
    let drawer = sqlx::query_as::<_, CashDrawer>(&query)
        .bind(user_id)
        .bind(location_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(drawer)
}

/// Fetches an open drawer by ID.
pub(crate) async fn fetch_open_on(
    conn: &mut SqliteConnection,
    drawer_id: i64,
) -> DbResult<Option<CashDrawer>> {
    let query =
        format!("SELECT {DRAWER_COLUMNS} FROM cash_drawers WHERE id = ?1 AND time_end IS NULL");
    let drawer = sqlx::query_as::<_, CashDrawer>(&query)
        .bind(drawer_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(drawer)
}

/// Applies a posting's deltas to a drawer in one relative UPDATE.
pub(crate) async fn apply_posting_on(
    conn: &mut SqliteConnection,
    drawer_id: i64,
    posting: &DrawerPosting,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE cash_drawers SET
            total_sales_cents = total_sales_cents + ?2,
            total_amount_cents = total_amount_cents + ?3,
            total_discount_cents = total_discount_cents + ?4,
            total_vat_sale_cents = total_vat_sale_cents + ?5,
            total_vat_amount_cents = total_vat_amount_cents + ?6,
            total_vat_exempt_cents = total_vat_exempt_cents + ?7,
            total_cash_sales_cents = total_cash_sales_cents + ?8,
            total_ewallet_sales_cents = total_ewallet_sales_cents + ?9,
            total_bank_transfer_sales_cents = total_bank_transfer_sales_cents + ?10,
            total_credit_sales_cents = total_credit_sales_cents + ?11,
            total_settled_credit_cents = total_settled_credit_cents + ?12,
            drawer_cash_cents = drawer_cash_cents + ?13
        WHERE id = ?1
        "#,
    )
    .bind(drawer_id)
    .bind(posting.total_sales)
    .bind(posting.total_amount)
    .bind(posting.total_discount)
    .bind(posting.total_vat_sale)
    .bind(posting.total_vat_amount)
    .bind(posting.total_vat_exempt)
    .bind(posting.total_cash_sales)
    .bind(posting.total_ewallet_sales)
    .bind(posting.total_bank_transfer_sales)
    .bind(posting.total_credit_sales)
    .bind(posting.total_settled_credit)
    .bind(posting.drawer_cash)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("CashDrawer", drawer_id));
    }

    Ok(())
}

/// Inserts one child record (expense, withdrawal, or top-up).
async fn insert_entry_on(
    conn: &mut SqliteConnection,
    table: &str,
    drawer_id: i64,
    description: &str,
    amount: Money,
    remarks: &Option<String>,
) -> DbResult<i64> {
    let now = Utc::now();

    let query = format!(
        "INSERT INTO {table} (drawer_id, description, amount_cents, remarks, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)"
    );
    let result = sqlx::query(&query)
        .bind(drawer_id)
        .bind(description)
        .bind(amount)
        .bind(remarks)
        .execute(&mut *conn)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Fetches one child record back.
async fn fetch_entry_on(
    conn: &mut SqliteConnection,
    table: &str,
    id: i64,
) -> DbResult<DrawerEntry> {
    let query = format!(
        "SELECT id, drawer_id, description, amount_cents, remarks, created_at \
         FROM {table} WHERE id = ?1"
    );
    let entry = sqlx::query_as::<_, DrawerEntry>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    entry.ok_or_else(|| DbError::not_found("DrawerEntry", id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn seed(db: &Database) -> (i64, i64) {
        let location = db.locations().create("L1", STATUS_ACTIVE).await.unwrap();
        let user = db
            .users()
            .create(&crate::repository::user::UserInput {
                username: "cashier01".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                name: "Cashier One".to_string(),
                role: 1,
                status: STATUS_ACTIVE,
                location_id: Some(location.id),
            })
            .await
            .unwrap();
        (user.id, location.id)
    }

    #[tokio::test]
    async fn test_start_zeroes_totals_and_seeds_cash() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (user_id, location_id) = seed(&db).await;

        let drawer = db
            .drawers()
            .start(user_id, location_id, None, Money::from_cents(10000))
            .await
            .unwrap();

        assert_eq!(drawer.initial_cash_cents.cents(), 10000);
        assert_eq!(drawer.drawer_cash_cents.cents(), 10000);
        assert!(drawer.total_sales_cents.is_zero());
        assert!(drawer.time_end.is_none());
        assert_eq!(drawer.status, STATUS_ACTIVE);
    }

    #[tokio::test]
    async fn test_second_open_drawer_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (user_id, location_id) = seed(&db).await;
        let repo = db.drawers();

        repo.start(user_id, location_id, None, Money::zero())
            .await
            .unwrap();

        let err = repo
            .start(user_id, location_id, None, Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Core(CoreError::DrawerAlreadyOpen { .. })
        ));

        // No second row was created
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_negative_initial_cash_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (user_id, location_id) = seed(&db).await;

        let err = db
            .drawers()
            .start(user_id, location_id, None, Money::from_cents(-1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Core(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_end_then_restart() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (user_id, location_id) = seed(&db).await;
        let repo = db.drawers();

        let drawer = repo
            .start(user_id, location_id, None, Money::zero())
            .await
            .unwrap();
        let closed = repo.end(drawer.id).await.unwrap();
        assert!(closed.time_end.is_some());
        assert_eq!(closed.status, 0);

        // Ending twice fails
        assert!(repo.end(drawer.id).await.is_err());

        // A new session can start now
        repo.start(user_id, location_id, None, Money::zero())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expense_reduces_drawer_cash() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (user_id, location_id) = seed(&db).await;
        let repo = db.drawers();

        let drawer = repo
            .start(user_id, location_id, None, Money::from_cents(10000))
            .await
            .unwrap();

        repo.add_expense(drawer.id, "Ice".to_string(), Money::from_cents(1500), None)
            .await
            .unwrap();

        let after = repo.get(drawer.id).await.unwrap().unwrap();
        assert_eq!(after.expense_cents.cents(), 1500);
        assert_eq!(after.drawer_cash_cents.cents(), 8500);
    }

    #[tokio::test]
    async fn test_withdrawal_floor_check() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (user_id, location_id) = seed(&db).await;
        let repo = db.drawers();

        let drawer = repo
            .start(user_id, location_id, None, Money::from_cents(5000))
            .await
            .unwrap();

        let err = repo
            .add_withdrawal(
                drawer.id,
                "Bank drop".to_string(),
                Money::from_cents(6000),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Core(CoreError::InsufficientDrawerCash { .. })
        ));

        // Drawer cash unchanged after the rejected withdrawal
        let after = repo.get(drawer.id).await.unwrap().unwrap();
        assert_eq!(after.drawer_cash_cents.cents(), 5000);
        assert!(after.withdrawals_cents.is_zero());
    }

    #[tokio::test]
    async fn test_zero_amount_entries_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (user_id, location_id) = seed(&db).await;
        let repo = db.drawers();

        let drawer = repo
            .start(user_id, location_id, None, Money::from_cents(5000))
            .await
            .unwrap();

        for result in [
            repo.add_expense(drawer.id, "x".to_string(), Money::zero(), None)
                .await,
            repo.add_withdrawal(drawer.id, "x".to_string(), Money::zero(), None)
                .await,
            repo.add_cash(drawer.id, "x".to_string(), Money::zero(), None)
                .await,
        ] {
            assert!(matches!(
                result.unwrap_err(),
                WorkflowError::Core(CoreError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_cash_addition_raises_both_totals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (user_id, location_id) = seed(&db).await;
        let repo = db.drawers();

        let drawer = repo
            .start(user_id, location_id, None, Money::from_cents(5000))
            .await
            .unwrap();

        repo.add_cash(
            drawer.id,
            "Change fund".to_string(),
            Money::from_cents(2000),
            None,
        )
        .await
        .unwrap();

        let after = repo.get(drawer.id).await.unwrap().unwrap();
        assert_eq!(after.initial_cash_cents.cents(), 7000);
        assert_eq!(after.drawer_cash_cents.cents(), 7000);
    }
}

//! # Order Repository
//!
//! Order creation and credit settlement - the one genuinely multi-table
//! workflow in the system.
//!
//! ## Order Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              create_order() - single transaction                    │
//! │                                                                     │
//! │  1. location exists?                 → NotFound                     │
//! │  2. every product exists?            → NotFound                     │
//! │  3. read-phase stock check           → InsufficientStock (400)      │
//! │  4. daily sequence → INV{n}-{date}                                  │
//! │  5. resolve discounts, compute line + order totals                  │
//! │  6. insert header (credit ⇒ pending) + lines                        │
//! │  7. guarded decrement: units = units - q WHERE units >= q           │
//! │  8. open drawer for (user, location) → posting by payment type      │
//! │  9. loyalty accrual (when the customer resolves)                    │
//! │ 10. COMMIT                                                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any failure drops the transaction: no order row, no stock mutation, no
//! drawer movement. The guarded decrement in step 7 re-checks the floor the
//! read phase saw, so two concurrent orders cannot overdraw one stock row.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbResult, WorkflowResult};
use crate::repository::{customer, drawer, inventory};
use tillpoint_core::checkout::{line_totals, DigitalPayment};
use tillpoint_core::invoice::invoice_number;
use tillpoint_core::{
    validation, CoreError, DrawerPosting, Money, Order, OrderStatus, OrderTotals, PaymentType,
    TransactionType, VatTotals, STATUS_ACTIVE,
};

// =============================================================================
// Commands
// =============================================================================

/// One requested order line.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: i64,
    pub quantity: i64,
    /// Resolved against *active* discounts; missing or disabled ids
    /// silently mean 0%.
    pub discount_id: Option<i64>,
}

/// A validated order-creation command.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub location_id: i64,
    pub user_id: i64,
    pub customer_id: Option<i64>,
    pub transaction_type: TransactionType,
    pub payment_type: PaymentType,
    pub vat: VatTotals,
    pub digital: DigitalPayment,
    pub lines: Vec<NewOrderLine>,
}

/// A credit settlement command.
#[derive(Debug, Clone)]
pub struct SettleOrder {
    pub invoice_no: String,
    pub location_id: i64,
    pub user_id: i64,
    pub payment_type: PaymentType,
    pub digital: DigitalPayment,
    pub amount: Money,
}

// =============================================================================
// Results
// =============================================================================

/// What order creation hands back for the response and the event payload.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    pub order_id: i64,
    pub invoice_no: String,
    pub status: i64,
    pub total_amount_cents: Money,
    pub total_discount_cents: Money,
    pub total_vat_sale_cents: Money,
    pub total_vat_amount_cents: Money,
    pub total_vat_exempt_cents: Money,
    pub payment_type: i64,
    pub account_name: String,
    pub account_number: String,
    pub reference_no: String,
    pub digital_payment_amount_cents: Money,
    pub points_awarded: Option<i64>,
}

/// What a settlement hands back.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementReceipt {
    pub invoice_no: String,
    /// The drawer's settled-credit running total after this settlement.
    pub total_settled_credit_cents: Money,
}

// =============================================================================
// Listing DTOs
// =============================================================================

/// Full order listing row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderListing {
    pub id: i64,
    pub invoice_no: String,
    pub status: i64,
    pub total_amount_cents: Money,
    pub payment_type: i64,
    pub transaction_type: i64,
    pub location_id: i64,
    pub location_name: String,
    pub user_id: i64,
    pub user_name: String,
    pub created_at: chrono::DateTime<Utc>,
    #[sqlx(skip)]
    pub lines: Vec<OrderLineListing>,
}

/// One line inside a full order listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderLineListing {
    #[serde(skip)]
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub retail_price_cents: Money,
    pub quantity: i64,
    pub subtotal_cents: Money,
}

/// A pending credit order joined with its customer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CreditOrderListing {
    pub invoice_no: String,
    pub total_amount_cents: Money,
    pub created_at: chrono::DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub contact_no: String,
    pub email: String,
}

/// A settled order joined with its customer (location listing).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SettledOrderListing {
    pub invoice_no: String,
    pub total_amount_cents: Money,
    pub customer_name: String,
    pub transaction_type: i64,
    pub payment_type: i64,
    pub created_at: chrono::DateTime<Utc>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates an order: validates, computes totals, persists the header and
    /// lines, decrements stock, posts into the open drawer, and accrues
    /// loyalty - all in one transaction.
    pub async fn create_order(&self, new_order: NewOrder) -> WorkflowResult<OrderReceipt> {
        validation::validate_order_lines(new_order.lines.len()).map_err(CoreError::from)?;
        for line in &new_order.lines {
            validation::validate_quantity(line.quantity).map_err(CoreError::from)?;
        }

        let mut tx = self.pool.begin().await?;

        // Location must exist
        let location: Option<i64> = sqlx::query_scalar("SELECT id FROM locations WHERE id = ?1")
            .bind(new_order.location_id)
            .fetch_optional(&mut *tx)
            .await?;
        if location.is_none() {
            return Err(CoreError::LocationNotFound(new_order.location_id).into());
        }

        // Every product must exist; pull sell prices while we're here
        let mut priced_lines = Vec::with_capacity(new_order.lines.len());
        for line in &new_order.lines {
            let price: Option<Money> =
                sqlx::query_scalar("SELECT retail_price_cents FROM products WHERE id = ?1")
                    .bind(line.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let price = price.ok_or(CoreError::ProductNotFound(line.product_id))?;
            priced_lines.push((line, price));
        }

        // Read-phase stock check; the decrement below re-checks the floor
        for (line, _) in &priced_lines {
            let level =
                inventory::level_for_on(&mut tx, line.product_id, new_order.location_id).await?;
            let available = level.map(|l| l.units).unwrap_or(0);
            if available < line.quantity {
                return Err(CoreError::InsufficientStock {
                    product_id: line.product_id,
                    available,
                    requested: line.quantity,
                }
                .into());
            }
        }

        // Daily invoice sequence
        let now = Utc::now();
        let today = now.date_naive();
        let day_start = today.and_time(chrono::NaiveTime::MIN).and_utc();
        let day_end = day_start + chrono::Duration::days(1);

        let todays_orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE created_at >= ?1 AND created_at < ?2",
        )
        .bind(day_start)
        .bind(day_end)
        .fetch_one(&mut *tx)
        .await?;

        let invoice_no = invoice_number(todays_orders + 1, today);

        // Resolve discounts and accumulate totals
        let mut totals = OrderTotals::default();
        let mut computed_lines = Vec::with_capacity(priced_lines.len());
        for (line, price) in &priced_lines {
            let discount_pct = match line.discount_id {
                Some(discount_id) => {
                    // Inactive or missing discounts silently mean 0%
                    sqlx::query_scalar::<_, i64>(
                        "SELECT percentage FROM discounts WHERE id = ?1 AND status = ?2",
                    )
                    .bind(discount_id)
                    .bind(STATUS_ACTIVE)
                    .fetch_optional(&mut *tx)
                    .await?
                    .unwrap_or(0)
                }
                None => 0,
            };

            let computed = line_totals(*price, line.quantity, discount_pct);
            totals.add_line(computed);
            computed_lines.push((line, computed));
        }

        // Persist the header
        let status = OrderStatus::for_new_order(new_order.payment_type);

        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                invoice_no, status,
                total_amount_cents, total_discount_cents,
                total_vat_sale_cents, total_vat_amount_cents, total_vat_exempt_cents,
                transaction_type, payment_type,
                account_name, account_number, reference_no, digital_payment_amount_cents,
                location_id, user_id, customer_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
        )
        .bind(&invoice_no)
        .bind(status.code())
        .bind(totals.amount)
        .bind(totals.discount)
        .bind(new_order.vat.vat_sale)
        .bind(new_order.vat.vat_amount)
        .bind(new_order.vat.vat_exempt)
        .bind(new_order.transaction_type.code())
        .bind(new_order.payment_type.code())
        .bind(&new_order.digital.account_name)
        .bind(&new_order.digital.account_number)
        .bind(&new_order.digital.reference_no)
        .bind(new_order.digital.amount)
        .bind(new_order.location_id)
        .bind(new_order.user_id)
        .bind(new_order.customer_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let order_id = result.last_insert_rowid();

        // Persist lines and decrement stock
        for (line, computed) in &computed_lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, product_id, quantity, discount_id, subtotal_cents)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.discount_id)
            .bind(computed.subtotal)
            .execute(&mut *tx)
            .await?;

            let removed = inventory::try_remove_units_on(
                &mut tx,
                line.product_id,
                new_order.location_id,
                line.quantity,
            )
            .await?;
            if !removed {
                // A concurrent order won the stock between our read and write
                let level =
                    inventory::level_for_on(&mut tx, line.product_id, new_order.location_id)
                        .await?;
                return Err(CoreError::InsufficientStock {
                    product_id: line.product_id,
                    available: level.map(|l| l.units).unwrap_or(0),
                    requested: line.quantity,
                }
                .into());
            }
        }

        // Post into the open drawer for this cashier and location
        let open_drawer =
            drawer::open_for_on(&mut tx, new_order.user_id, new_order.location_id).await?;
        let open_drawer = open_drawer.ok_or(CoreError::NoOpenDrawer {
            user_id: new_order.user_id,
            location_id: new_order.location_id,
        })?;

        let posting = DrawerPosting::for_sale(new_order.payment_type, totals, new_order.vat);
        drawer::apply_posting_on(&mut tx, open_drawer.id, &posting).await?;

        // Loyalty accrual; an unknown customer id is ignored
        let points_awarded = match new_order.customer_id {
            Some(customer_id) => customer::award_on(&mut tx, customer_id, totals.amount).await?,
            None => None,
        };

        tx.commit().await?;

        info!(
            order_id,
            invoice_no = %invoice_no,
            total = %totals.amount,
            payment_type = new_order.payment_type.code(),
            "Order created"
        );

        Ok(OrderReceipt {
            order_id,
            invoice_no,
            status: status.code(),
            total_amount_cents: totals.amount,
            total_discount_cents: totals.discount,
            total_vat_sale_cents: new_order.vat.vat_sale,
            total_vat_amount_cents: new_order.vat.vat_amount,
            total_vat_exempt_cents: new_order.vat.vat_exempt,
            payment_type: new_order.payment_type.code(),
            account_name: new_order.digital.account_name,
            account_number: new_order.digital.account_number,
            reference_no: new_order.digital.reference_no,
            digital_payment_amount_cents: new_order.digital.amount,
            points_awarded,
        })
    }

    /// Settles a credit order by invoice number: marks it paid, stores or
    /// blanks the digital-payment fields, and posts the settled amount into
    /// the open drawer. One transaction.
    pub async fn settle_order(&self, settle: SettleOrder) -> WorkflowResult<SettlementReceipt> {
        let mut tx = self.pool.begin().await?;

        let order_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM orders WHERE invoice_no = ?1")
                .bind(&settle.invoice_no)
                .fetch_optional(&mut *tx)
                .await?;
        let order_id = order_id.ok_or_else(|| CoreError::OrderNotFound(settle.invoice_no.clone()))?;

        sqlx::query(
            r#"
            UPDATE orders SET
                status = ?2,
                account_name = ?3,
                account_number = ?4,
                reference_no = ?5,
                digital_payment_amount_cents = ?6
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .bind(OrderStatus::Settled.code())
        .bind(&settle.digital.account_name)
        .bind(&settle.digital.account_number)
        .bind(&settle.digital.reference_no)
        .bind(settle.digital.amount)
        .execute(&mut *tx)
        .await?;

        let open_drawer = drawer::open_for_on(&mut tx, settle.user_id, settle.location_id).await?;
        let open_drawer = open_drawer.ok_or(CoreError::NoOpenDrawer {
            user_id: settle.user_id,
            location_id: settle.location_id,
        })?;

        let posting = DrawerPosting::for_settlement(settle.payment_type, settle.amount);
        drawer::apply_posting_on(&mut tx, open_drawer.id, &posting).await?;

        let settled_total = drawer::fetch_open_on(&mut tx, open_drawer.id)
            .await?
            .map(|d| d.total_settled_credit_cents)
            .unwrap_or(open_drawer.total_settled_credit_cents + settle.amount);

        tx.commit().await?;

        info!(
            invoice_no = %settle.invoice_no,
            amount = %settle.amount,
            "Credit order settled"
        );

        Ok(SettlementReceipt {
            invoice_no: settle.invoice_no,
            total_settled_credit_cents: settled_total,
        })
    }

    /// Gets an order by invoice number.
    pub async fn find_by_invoice(&self, invoice_no: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT
                id, invoice_no, status,
                total_amount_cents, total_discount_cents,
                total_vat_sale_cents, total_vat_amount_cents, total_vat_exempt_cents,
                transaction_type, payment_type,
                account_name, account_number, reference_no, digital_payment_amount_cents,
                location_id, user_id, customer_id, created_at
            FROM orders
            WHERE invoice_no = ?1
            "#,
        )
        .bind(invoice_no)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lists all orders with their lines, newest first.
    pub async fn list(&self) -> DbResult<Vec<OrderListing>> {
        let mut orders = sqlx::query_as::<_, OrderListing>(
            r#"
            SELECT
                o.id, o.invoice_no, o.status, o.total_amount_cents,
                o.payment_type, o.transaction_type,
                o.location_id, l.name AS location_name,
                o.user_id, u.name AS user_name,
                o.created_at
            FROM orders o
            JOIN locations l ON l.id = o.location_id
            JOIN users u ON u.id = o.user_id
            ORDER BY o.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let lines = sqlx::query_as::<_, OrderLineListing>(
            r#"
            SELECT
                ol.order_id, ol.product_id, p.name AS product_name,
                p.retail_price_cents, ol.quantity, ol.subtotal_cents
            FROM order_lines ol
            JOIN products p ON p.id = ol.product_id
            ORDER BY ol.order_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        for order in &mut orders {
            order.lines = lines
                .iter()
                .filter(|line| line.order_id == order.id)
                .cloned()
                .collect();
        }

        Ok(orders)
    }

    /// Lists pending credit orders for a location, joined with their
    /// customers.
    pub async fn credit_orders(&self, location_id: i64) -> DbResult<Vec<CreditOrderListing>> {
        let orders = sqlx::query_as::<_, CreditOrderListing>(
            r#"
            SELECT
                o.invoice_no, o.total_amount_cents, o.created_at,
                c.first_name, c.last_name, c.contact_no, c.email
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE o.location_id = ?1 AND o.status = ?2
            ORDER BY o.id DESC
            "#,
        )
        .bind(location_id)
        .bind(OrderStatus::PendingCredit.code())
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists settled orders for a location, joined with their customers.
    pub async fn settled_orders(&self, location_id: i64) -> DbResult<Vec<SettledOrderListing>> {
        let orders = sqlx::query_as::<_, SettledOrderListing>(
            r#"
            SELECT
                o.invoice_no, o.total_amount_cents,
                c.first_name || ' ' || c.last_name AS customer_name,
                o.transaction_type, o.payment_type, o.created_at
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE o.location_id = ?1 AND o.status = ?2
            ORDER BY o.id DESC
            "#,
        )
        .bind(location_id)
        .bind(OrderStatus::Settled.code())
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Sum of line subtotals for an order. Used to audit the header total.
    pub async fn line_subtotal_sum(&self, order_id: i64) -> DbResult<Money> {
        let sum: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(subtotal_cents) FROM order_lines WHERE order_id = ?1",
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(sum.unwrap_or(0)))
    }

    /// Debug helper: total number of order rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::CustomerInput;
    use crate::repository::product::ProductInput;
    use crate::repository::user::UserInput;

    struct Fixture {
        db: Database,
        location_id: i64,
        user_id: i64,
        product_id: i64,
    }

    /// Location L1, product P1 with 10 units at 100.00 retail, a cashier,
    /// and an open drawer seeded with 50.00.
    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let location = db.locations().create("L1", STATUS_ACTIVE).await.unwrap();
        let user = db
            .users()
            .create(&UserInput {
                username: "cashier01".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                name: "Cashier One".to_string(),
                role: 1,
                status: STATUS_ACTIVE,
                location_id: Some(location.id),
            })
            .await
            .unwrap();
        let product = db
            .products()
            .create(&ProductInput {
                barcode: "4800100".to_string(),
                name: "P1".to_string(),
                description: None,
                supplier_price_cents: Money::from_cents(6000),
                retail_price_cents: Money::from_cents(10000),
                wholesale_price_cents: Money::from_cents(8000),
                reorder_level: 5,
                is_vat: 1,
                status: STATUS_ACTIVE,
                category_id: None,
            })
            .await
            .unwrap();
        db.inventory()
            .create(product.id, location.id, 10, STATUS_ACTIVE)
            .await
            .unwrap();
        db.drawers()
            .start(user.id, location.id, None, Money::from_cents(5000))
            .await
            .unwrap();

        Fixture {
            db,
            location_id: location.id,
            user_id: user.id,
            product_id: product.id,
        }
    }

    fn cash_order(fixture: &Fixture, quantity: i64) -> NewOrder {
        NewOrder {
            location_id: fixture.location_id,
            user_id: fixture.user_id,
            customer_id: None,
            transaction_type: TransactionType::Retail,
            payment_type: PaymentType::Cash,
            vat: VatTotals::default(),
            digital: DigitalPayment::default(),
            lines: vec![NewOrderLine {
                product_id: fixture.product_id,
                quantity,
                discount_id: None,
            }],
        }
    }

    #[tokio::test]
    async fn test_cash_order_settles_stock_and_drawer() {
        let f = fixture().await;

        let receipt = f.db.orders().create_order(cash_order(&f, 3)).await.unwrap();

        // Order totals: 3 * 100.00, no discount
        assert_eq!(receipt.total_amount_cents.cents(), 30000);
        assert_eq!(receipt.total_discount_cents.cents(), 0);
        assert_eq!(receipt.status, OrderStatus::Settled.code());

        // Inventory drops 10 -> 7
        let level = f
            .db
            .inventory()
            .level_for(f.product_id, f.location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(level.units, 7);

        // Drawer: cash bucket and physical cash both up by 300.00
        let drawer = f
            .db
            .drawers()
            .open_for(f.user_id, f.location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(drawer.total_cash_sales_cents.cents(), 30000);
        assert_eq!(drawer.drawer_cash_cents.cents(), 5000 + 30000);
        assert_eq!(drawer.total_sales_cents.cents(), 30000);

        // Header total equals the sum of line subtotals
        let sum = f.db.orders().line_subtotal_sum(receipt.order_id).await.unwrap();
        assert_eq!(sum, receipt.total_amount_cents);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rejects_without_mutation() {
        let f = fixture().await;

        let err = f
            .db
            .orders()
            .create_order(cash_order(&f, 15))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::WorkflowError::Core(CoreError::InsufficientStock {
                available: 10,
                requested: 15,
                ..
            })
        ));

        // No order row, no inventory mutation, no drawer movement
        assert_eq!(f.db.orders().count().await.unwrap(), 0);
        let level = f
            .db
            .inventory()
            .level_for(f.product_id, f.location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(level.units, 10);
        let drawer = f
            .db
            .drawers()
            .open_for(f.user_id, f.location_id)
            .await
            .unwrap()
            .unwrap();
        assert!(drawer.total_sales_cents.is_zero());
    }

    #[tokio::test]
    async fn test_unknown_location_and_product() {
        let f = fixture().await;

        let mut order = cash_order(&f, 1);
        order.location_id = 999;
        assert!(matches!(
            f.db.orders().create_order(order).await.unwrap_err(),
            crate::error::WorkflowError::Core(CoreError::LocationNotFound(999))
        ));

        let mut order = cash_order(&f, 1);
        order.lines[0].product_id = 999;
        assert!(matches!(
            f.db.orders().create_order(order).await.unwrap_err(),
            crate::error::WorkflowError::Core(CoreError::ProductNotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_empty_line_list_rejected() {
        let f = fixture().await;

        let mut order = cash_order(&f, 1);
        order.lines.clear();
        assert!(matches!(
            f.db.orders().create_order(order).await.unwrap_err(),
            crate::error::WorkflowError::Core(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_no_open_drawer_rejected() {
        let f = fixture().await;

        // Close the seeded drawer first
        let drawer = f
            .db
            .drawers()
            .open_for(f.user_id, f.location_id)
            .await
            .unwrap()
            .unwrap();
        f.db.drawers().end(drawer.id).await.unwrap();

        let err = f
            .db
            .orders()
            .create_order(cash_order(&f, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::WorkflowError::Core(CoreError::NoOpenDrawer { .. })
        ));

        // The rejected order also left no stock mutation behind
        let level = f
            .db
            .inventory()
            .level_for(f.product_id, f.location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(level.units, 10);
        assert_eq!(f.db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_discount_resolution_and_totals() {
        let f = fixture().await;
        let discount = f
            .db
            .discounts()
            .create("Promo", 10, STATUS_ACTIVE)
            .await
            .unwrap();

        let mut order = cash_order(&f, 3);
        order.lines[0].discount_id = Some(discount.id);

        let receipt = f.db.orders().create_order(order).await.unwrap();
        assert_eq!(receipt.total_amount_cents.cents(), 27000);
        assert_eq!(receipt.total_discount_cents.cents(), 3000);
    }

    #[tokio::test]
    async fn test_disabled_discount_degrades_to_zero() {
        let f = fixture().await;
        let discount = f
            .db
            .discounts()
            .create("Dead promo", 50, STATUS_ACTIVE)
            .await
            .unwrap();
        f.db.discounts().disable(discount.id).await.unwrap();

        let mut order = cash_order(&f, 2);
        order.lines[0].discount_id = Some(discount.id);

        let receipt = f.db.orders().create_order(order).await.unwrap();
        assert_eq!(receipt.total_amount_cents.cents(), 20000);
        assert_eq!(receipt.total_discount_cents.cents(), 0);
    }

    #[tokio::test]
    async fn test_credit_order_created_pending() {
        let f = fixture().await;

        let mut order = cash_order(&f, 2);
        order.payment_type = PaymentType::Credit;
        let receipt = f.db.orders().create_order(order).await.unwrap();
        assert_eq!(receipt.status, OrderStatus::PendingCredit.code());

        // Credit sales bucket moves; physical cash does not
        let drawer = f
            .db
            .drawers()
            .open_for(f.user_id, f.location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(drawer.total_credit_sales_cents.cents(), 20000);
        assert_eq!(drawer.drawer_cash_cents.cents(), 5000);
    }

    #[tokio::test]
    async fn test_invoice_numbers_sequence_within_day() {
        let f = fixture().await;
        let repo = f.db.orders();

        let first = repo.create_order(cash_order(&f, 1)).await.unwrap();
        let second = repo.create_order(cash_order(&f, 1)).await.unwrap();
        let third = repo.create_order(cash_order(&f, 1)).await.unwrap();

        let date_suffix = Utc::now().date_naive().format("%Y%m%d").to_string();
        assert_eq!(first.invoice_no, format!("INV1-{date_suffix}"));
        assert_eq!(second.invoice_no, format!("INV2-{date_suffix}"));
        assert_eq!(third.invoice_no, format!("INV3-{date_suffix}"));
    }

    #[tokio::test]
    async fn test_loyalty_accrual_on_order() {
        let f = fixture().await;
        let customer = f
            .db
            .customers()
            .create(&CustomerInput {
                account_id: 1,
                first_name: "Ana".to_string(),
                last_name: "Reyes".to_string(),
                contact_no: "09170000002".to_string(),
                email: "ana@example.com".to_string(),
                card_number: None,
                status: STATUS_ACTIVE,
            })
            .await
            .unwrap();

        let mut order = cash_order(&f, 5); // 500.00 -> 2 points
        order.customer_id = Some(customer.id);
        let receipt = f.db.orders().create_order(order).await.unwrap();
        assert_eq!(receipt.points_awarded, Some(2));

        let after = f.db.customers().get(customer.id).await.unwrap().unwrap();
        assert_eq!(after.transaction_count, 1);
        assert_eq!(after.points, 2);
    }

    #[tokio::test]
    async fn test_unknown_customer_is_ignored() {
        let f = fixture().await;

        let mut order = cash_order(&f, 1);
        order.customer_id = Some(4242);
        let receipt = f.db.orders().create_order(order).await.unwrap();
        assert_eq!(receipt.points_awarded, None);
    }

    #[tokio::test]
    async fn test_digital_fields_stored_for_ewallet_only() {
        let f = fixture().await;

        let mut order = cash_order(&f, 1);
        order.payment_type = PaymentType::EWallet;
        order.digital = DigitalPayment::resolve(
            PaymentType::EWallet,
            Some("Juan".to_string()),
            Some("0917".to_string()),
            Some("REF-9".to_string()),
            Some(Money::from_cents(10000)),
        );

        let receipt = f.db.orders().create_order(order).await.unwrap();
        let stored = f
            .db
            .orders()
            .find_by_invoice(&receipt.invoice_no)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.account_name, "Juan");
        assert_eq!(stored.reference_no, "REF-9");
        assert_eq!(stored.digital_payment_amount_cents.cents(), 10000);
    }

    #[tokio::test]
    async fn test_settle_credit_order_cash() {
        let f = fixture().await;

        let mut order = cash_order(&f, 4); // 400.00
        order.payment_type = PaymentType::Credit;
        let receipt = f.db.orders().create_order(order).await.unwrap();

        let drawer_before = f
            .db
            .drawers()
            .open_for(f.user_id, f.location_id)
            .await
            .unwrap()
            .unwrap();

        let settlement = f
            .db
            .orders()
            .settle_order(SettleOrder {
                invoice_no: receipt.invoice_no.clone(),
                location_id: f.location_id,
                user_id: f.user_id,
                payment_type: PaymentType::Cash,
                digital: DigitalPayment::default(),
                amount: Money::from_cents(40000),
            })
            .await
            .unwrap();
        assert_eq!(settlement.total_settled_credit_cents.cents(), 40000);

        // Order flips to settled
        let stored = f
            .db
            .orders()
            .find_by_invoice(&receipt.invoice_no)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, OrderStatus::Settled.code());

        // Cash settlement: settled credit AND drawer cash both rise
        let drawer_after = f
            .db
            .drawers()
            .open_for(f.user_id, f.location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(drawer_after.total_settled_credit_cents.cents(), 40000);
        assert_eq!(
            drawer_after.drawer_cash_cents,
            drawer_before.drawer_cash_cents + Money::from_cents(40000)
        );
    }

    #[tokio::test]
    async fn test_settle_credit_order_ewallet_leaves_cash() {
        let f = fixture().await;

        let mut order = cash_order(&f, 4);
        order.payment_type = PaymentType::Credit;
        let receipt = f.db.orders().create_order(order).await.unwrap();

        let drawer_before = f
            .db
            .drawers()
            .open_for(f.user_id, f.location_id)
            .await
            .unwrap()
            .unwrap();

        f.db.orders()
            .settle_order(SettleOrder {
                invoice_no: receipt.invoice_no.clone(),
                location_id: f.location_id,
                user_id: f.user_id,
                payment_type: PaymentType::EWallet,
                digital: DigitalPayment::resolve(
                    PaymentType::EWallet,
                    Some("Juan".to_string()),
                    None,
                    Some("REF-77".to_string()),
                    Some(Money::from_cents(40000)),
                ),
                amount: Money::from_cents(40000),
            })
            .await
            .unwrap();

        let drawer_after = f
            .db
            .drawers()
            .open_for(f.user_id, f.location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(drawer_after.total_settled_credit_cents.cents(), 40000);
        assert_eq!(drawer_after.drawer_cash_cents, drawer_before.drawer_cash_cents);

        // Digital reference stored on the order
        let stored = f
            .db
            .orders()
            .find_by_invoice(&receipt.invoice_no)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.reference_no, "REF-77");
    }

    #[tokio::test]
    async fn test_settle_unknown_invoice() {
        let f = fixture().await;

        let err = f
            .db
            .orders()
            .settle_order(SettleOrder {
                invoice_no: "INV99-19700101".to_string(),
                location_id: f.location_id,
                user_id: f.user_id,
                payment_type: PaymentType::Cash,
                digital: DigitalPayment::default(),
                amount: Money::from_cents(100),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::WorkflowError::Core(CoreError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_credit_listing_by_location() {
        let f = fixture().await;
        let customer = f
            .db
            .customers()
            .create(&CustomerInput {
                account_id: 1,
                first_name: "Ana".to_string(),
                last_name: "Reyes".to_string(),
                contact_no: "09170000002".to_string(),
                email: "ana@example.com".to_string(),
                card_number: None,
                status: STATUS_ACTIVE,
            })
            .await
            .unwrap();

        let mut order = cash_order(&f, 1);
        order.payment_type = PaymentType::Credit;
        order.customer_id = Some(customer.id);
        f.db.orders().create_order(order).await.unwrap();

        let credits = f.db.orders().credit_orders(f.location_id).await.unwrap();
        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].first_name, "Ana");

        // No pending credits at another location
        assert!(f.db.orders().credit_orders(999).await.unwrap().is_empty());
    }
}

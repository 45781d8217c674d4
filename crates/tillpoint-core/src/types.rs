//! # Domain Types
//!
//! Core domain types used throughout Tillpoint.
//!
//! ## Code-Backed Enums
//! The upstream wire protocol and the database both carry small-integer codes
//! for payment types, order status, and the like. Enums here convert through
//! `from_code`/`code` so row structs and DTOs stay plain `i64` while all
//! branching logic works on typed variants. Unknown codes are rejected at the
//! service boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Type
// =============================================================================

/// How an order was (or will be) paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentType {
    /// Physical cash into the drawer.
    Cash,
    /// E-wallet transfer with an external reference.
    EWallet,
    /// Bank transfer with an external reference.
    BankTransfer,
    /// Deferred payment, settled later against the drawer.
    Credit,
}

impl PaymentType {
    /// Parses a wire/database code.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PaymentType::Cash),
            1 => Some(PaymentType::EWallet),
            2 => Some(PaymentType::BankTransfer),
            3 => Some(PaymentType::Credit),
            _ => None,
        }
    }

    /// Returns the wire/database code.
    pub const fn code(&self) -> i64 {
        match self {
            PaymentType::Cash => 0,
            PaymentType::EWallet => 1,
            PaymentType::BankTransfer => 2,
            PaymentType::Credit => 3,
        }
    }

    /// Digital payments carry account/reference fields on the order.
    pub const fn is_digital(&self) -> bool {
        matches!(self, PaymentType::EWallet | PaymentType::BankTransfer)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Settlement state of an order.
///
/// Canonical encoding: 0 = settled/paid, 1 = pending credit. Credit orders
/// are created pending; everything else is settled at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Paid in full.
    Settled,
    /// Credit order awaiting settlement.
    PendingCredit,
}

impl OrderStatus {
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(OrderStatus::Settled),
            1 => Some(OrderStatus::PendingCredit),
            _ => None,
        }
    }

    pub const fn code(&self) -> i64 {
        match self {
            OrderStatus::Settled => 0,
            OrderStatus::PendingCredit => 1,
        }
    }

    /// Status a new order is created with for the given payment type.
    pub const fn for_new_order(payment: PaymentType) -> Self {
        match payment {
            PaymentType::Credit => OrderStatus::PendingCredit,
            _ => OrderStatus::Settled,
        }
    }
}

// =============================================================================
// Transaction Type
// =============================================================================

/// Retail vs wholesale sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Retail,
    Wholesale,
}

impl TransactionType {
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(TransactionType::Retail),
            2 => Some(TransactionType::Wholesale),
            _ => None,
        }
    }

    pub const fn code(&self) -> i64 {
        match self {
            TransactionType::Retail => 1,
            TransactionType::Wholesale => 2,
        }
    }
}

// =============================================================================
// Stock Action
// =============================================================================

/// Direction of a stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAction {
    /// Add units to inventory.
    Add,
    /// Remove units from inventory (floor-checked).
    Remove,
}

impl StockAction {
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(StockAction::Add),
            1 => Some(StockAction::Remove),
            _ => None,
        }
    }

    pub const fn code(&self) -> i64 {
        match self {
            StockAction::Add => 0,
            StockAction::Remove => 1,
        }
    }
}

// =============================================================================
// User Role
// =============================================================================

/// Back-office user role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Cashier,
    Staff,
    StockController,
}

impl Role {
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Role::Admin),
            1 => Some(Role::Cashier),
            2 => Some(Role::Staff),
            3 => Some(Role::StockController),
            _ => None,
        }
    }

    pub const fn code(&self) -> i64 {
        match self {
            Role::Admin => 0,
            Role::Cashier => 1,
            Role::Staff => 2,
            Role::StockController => 3,
        }
    }
}

// =============================================================================
// Entity Status
// =============================================================================

/// Soft-disable flag shared by most entities: 1 = active, 0 = disabled.
pub const STATUS_ACTIVE: i64 = 1;
pub const STATUS_DISABLED: i64 = 0;

// =============================================================================
// Catalog Rows
// =============================================================================

/// A product in the catalog.
///
/// Soft-disabled via `status = 0`; never hard-deleted once referenced
/// by orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    /// Unique scan code.
    pub barcode: String,
    pub name: String,
    pub description: Option<String>,
    pub supplier_price_cents: Money,
    pub retail_price_cents: Money,
    pub wholesale_price_cents: Money,
    /// Stock level at which the product should be re-ordered.
    pub reorder_level: i64,
    /// 1 when the product is VAT-able.
    pub is_vat: i64,
    pub status: i64,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub status: i64,
    pub created_at: DateTime<Utc>,
}

/// A store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub status: i64,
    pub created_at: DateTime<Utc>,
}

/// A goods supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub contact_person: String,
    pub contact_no: String,
    pub status: i64,
    pub created_at: DateTime<Utc>,
}

/// A percentage discount definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Discount {
    pub id: i64,
    pub name: String,
    /// Whole-number percentage, 0-100.
    pub percentage: i64,
    pub status: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Inventory
// =============================================================================

/// Per (product, location) unit count.
///
/// Invariant: at most one row per (product, location) pair, and `units`
/// never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryLevel {
    pub id: i64,
    pub product_id: i64,
    pub location_id: i64,
    pub units: i64,
    pub status: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// People
// =============================================================================

/// A back-office user (cashier, admin, ...).
///
/// `password_hash` is an argon2 PHC string; the cleartext password never
/// leaves the login/registration boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub role: i64,
    pub status: i64,
    pub location_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A loyalty customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub contact_no: String,
    pub email: String,
    pub card_number: Option<String>,
    pub transaction_count: i64,
    pub points: i64,
    pub status: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Orders
// =============================================================================

/// An order header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// `INV{dailySeq}-{yyyymmdd}`, unique.
    pub invoice_no: String,
    /// 0 = settled, 1 = pending credit.
    pub status: i64,
    pub total_amount_cents: Money,
    pub total_discount_cents: Money,
    pub total_vat_sale_cents: Money,
    pub total_vat_amount_cents: Money,
    pub total_vat_exempt_cents: Money,
    pub transaction_type: i64,
    pub payment_type: i64,
    /// Populated for e-wallet/bank-transfer payments, blank otherwise.
    pub account_name: String,
    pub account_number: String,
    pub reference_no: String,
    pub digital_payment_amount_cents: Money,
    pub location_id: i64,
    pub user_id: i64,
    pub customer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// One product line on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub discount_id: Option<i64>,
    /// unit price * quantity minus the discount amount.
    pub subtotal_cents: Money,
}

// =============================================================================
// Cash Drawer
// =============================================================================

/// A cash drawer session for one (user, location).
///
/// Invariant: at most one open drawer (`time_end IS NULL`) per
/// (user, location) at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashDrawer {
    pub id: i64,
    pub cashier: Option<String>,
    pub user_id: i64,
    pub location_id: i64,
    pub initial_cash_cents: Money,
    pub total_sales_cents: Money,
    pub withdrawals_cents: Money,
    pub expense_cents: Money,
    /// Physical cash expected in the drawer right now.
    pub drawer_cash_cents: Money,
    pub total_amount_cents: Money,
    pub total_discount_cents: Money,
    pub total_vat_sale_cents: Money,
    pub total_vat_amount_cents: Money,
    pub total_vat_exempt_cents: Money,
    pub total_cash_sales_cents: Money,
    pub total_ewallet_sales_cents: Money,
    pub total_bank_transfer_sales_cents: Money,
    pub total_credit_sales_cents: Money,
    pub total_settled_credit_cents: Money,
    pub time_start: DateTime<Utc>,
    /// NULL while the drawer is open.
    pub time_end: Option<DateTime<Utc>>,
    /// 1 = open, 0 = closed.
    pub status: i64,
    pub created_at: DateTime<Utc>,
}

/// A child record of a drawer: expense, withdrawal, or cash top-up.
/// All three tables share this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DrawerEntry {
    pub id: i64,
    pub drawer_id: i64,
    pub description: String,
    pub amount_cents: Money,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Stock Movements
// =============================================================================

/// An inbound stock delivery audit row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockIn {
    pub id: i64,
    /// 6-digit delivery reference.
    pub reference_no: i64,
    pub supplier_id: i64,
    pub product_id: i64,
    pub location_id: i64,
    pub units: i64,
    pub user_id: i64,
    pub status: i64,
    pub created_at: DateTime<Utc>,
}

/// A manual inventory correction audit row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockAdjustment {
    pub id: i64,
    pub product_id: i64,
    pub units: i64,
    pub reason: String,
    pub user_id: i64,
    pub location_id: i64,
    /// 0 = add, 1 = remove.
    pub action: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_type_codes() {
        for code in 0..4 {
            let pt = PaymentType::from_code(code).unwrap();
            assert_eq!(pt.code(), code);
        }
        assert!(PaymentType::from_code(4).is_none());
        assert!(PaymentType::from_code(-1).is_none());
    }

    #[test]
    fn test_digital_payment_types() {
        assert!(!PaymentType::Cash.is_digital());
        assert!(PaymentType::EWallet.is_digital());
        assert!(PaymentType::BankTransfer.is_digital());
        assert!(!PaymentType::Credit.is_digital());
    }

    #[test]
    fn test_new_order_status() {
        assert_eq!(
            OrderStatus::for_new_order(PaymentType::Cash),
            OrderStatus::Settled
        );
        assert_eq!(
            OrderStatus::for_new_order(PaymentType::EWallet),
            OrderStatus::Settled
        );
        assert_eq!(
            OrderStatus::for_new_order(PaymentType::Credit),
            OrderStatus::PendingCredit
        );
    }

    #[test]
    fn test_stock_action_codes() {
        assert_eq!(StockAction::from_code(0), Some(StockAction::Add));
        assert_eq!(StockAction::from_code(1), Some(StockAction::Remove));
        assert!(StockAction::from_code(2).is_none());
    }
}

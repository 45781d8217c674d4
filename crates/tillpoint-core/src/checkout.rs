//! # Checkout Math
//!
//! Pure arithmetic for the order-settlement workflow: per-line totals,
//! order accumulation, cash-drawer postings, and loyalty accrual.
//!
//! ## Where This Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Order request                                                      │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  line_totals(unit_price, qty, discount_pct)   per line              │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  OrderTotals::add_line(...)                   accumulate            │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  DrawerPosting::for_sale(payment, ...)        route into buckets    │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  loyalty_points(total)                        customer accrual      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The storage layer applies these results inside a single transaction;
//! nothing here touches the database.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::PaymentType;
use crate::LOYALTY_CENTS_PER_POINT;

// =============================================================================
// Line Totals
// =============================================================================

/// Computed amounts for one order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTotals {
    /// unit price * quantity, before discount.
    pub gross: Money,
    /// Discount amount taken off the gross.
    pub discount: Money,
    /// gross - discount; what the customer pays for the line.
    pub subtotal: Money,
}

/// Computes the totals for one order line.
///
/// The discount is an integer percentage with truncating division:
/// `discount = gross * pct / 100`.
///
/// ## Example
/// ```rust
/// use tillpoint_core::checkout::line_totals;
/// use tillpoint_core::Money;
///
/// let t = line_totals(Money::from_cents(10000), 3, 10);
/// assert_eq!(t.gross.cents(), 30000);
/// assert_eq!(t.discount.cents(), 3000);
/// assert_eq!(t.subtotal.cents(), 27000);
/// ```
pub fn line_totals(unit_price: Money, quantity: i64, discount_pct: i64) -> LineTotals {
    let gross = unit_price * quantity;
    let discount = gross.percentage(discount_pct);
    LineTotals {
        gross,
        discount,
        subtotal: gross - discount,
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// Running totals across an order's lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderTotals {
    pub amount: Money,
    pub discount: Money,
}

impl OrderTotals {
    /// Accumulates one computed line.
    pub fn add_line(&mut self, line: LineTotals) {
        self.amount += line.subtotal;
        self.discount += line.discount;
    }
}

// =============================================================================
// VAT Totals
// =============================================================================

/// VAT figures supplied with the order request, passed through to the order
/// header and the drawer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatTotals {
    pub vat_sale: Money,
    pub vat_amount: Money,
    pub vat_exempt: Money,
}

// =============================================================================
// Drawer Posting
// =============================================================================

/// The set of deltas a single sale or settlement applies to an open drawer.
///
/// Every field is an increment; the storage layer turns each non-zero delta
/// into `SET column = column + ?`, so two concurrent postings can never lose
/// one writer's increment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawerPosting {
    pub total_sales: Money,
    pub total_amount: Money,
    pub total_discount: Money,
    pub total_vat_sale: Money,
    pub total_vat_amount: Money,
    pub total_vat_exempt: Money,
    pub total_cash_sales: Money,
    pub total_ewallet_sales: Money,
    pub total_bank_transfer_sales: Money,
    pub total_credit_sales: Money,
    pub total_settled_credit: Money,
    pub drawer_cash: Money,
}

impl DrawerPosting {
    /// Posting for a new order.
    ///
    /// Routing by payment type:
    /// - cash: sales bucket + physical drawer cash
    /// - e-wallet / bank transfer / credit: sales bucket only
    ///
    /// VAT figures, the discount total, and the general sales totals
    /// accumulate regardless of payment type.
    pub fn for_sale(payment: PaymentType, totals: OrderTotals, vat: VatTotals) -> Self {
        let mut posting = DrawerPosting {
            total_sales: totals.amount,
            total_amount: totals.amount,
            total_discount: totals.discount,
            total_vat_sale: vat.vat_sale,
            total_vat_amount: vat.vat_amount,
            total_vat_exempt: vat.vat_exempt,
            ..DrawerPosting::default()
        };

        match payment {
            PaymentType::Cash => {
                posting.total_cash_sales = totals.amount;
                posting.drawer_cash = totals.amount;
            }
            PaymentType::EWallet => posting.total_ewallet_sales = totals.amount,
            PaymentType::BankTransfer => posting.total_bank_transfer_sales = totals.amount,
            PaymentType::Credit => posting.total_credit_sales = totals.amount,
        }

        posting
    }

    /// Posting for a credit-order settlement.
    ///
    /// The settled amount always lands in `total_settled_credit`; a cash
    /// settlement additionally puts the money into the physical drawer.
    pub fn for_settlement(payment: PaymentType, amount: Money) -> Self {
        let mut posting = DrawerPosting {
            total_settled_credit: amount,
            ..DrawerPosting::default()
        };

        if payment == PaymentType::Cash {
            posting.drawer_cash = amount;
        }

        posting
    }
}

// =============================================================================
// Digital Payment Details
// =============================================================================

/// Account/reference fields carried on an order for digital payments.
///
/// Only e-wallet and bank-transfer orders keep these; for cash and credit
/// they are stored blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalPayment {
    pub account_name: String,
    pub account_number: String,
    pub reference_no: String,
    pub amount: Money,
}

impl DigitalPayment {
    /// Resolves the stored fields for a payment type: the supplied values
    /// for e-wallet/bank transfer, blanks otherwise.
    pub fn resolve(
        payment: PaymentType,
        account_name: Option<String>,
        account_number: Option<String>,
        reference_no: Option<String>,
        amount: Option<Money>,
    ) -> Self {
        if payment.is_digital() {
            DigitalPayment {
                account_name: account_name.unwrap_or_default(),
                account_number: account_number.unwrap_or_default(),
                reference_no: reference_no.unwrap_or_default(),
                amount: amount.unwrap_or_default(),
            }
        } else {
            DigitalPayment::default()
        }
    }
}

// =============================================================================
// Loyalty Accrual
// =============================================================================

/// Points earned for an order total: 1 point per 200 currency units,
/// truncating.
///
/// ## Example
/// ```rust
/// use tillpoint_core::checkout::loyalty_points;
/// use tillpoint_core::Money;
///
/// assert_eq!(loyalty_points(Money::from_cents(30000)), 1); // 300.00
/// assert_eq!(loyalty_points(Money::from_cents(19999)), 0); // 199.99
/// ```
pub fn loyalty_points(total: Money) -> i64 {
    total.cents() / LOYALTY_CENTS_PER_POINT
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # tillpoint-core: Pure Business Logic for Tillpoint
//!
//! This crate is the heart of the Tillpoint back office. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Tillpoint Architecture                       │
//! │                                                                 │
//! │  HTTP client ──► apps/server (Axum handlers, JWT, WebSocket)   │
//! │                        │                                        │
//! │  ┌─────────────────────▼─────────────────────────────────────┐ │
//! │  │             ★ tillpoint-core (THIS CRATE) ★               │ │
//! │  │                                                           │ │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────────┐    │ │
//! │  │   │  types  │ │  money  │ │ checkout │ │ validation │    │ │
//! │  │   │ Product │ │  Money  │ │ postings │ │   rules    │    │ │
//! │  │   │  Order  │ │ cents   │ │ loyalty  │ │   checks   │    │ │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └────────────┘    │ │
//! │  │                                                           │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS     │ │
//! │  └─────────────────────┬─────────────────────────────────────┘ │
//! │                        │                                        │
//! │  ┌─────────────────────▼─────────────────────────────────────┐ │
//! │  │               tillpoint-db (Database Layer)               │ │
//! │  │          SQLite queries, migrations, repositories         │ │
//! │  └───────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain rows and code-backed enums (PaymentType, OrderStatus, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`checkout`] - Order line math, drawer postings, loyalty accrual
//! - [`invoice`] - Daily-sequence invoice numbers
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod invoice;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{DigitalPayment, DrawerPosting, LineTotals, OrderTotals, VatTotals};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Cents of order total required to earn one loyalty point.
///
/// ## Business Reason
/// Customers earn 1 point per 200 currency units of a sale, truncating.
/// 200 units = 20,000 cents.
pub const LOYALTY_CENTS_PER_POINT: i64 = 20_000;

/// Maximum quantity of a single product on one order line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum percentage for a discount definition.
pub const MAX_DISCOUNT_PERCENTAGE: i64 = 100;

//! # Error Types
//!
//! Domain-specific error types for tillpoint-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                │
//! │                                                                     │
//! │  tillpoint-core errors (this file)                                  │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  tillpoint-db errors (separate crate)                               │
//! │  ├── DbError          - Database operation failures                 │
//! │  └── WorkflowError    - Core + Db combined for transactional flows  │
//! │                                                                     │
//! │  Server errors (in app)                                             │
//! │  └── ApiError         - HTTP status mapping (serialized)            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the checkout and drawer workflows.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// The referenced location does not exist.
    #[error("Location not found: {0}")]
    LocationNotFound(i64),

    /// No order matches the given invoice number.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Not enough units at the (product, location) to fulfil a line.
    #[error(
        "Not enough inventory for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// No open cash drawer for the (user, location) the request names.
    #[error("No active cash drawer for user {user_id} at location {location_id}")]
    NoOpenDrawer { user_id: i64, location_id: i64 },

    /// A drawer is already open for the (user, location).
    #[error(
        "A cash drawer is already open for user {user_id} at location {location_id}; close it before starting a new one"
    )]
    DrawerAlreadyOpen { user_id: i64, location_id: i64 },

    /// The drawer id does not resolve to an open drawer.
    #[error("Cash drawer {0} not found or already closed")]
    DrawerClosed(i64),

    /// A withdrawal would take the drawer below zero cash.
    #[error("Insufficient drawer cash: available {available}, requested {requested}")]
    InsufficientDrawerCash { available: Money, requested: Money },

    /// Wire code outside the known payment types.
    #[error("Invalid payment type: {0}")]
    InvalidPaymentType(i64),

    /// Wire code outside the known transaction types.
    #[error("Invalid transaction type: {0}")]
    InvalidTransactionType(i64),

    /// Stock adjustment action other than 0 (add) or 1 (remove).
    #[error("Invalid stock action: {0} (must be 0 to add or 1 to remove)")]
    InvalidStockAction(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors raised before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// A collection that must carry at least one element is empty.
    #[error("{field} cannot be empty")]
    EmptyCollection { field: String },

    /// Invalid format (e.g., malformed barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product_id: 42,
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Not enough inventory for product 42: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "username".to_string(),
        };
        assert_eq!(err.to_string(), "username is required");

        let err = ValidationError::EmptyCollection {
            field: "products".to_string(),
        };
        assert_eq!(err.to_string(), "products cannot be empty");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

//! # tillpoint-db: Database Layer for Tillpoint
//!
//! This crate provides database access for the Tillpoint back office.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Tillpoint Data Flow                            │
//! │                                                                     │
//! │  Axum handler (create_order)                                        │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                  tillpoint-db (THIS CRATE)                    │ │
//! │  │                                                               │ │
//! │  │   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐     │ │
//! │  │   │   Database   │   │ Repositories │   │  Migrations  │     │ │
//! │  │   │  (pool.rs)   │◄──│ (order.rs,   │   │  (embedded)  │     │ │
//! │  │   │  SqlitePool  │   │  drawer.rs)  │   │ 001_init.sql │     │ │
//! │  │   └──────────────┘   └──────────────┘   └──────────────┘     │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database (WAL mode, foreign keys on)                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and workflow error types
//! - [`repository`] - Repository implementations (one per aggregate)
//!
//! The order and drawer repositories own the transactional workflows: the
//! multi-table order-settlement sequence runs entirely inside one SQLite
//! transaction per request.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, WorkflowError, WorkflowResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::drawer::DrawerRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::stock::StockRepository;

//! Repository implementations, one per aggregate.
//!
//! Every repository holds a clone of the shared `SqlitePool`. Simple
//! repositories expose list / get / insert / update / soft-disable; the
//! order, drawer, and stock repositories own the transactional workflows.

pub mod category;
pub mod customer;
pub mod discount;
pub mod drawer;
pub mod inventory;
pub mod location;
pub mod order;
pub mod product;
pub mod stock;
pub mod supplier;
pub mod user;

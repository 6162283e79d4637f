//! Service layer for ledgerdash
//!
//! The operations presentation consumers call: reading the current
//! snapshots through `BudgetBoard`, and writing budget limits and categories.
//! Writes invalidate the board instead of re-fetching.

pub mod board;
pub mod budget;
pub mod category;

pub use board::{BudgetBoard, Refresh};
pub use budget::BudgetService;
pub use category::{CategoryPatch, CategoryService};

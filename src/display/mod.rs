//! Display formatting for terminal output
//!
//! Plain-text renderings of budget snapshots, the dashboard and category
//! listings.

pub mod budget;
pub mod category;
pub mod dashboard;
pub mod format;

pub use budget::{format_budget_snapshot, format_spending_list};
pub use category::{format_category_details, format_category_table, format_category_tree};
pub use dashboard::format_dashboard;

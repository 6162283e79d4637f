//! ledgerdash - category-rollup finance dashboard engine
//!
//! This library turns flat rows from a remote tabular store (categories,
//! budget limits, transactions, accounts, investments, credit cards) into a
//! two-level planned-vs-actual budget view and a current-month dashboard.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and persisted settings
//! - `error`: Custom error types
//! - `models`: Typed entities, money and time scopes
//! - `store`: The remote store boundary, a JSON file store and retries
//! - `directory`: Indexed category snapshot with parent/child links
//! - `loader`: Scoped, concurrent fact queries and row normalization
//! - `rollup`: Parent/child planned-vs-actual aggregation
//! - `dashboard`: Current-month summary
//! - `view`: Drill-down lists, chart series and insight classifiers
//! - `services`: Snapshot board and write operations
//! - `export`, `display`, `cli`: Output and command handling
//!
//! # Example
//!
//! ```rust,ignore
//! use ledgerdash::models::{AccountingMode, Scope};
//! use ledgerdash::services::BudgetBoard;
//! use ledgerdash::store::JsonStore;
//!
//! let board = BudgetBoard::new(JsonStore::in_memory());
//! let snapshot = board.refresh(Scope::month(2025, 3)?, AccountingMode::Accrual)?;
//! ```

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod directory;
pub mod display;
pub mod error;
pub mod export;
pub mod loader;
pub mod models;
pub mod rollup;
pub mod services;
pub mod store;
pub mod view;

use std::sync::Once;

pub use error::{LedgerError, LedgerResult};

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber once
///
/// `level` is the default for this crate's targets; `RUST_LOG` directives
/// are applied on top. Output goes to stderr so piped exports stay clean.
pub fn init_tracing(level: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = format!("ledgerdash={}", level).parse() {
            filter = filter.add_directive(directive);
        }

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

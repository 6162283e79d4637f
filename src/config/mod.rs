//! Configuration module for ledgerdash
//!
//! - Path resolution for settings and the local store
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::{RetrySettings, Settings};

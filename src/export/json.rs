//! JSON export with schema versioning

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// A snapshot wrapped with export metadata
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotExport<'a, T> {
    /// Schema version for compatibility checking
    pub schema_version: &'static str,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: &'static str,

    /// `budget` or `dashboard`
    pub kind: &'static str,

    pub snapshot: &'a T,
}

impl<'a, T: Serialize> SnapshotExport<'a, T> {
    pub fn new(kind: &'static str, snapshot: &'a T) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION"),
            kind,
            snapshot,
        }
    }
}

/// Pretty-printed JSON
pub fn export_json<W: Write, T: Serialize>(value: &T, writer: &mut W) -> LedgerResult<()> {
    serde_json::to_writer_pretty(&mut *writer, value)
        .map_err(|e| LedgerError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| LedgerError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountingMode, CategoryKind, Money, Scope};
    use crate::rollup::BudgetSnapshot;
    use crate::view::Insights;

    #[test]
    fn test_export_wraps_snapshot() {
        let snapshot = BudgetSnapshot {
            scope: Scope::year(2025).unwrap(),
            mode: AccountingMode::Cash,
            kind: CategoryKind::Expense,
            roots: Vec::new(),
            total_planned: Money::zero(),
            total_actual: Money::zero(),
            insights: Insights::default(),
        };

        let mut out = Vec::new();
        export_json(&SnapshotExport::new("budget", &snapshot), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["schema_version"], EXPORT_SCHEMA_VERSION);
        assert_eq!(value["kind"], "budget");
        assert_eq!(value["snapshot"]["mode"], "cash");
        assert!(value["snapshot"]["roots"].as_array().unwrap().is_empty());
    }
}

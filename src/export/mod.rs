//! Export module for ledgerdash
//!
//! Writes budget and dashboard snapshots in three formats:
//! - CSV: one line per root and per child (spreadsheet-compatible)
//! - JSON: the full snapshot wrapped with export metadata
//! - YAML: the same document as JSON, with a comment header

pub mod csv;
pub mod json;
pub mod yaml;

use std::fmt;
use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::rollup::BudgetSnapshot;

pub use self::csv::export_budget_csv;
pub use self::json::{export_json, SnapshotExport, EXPORT_SCHEMA_VERSION};
pub use self::yaml::export_yaml;

/// Output format for `budget show` and `dashboard`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Terminal tables
    #[default]
    Table,
    Csv,
    Json,
    Yaml,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" | "text" => Some(Self::Table),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Table => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Write a budget snapshot in a machine-readable format
pub fn export_budget<W: Write>(
    snapshot: &BudgetSnapshot,
    format: ExportFormat,
    writer: &mut W,
) -> LedgerResult<()> {
    match format {
        ExportFormat::Csv => export_budget_csv(snapshot, writer),
        ExportFormat::Json => export_json(&SnapshotExport::new("budget", snapshot), writer),
        ExportFormat::Yaml => export_yaml(&SnapshotExport::new("budget", snapshot), writer),
        ExportFormat::Table => Err(LedgerError::Export(
            "table output is rendered by the display module".into(),
        )),
    }
}

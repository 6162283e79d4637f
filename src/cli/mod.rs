//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod budget;
pub mod category;
pub mod dashboard;

pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use dashboard::{handle_dashboard_command, DashboardArgs};

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{Local, NaiveDate};

use crate::error::{LedgerError, LedgerResult};
use crate::export::ExportFormat;
use crate::models::{AccountingMode, Money, Scope};

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a period argument
///
/// Accepts "current", "last", "next", "YYYY-MM", "YYYY" and "YYYY-all";
/// defaults to the current month.
pub fn parse_scope(period: Option<&str>, today: NaiveDate) -> LedgerResult<Scope> {
    let current = Scope::containing(today);
    match period.map(|p| p.trim().to_lowercase()) {
        None => Ok(current),
        Some(p) if p == "current" => Ok(current),
        Some(p) if p == "last" || p == "prev" => Ok(current.prev()),
        Some(p) if p == "next" => Ok(current.next()),
        Some(p) => Scope::parse(&p).map_err(|e| LedgerError::Validation(e.to_string())),
    }
}

pub fn parse_mode(mode: Option<&str>, default: AccountingMode) -> LedgerResult<AccountingMode> {
    match mode {
        None => Ok(default),
        Some(m) => AccountingMode::parse(m).ok_or_else(|| {
            LedgerError::Validation(format!(
                "Unknown accounting mode '{}' (expected 'accrual' or 'cash')",
                m
            ))
        }),
    }
}

pub fn parse_format(format: Option<&str>) -> LedgerResult<ExportFormat> {
    match format {
        None => Ok(ExportFormat::Table),
        Some(f) => ExportFormat::parse(f).ok_or_else(|| {
            LedgerError::Validation(format!(
                "Unknown format '{}' (expected table, csv, json or yaml)",
                f
            ))
        }),
    }
}

pub fn parse_amount(amount: &str) -> LedgerResult<Money> {
    Money::parse(amount).map_err(|e| LedgerError::Validation(e.to_string()))
}

/// Stdout, or a file when `path` is given
pub fn open_output(path: Option<&Path>) -> LedgerResult<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                LedgerError::Export(format!("Failed to create {}: {}", path.display(), e))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scope() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(parse_scope(None, today).unwrap(), Scope::month(2025, 1).unwrap());
        assert_eq!(
            parse_scope(Some("last"), today).unwrap(),
            Scope::month(2024, 12).unwrap()
        );
        assert_eq!(parse_scope(Some("2024"), today).unwrap(), Scope::year(2024).unwrap());
        assert!(parse_scope(Some("2024-13"), today).unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_mode_and_format() {
        assert_eq!(
            parse_mode(Some("caixa"), AccountingMode::Accrual).unwrap(),
            AccountingMode::Cash
        );
        assert_eq!(parse_mode(None, AccountingMode::Cash).unwrap(), AccountingMode::Cash);
        assert!(parse_mode(Some("weekly"), AccountingMode::Cash).is_err());
        assert_eq!(parse_format(Some("json")).unwrap(), ExportFormat::Json);
    }

    #[test]
    fn test_parse_amount_rejects_symbols_in_fraction() {
        assert!(parse_amount("5.1€").unwrap_err().is_validation());
        assert!(parse_amount("1.-5").unwrap_err().is_validation());
        assert_eq!(parse_amount("5.10").unwrap(), Money::from_cents(510));
    }
}

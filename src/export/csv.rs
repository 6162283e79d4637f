//! CSV export of a budget snapshot
//!
//! Roots and children are flattened into one table; a child line names its
//! parent in the `parent` column.

use std::io::Write;

use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Money;
use crate::rollup::BudgetSnapshot;
use crate::view;

#[derive(Debug, Serialize)]
struct BudgetRecord<'a> {
    scope: String,
    mode: String,
    level: &'static str,
    parent: &'a str,
    category: &'a str,
    planned: String,
    actual: String,
    percentage: i64,
}

fn decimal(amount: Money) -> String {
    format!("{:.2}", amount.to_decimal())
}

fn export_error(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Export(e.to_string())
}

/// Export a snapshot's roots and retained children
pub fn export_budget_csv<W: Write>(snapshot: &BudgetSnapshot, writer: &mut W) -> LedgerResult<()> {
    let mut csv = ::csv::Writer::from_writer(writer);
    let scope = snapshot.scope.to_string();
    let mode = snapshot.mode.to_string();

    for root in &snapshot.roots {
        csv.serialize(BudgetRecord {
            scope: scope.clone(),
            mode: mode.clone(),
            level: "parent",
            parent: "",
            category: &root.name,
            planned: decimal(root.planned),
            actual: decimal(root.actual),
            percentage: root.percentage(),
        })
        .map_err(export_error)?;

        for child in &root.children {
            csv.serialize(BudgetRecord {
                scope: scope.clone(),
                mode: mode.clone(),
                level: "child",
                parent: &root.name,
                category: &child.name,
                planned: decimal(child.planned),
                actual: decimal(child.actual),
                percentage: view::percentage(child.actual, child.planned),
            })
            .map_err(export_error)?;
        }
    }

    csv.flush().map_err(export_error)?;
    Ok(())
}

//! Dashboard CLI command

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;

use super::{open_output, parse_format, today};
use crate::config::Settings;
use crate::display::format_dashboard;
use crate::error::{LedgerError, LedgerResult};
use crate::export::{export_json, export_yaml, ExportFormat, SnapshotExport};
use crate::services::BudgetBoard;
use crate::store::RemoteStore;

/// Arguments of `ledgerdash dashboard`
#[derive(Args, Debug, Clone)]
pub struct DashboardArgs {
    /// Day to summarize (YYYY-MM-DD); defaults to today
    #[arg(short, long)]
    pub date: Option<String>,
    /// Output format: table, json or yaml
    #[arg(short, long)]
    pub format: Option<String>,
    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the dashboard command
pub fn handle_dashboard_command<S: RemoteStore>(
    board: &BudgetBoard<S>,
    settings: &Settings,
    args: DashboardArgs,
) -> LedgerResult<()> {
    let day = match args.date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
            LedgerError::Validation(format!("Invalid date '{}' (expected YYYY-MM-DD)", raw))
        })?,
        None => today(),
    };
    let format = parse_format(args.format.as_deref())?;

    let snapshot = board
        .refresh_dashboard(day, settings.top_budget_items)?
        .installed()
        .ok_or_else(|| LedgerError::Budget("dashboard fetch was superseded".into()))?;

    let mut out = open_output(args.output.as_deref())?;
    match format {
        ExportFormat::Table => write!(
            out,
            "{}",
            format_dashboard(&snapshot, &settings.currency_symbol)
        )?,
        ExportFormat::Json => export_json(&SnapshotExport::new("dashboard", &*snapshot), &mut out)?,
        ExportFormat::Yaml => export_yaml(&SnapshotExport::new("dashboard", &*snapshot), &mut out)?,
        ExportFormat::Csv => {
            return Err(LedgerError::Export(
                "the dashboard supports table, json and yaml output".into(),
            ))
        }
    }
    out.flush()?;
    Ok(())
}

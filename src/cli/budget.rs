//! Budget CLI commands
//!
//! `budget show` renders or exports the planned-vs-actual snapshot for a
//! period; `budget set` writes a monthly limit.

use std::io::Write;
use std::path::PathBuf;

use clap::Subcommand;

use super::{open_output, parse_amount, parse_format, parse_mode, parse_scope, today};
use crate::config::Settings;
use crate::display::{format_budget_snapshot, format_spending_list};
use crate::error::{LedgerError, LedgerResult};
use crate::export::{export_budget, export_json, export_yaml, ExportFormat};
use crate::models::CategoryKind;
use crate::services::{BudgetBoard, BudgetService, CategoryService};
use crate::store::RemoteStore;
use crate::view;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Show planned vs actual spending for a period
    Show {
        /// Period ("2025-03", "2025", "current", "last")
        period: Option<String>,
        /// Accounting mode: accrual (transaction date) or cash (due date)
        #[arg(short, long)]
        mode: Option<String>,
        /// Output format: table, csv, json or yaml
        #[arg(short, long)]
        format: Option<String>,
        /// Show the children of one parent category
        #[arg(short, long)]
        drill: Option<String>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Set the budget for a category in a month
    Set {
        /// Category name or ID
        category: String,
        /// Amount (e.g., "500" or "500.00")
        amount: String,
        /// Month ("2025-03", "current", "next"); defaults to the current month
        #[arg(short, long)]
        period: Option<String>,
    },
}

/// Handle a budget command
pub fn handle_budget_command<S: RemoteStore>(
    board: &BudgetBoard<S>,
    settings: &Settings,
    cmd: BudgetCommands,
) -> LedgerResult<()> {
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        BudgetCommands::Show {
            period,
            mode,
            format,
            drill,
            output,
        } => {
            let scope = parse_scope(period.as_deref(), today())?;
            let mode = parse_mode(mode.as_deref(), settings.accounting_mode)?;
            let format = parse_format(format.as_deref())?;

            let snapshot = board
                .refresh_if_stale(scope, mode)?
                .ok_or_else(|| LedgerError::Budget("budget fetch was superseded".into()))?;
            let mut out = open_output(output.as_deref())?;

            match drill {
                Some(name) => {
                    let selected = snapshot
                        .roots
                        .iter()
                        .find(|r| r.name.eq_ignore_ascii_case(name.trim()))
                        .map(|r| r.category_id);
                    let items = view::drill_down(&snapshot.roots, selected);
                    let title = match selected {
                        Some(_) => format!("{} in {} ({} basis)", name.trim(), scope, mode),
                        None => format!(
                            "'{}' has no activity in {}; showing all categories",
                            name.trim(),
                            scope
                        ),
                    };
                    match format {
                        ExportFormat::Table => {
                            write!(out, "{}", format_spending_list(&title, &items, symbol))?
                        }
                        ExportFormat::Json => export_json(&items, &mut out)?,
                        ExportFormat::Yaml => export_yaml(&items, &mut out)?,
                        ExportFormat::Csv => {
                            return Err(LedgerError::Export(
                                "--drill supports table, json and yaml output".into(),
                            ))
                        }
                    }
                }
                None => match format {
                    ExportFormat::Table => {
                        write!(out, "{}", format_budget_snapshot(&snapshot, symbol))?
                    }
                    other => export_budget(&snapshot, other, &mut out)?,
                },
            }
            out.flush()?;
        }

        BudgetCommands::Set {
            category,
            amount,
            period,
        } => {
            let scope = parse_scope(period.as_deref(), today())?;
            let amount = parse_amount(&amount)?;

            let target = CategoryService::new(board)
                .find(&category)?
                .filter(|c| c.kind == CategoryKind::Expense)
                .ok_or_else(|| LedgerError::category_not_found(category.clone()))?;

            let limit = BudgetService::new(board).set_budget_limit(scope, target.id, amount)?;
            println!(
                "Budget for '{}' in {} set to {}",
                target.name,
                scope,
                limit.amount.format_with_symbol(symbol)
            );

            if let Some(snapshot) = board.refresh_if_stale(scope, settings.accounting_mode)? {
                let root_id = snapshot
                    .roots
                    .iter()
                    .find(|r| {
                        r.category_id == target.id
                            || r.children.iter().any(|c| c.category_id == target.id)
                    })
                    .map(|r| r.category_id);
                if let Some(root) = root_id.and_then(|id| snapshot.find_root(id)) {
                    println!(
                        "{}: {} of {} spent ({}%)",
                        root.name,
                        root.actual.format_with_symbol(symbol),
                        root.planned.format_with_symbol(symbol),
                        root.percentage()
                    );
                }
            }
        }
    }

    Ok(())
}

//! Category CLI commands
//!
//! Implements CLI commands for category management.

use clap::Subcommand;

use crate::directory::CategoryDirectory;
use crate::display::{format_category_details, format_category_table, format_category_tree};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryKind};
use crate::services::{BudgetBoard, CategoryPatch, CategoryService};
use crate::store::RemoteStore;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Only expense or income categories
        #[arg(short, long)]
        kind: Option<String>,
        /// Show a table instead of a tree
        #[arg(long)]
        table: bool,
    },

    /// Create a new category
    Add {
        /// Category name
        name: String,
        /// expense (default) or income
        #[arg(short, long)]
        kind: Option<String>,
        /// Parent category name or ID (must be a top-level category)
        #[arg(short, long)]
        parent: Option<String>,
        /// Display color, e.g. "#22aa55"
        #[arg(long, default_value = "")]
        color: String,
        /// Display icon name
        #[arg(long, default_value = "")]
        icon: String,
    },

    /// Show category details
    Show {
        /// Category name or ID
        category: String,
    },

    /// Edit a category
    Edit {
        /// Category name or ID
        category: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New parent category name or ID
        #[arg(short, long, conflicts_with = "root")]
        parent: Option<String>,
        /// Make the category top-level
        #[arg(long)]
        root: bool,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },

    /// Delete a category and its budget limits
    Remove {
        /// Category name or ID
        category: String,
    },
}

fn parse_kind(kind: Option<&str>) -> LedgerResult<Option<CategoryKind>> {
    kind.map(|k| {
        CategoryKind::parse(k).ok_or_else(|| {
            LedgerError::Validation(format!(
                "Unknown category type '{}' (expected 'expense' or 'income')",
                k
            ))
        })
    })
    .transpose()
}

fn require<S: RemoteStore>(service: &CategoryService<'_, S>, identifier: &str) -> LedgerResult<Category> {
    service
        .find(identifier)?
        .ok_or_else(|| LedgerError::category_not_found(identifier))
}

/// Handle a category command
pub fn handle_category_command<S: RemoteStore>(
    board: &BudgetBoard<S>,
    cmd: CategoryCommands,
) -> LedgerResult<()> {
    let service = CategoryService::new(board);

    match cmd {
        CategoryCommands::List { kind, table } => {
            let kind = parse_kind(kind.as_deref())?;
            let directory = CategoryDirectory::new(service.list(kind)?)?;
            if table {
                println!("{}", format_category_table(&directory));
            } else {
                print!("{}", format_category_tree(&directory));
            }
        }

        CategoryCommands::Add {
            name,
            kind,
            parent,
            color,
            icon,
        } => {
            let kind = parse_kind(kind.as_deref())?.unwrap_or_default();
            let parent = parent
                .map(|p| require(&service, &p))
                .transpose()?;
            let category = service.create_category(
                &name,
                kind,
                &color,
                &icon,
                parent.as_ref().map(|p| p.id),
            )?;

            match parent {
                Some(parent) => println!("Created category '{}' under '{}'", category.name, parent.name),
                None => println!("Created category '{}'", category.name),
            }
        }

        CategoryCommands::Show { category } => {
            let category = require(&service, &category)?;
            let parent = category
                .parent_id
                .map(|id| service.get(id))
                .transpose()?
                .flatten();
            print!("{}", format_category_details(&category, parent.as_ref()));
        }

        CategoryCommands::Edit {
            category,
            name,
            parent,
            root,
            color,
            icon,
        } => {
            let current = require(&service, &category)?;
            let parent = match (parent, root) {
                (_, true) => Some(None),
                (Some(p), false) => Some(Some(require(&service, &p)?.id)),
                (None, false) => None,
            };

            let patch = CategoryPatch {
                name,
                color,
                icon,
                parent,
            };
            if patch == CategoryPatch::default() {
                return Err(LedgerError::Validation(
                    "Nothing to change; pass --name, --parent, --root, --color or --icon".into(),
                ));
            }

            let updated = service.update_category(current.id, patch)?;
            println!("Updated category '{}'", updated.name);
        }

        CategoryCommands::Remove { category } => {
            let target = require(&service, &category)?;
            let removed = service.delete_category(target.id)?;
            println!("Deleted category '{}'", removed.name);
        }
    }

    Ok(())
}

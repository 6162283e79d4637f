use anyhow::Result;
use clap::{Parser, Subcommand};

use ledgerdash::cli::{handle_budget_command, handle_category_command, handle_dashboard_command};
use ledgerdash::config::{paths::LedgerPaths, settings::Settings};
use ledgerdash::models::UserId;
use ledgerdash::services::BudgetBoard;
use ledgerdash::store::{JsonStore, RetryPolicy, RetryingStore};

#[derive(Parser)]
#[command(
    name = "ledgerdash",
    author = "Kaylee Beyene",
    version,
    about = "Category rollup budgets and a monthly finance dashboard",
    long_about = "ledgerdash rolls spending up into parent categories, compares it \
                  with monthly budget limits and summarizes balances, credit cards \
                  and investments for the current month."
)]
struct Cli {
    /// Override the log level for this run (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "LEDGERDASH_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Budget commands
    #[command(subcommand)]
    Budget(ledgerdash::cli::BudgetCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(ledgerdash::cli::CategoryCommands),

    /// Current-month dashboard
    Dashboard(ledgerdash::cli::DashboardArgs),

    /// Create the data directory and a local user
    Init,

    /// Sign in as the given user ID (or the local user)
    Login {
        user: Option<String>,
    },

    /// Sign out; budget and category changes are refused afterwards
    Logout,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = LedgerPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    ledgerdash::init_tracing(cli.log_level.as_deref().unwrap_or(&settings.log_level));

    match cli.command {
        Some(Commands::Init) => {
            paths.ensure_directories()?;
            let user = *settings.principal.get_or_insert_with(UserId::new);
            settings.setup_completed = true;
            settings.save(&paths)?;
            println!("Initialized ledgerdash at: {}", paths.base_dir().display());
            println!("Signed in as {}", user.to_row_value());
            println!();
            println!("Run 'ledgerdash category add <name>' to create categories.");
        }
        Some(Commands::Login { user }) => {
            let user = match user {
                Some(raw) => raw
                    .trim()
                    .parse::<UserId>()
                    .map_err(|e| anyhow::anyhow!("Invalid user ID '{}': {}", raw, e))?,
                None => settings.principal.unwrap_or_else(UserId::new),
            };
            settings.principal = Some(user);
            settings.save(&paths)?;
            println!("Signed in as {}", user.to_row_value());
        }
        Some(Commands::Logout) => {
            settings.principal = None;
            settings.save(&paths)?;
            println!("Signed out");
        }
        Some(Commands::Config) => {
            println!("ledgerdash configuration");
            println!("========================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Store file:      {}", paths.store_file().display());
            println!("Export directory: {}", paths.export_dir().display());
            println!();
            println!("Settings:");
            println!("  Accounting mode: {}", settings.accounting_mode);
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Log level:       {}", settings.log_level);
            println!("  Retry attempts:  {}", settings.retry.max_attempts);
            match settings.principal {
                Some(user) => println!("  Signed in as:    {}", user.to_row_value()),
                None => println!("  Signed in as:    (nobody)"),
            }
        }
        Some(command) => {
            let store = JsonStore::open(paths.store_file())?.with_principal(settings.principal);
            let store = RetryingStore::new(store, RetryPolicy::from(&settings.retry));
            let board = BudgetBoard::new(store);

            match command {
                Commands::Budget(cmd) => handle_budget_command(&board, &settings, cmd)?,
                Commands::Category(cmd) => handle_category_command(&board, cmd)?,
                Commands::Dashboard(args) => handle_dashboard_command(&board, &settings, args)?,
                Commands::Init | Commands::Login { .. } | Commands::Logout | Commands::Config => {}
            }
        }
        None => {
            println!("ledgerdash - category budgets and a monthly dashboard");
            println!();
            println!("Run 'ledgerdash --help' for usage information.");
        }
    }

    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};

use envelope_ledger::cli::{
    handle_budget_command, handle_funding_command, handle_household_command,
    handle_month_command, BudgetCommands, FundingCommands, HouseholdCommands, MonthCommands,
};
use envelope_ledger::config::{paths::EnvelopePaths, settings::Settings};
use envelope_ledger::logging;
use envelope_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "envelope",
    version,
    about = "Envelope budgeting ledger",
    long_about = "Assign money from income and account balances into envelopes, \
                  move it between them, and keep every month's figures derived \
                  from an auditable entry log."
)]
struct Cli {
    /// Household name or ID (defaults to the only household)
    #[arg(long, global = true, env = "ENVELOPE_HOUSEHOLD")]
    household: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Households, sections and categories
    #[command(subcommand, alias = "hh")]
    Household(HouseholdCommands),

    /// Open and close budget months
    #[command(subcommand)]
    Month(MonthCommands),

    /// Income and balance funding sources
    #[command(subcommand)]
    Funding(FundingCommands),

    /// Assign, transfer and plan
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },

    /// Create the data directory and write default settings
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = EnvelopePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    logging::init_tracing(&settings.log_filter);

    let storage = Storage::new(paths.clone())?;
    let household = cli.household.as_deref();

    match cli.command {
        Some(Commands::Household(cmd)) => {
            handle_household_command(&storage, &settings, household, cmd)?;
        }
        Some(Commands::Month(cmd)) => {
            handle_month_command(&storage, &settings, household, cmd)?;
        }
        Some(Commands::Funding(cmd)) => {
            handle_funding_command(&storage, &settings, household, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            handle_budget_command(&storage, &settings, household, cmd)?;
        }
        Some(Commands::Audit { count }) => {
            let household_id = match household {
                Some(identifier) => Some(storage.find_household(identifier)?.id),
                None => None,
            };
            let entries = match storage.audit_log() {
                Some(log) => log.read_recent(count, household_id)?,
                None => Vec::new(),
            };
            if entries.is_empty() {
                println!("No audit entries.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        Some(Commands::Init) => {
            println!("Initializing envelope ledger at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next: 'envelope household create <name>' and 'envelope month open'.");
        }
        Some(Commands::Config) => {
            println!("Envelope Ledger Configuration");
            println!("=============================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Ledger file:    {}", paths.ledger_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Actor:                 {}", settings.actor);
            println!("  Currency symbol:       {}", settings.currency_symbol);
            println!("  Unassign policy:       {:?}", settings.unassign_policy);
            println!("  Cross-month transfers: {}", settings.allow_cross_month_transfers);
            println!("  Log filter:            {}", settings.log_filter);
        }
        None => {
            println!("envelope - envelope budgeting ledger");
            println!();
            println!("Run 'envelope --help' for usage information.");
        }
    }

    Ok(())
}

//! Funding CLI commands
//!
//! Record income, declare balances and inspect the funding pools.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{AccountId, FundingKind, IncomeTransaction};
use crate::services::FundingService;
use crate::storage::Storage;

use super::{parse_amount, parse_date, resolve_household};

/// Funding subcommands
#[derive(Subcommand)]
pub enum FundingCommands {
    /// Record an income transaction as a funding source
    Income {
        /// Amount (e.g., "2500" or "2500.00")
        amount: String,
        /// Date received (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Payer
        #[arg(short, long)]
        payee: Option<String>,
        /// Account ID the money landed in
        #[arg(short, long)]
        account: Option<String>,
    },

    /// Declare an account balance as a funding source
    Balance {
        /// Amount (e.g., "6000")
        amount: String,
        /// Account ID; a new one is generated when omitted
        #[arg(short, long)]
        account: Option<String>,
        /// Balance date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<String>,
    },

    /// List funding sources with what is left in each
    List,

    /// Show how much is available to assign
    Available,
}

fn parse_account(input: Option<&str>) -> EnvelopeResult<Option<AccountId>> {
    input
        .map(|s| {
            AccountId::parse(s)
                .map_err(|_| EnvelopeError::Validation(format!("Invalid account ID '{}'", s)))
        })
        .transpose()
}

/// Handle a funding command
pub fn handle_funding_command(
    storage: &Storage,
    settings: &Settings,
    household: Option<&str>,
    cmd: FundingCommands,
) -> EnvelopeResult<()> {
    let household = resolve_household(storage, household)?;
    let service = FundingService::new(storage).with_actor(settings.actor.clone());
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        FundingCommands::Income {
            amount,
            date,
            payee,
            account,
        } => {
            let mut transaction =
                IncomeTransaction::new(parse_amount(&amount)?, parse_date(date.as_deref())?);
            if let Some(payee) = payee {
                transaction = transaction.with_payee(payee);
            }
            if let Some(account) = parse_account(account.as_deref())? {
                transaction = transaction.with_account(account);
            }

            let source = service.record_income(household.id, &transaction)?;
            println!(
                "Recorded income of {} ({})",
                source.total.format_with_symbol(symbol),
                source.id
            );
        }

        FundingCommands::Balance {
            amount,
            account,
            as_of,
        } => {
            let account = parse_account(account.as_deref())?.unwrap_or_default();
            let source = service.declare_balance(
                household.id,
                account,
                parse_amount(&amount)?,
                parse_date(as_of.as_deref())?,
            )?;
            println!(
                "Declared balance of {} for {} ({})",
                source.total.format_with_symbol(symbol),
                account,
                source.id
            );
        }

        FundingCommands::List => {
            let sources = service.list_sources(household.id)?;
            if sources.is_empty() {
                println!("No funding sources yet.");
                return Ok(());
            }

            println!("{:8} {:12} {:>12} {:>12}  {}", "Kind", "Date", "Total", "Remaining", "ID");
            for pool in sources {
                let date = match &pool.kind {
                    FundingKind::Income { date, .. } => *date,
                    FundingKind::Balance { as_of, .. } => *as_of,
                };
                println!(
                    "{:8} {:12} {:>12} {:>12}  {}",
                    pool.kind.to_string(),
                    date.to_string(),
                    pool.total.format_with_symbol(symbol),
                    pool.remaining.format_with_symbol(symbol),
                    pool.source_id
                );
            }
        }

        FundingCommands::Available => {
            let available = service.to_be_assigned(household.id)?;
            println!("To be assigned: {}", available.format_with_symbol(symbol));
        }
    }

    Ok(())
}

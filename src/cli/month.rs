//! Budget month CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::EnvelopeResult;
use crate::services::HouseholdService;
use crate::storage::Storage;

use super::{parse_month, resolve_household};

/// Month subcommands
#[derive(Subcommand)]
pub enum MonthCommands {
    /// Open a budget month so money can be assigned to it
    Open {
        /// Month (YYYY-MM), defaults to the current month
        month: Option<String>,
    },

    /// Close (finalize) a month; its entries become locked
    Close {
        /// Month (YYYY-MM)
        month: String,
    },

    /// Reopen a closed month
    Reopen {
        /// Month (YYYY-MM)
        month: String,
    },

    /// List budget months
    List,
}

/// Handle a month command
pub fn handle_month_command(
    storage: &Storage,
    settings: &Settings,
    household: Option<&str>,
    cmd: MonthCommands,
) -> EnvelopeResult<()> {
    let household = resolve_household(storage, household)?;
    let service = HouseholdService::new(storage).with_actor(settings.actor.clone());

    match cmd {
        MonthCommands::Open { month } => {
            let month = parse_month(month.as_deref())?;
            let record = service.open_month(household.id, month)?;
            println!("Opened {}", record.month);
        }
        MonthCommands::Close { month } => {
            let month = parse_month(Some(&month))?;
            service.close_month(household.id, month)?;
            println!("Closed {}", month);
        }
        MonthCommands::Reopen { month } => {
            let month = parse_month(Some(&month))?;
            service.reopen_month(household.id, month)?;
            println!("Reopened {}", month);
        }
        MonthCommands::List => {
            let months = service.list_months(household.id)?;
            if months.is_empty() {
                println!("No budget months open.");
            }
            for record in months {
                let status = if record.closed { "closed" } else { "open" };
                println!("{}  {}", record.month, status);
            }
        }
    }

    Ok(())
}

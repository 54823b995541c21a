//! Budget CLI commands
//!
//! Assignment, transfers and allocation plans for a month.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{AssignmentId, FundingSourceId};
use crate::services::{
    AllocationService, AssignmentService, FundingService, TransferService, Unassigned,
};
use crate::storage::Storage;

use super::{parse_amount, parse_month, parse_target, resolve_household, target_label};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Assign money to a category or section
    Assign {
        /// Category or section (prefix with "section:" to force a section)
        target: String,
        /// Amount to assign
        amount: String,
        /// Budget month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Draw the whole amount from this funding source
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Undo an assignment entry
    Unassign {
        /// Assignment entry ID
        entry: String,
    },

    /// Move assigned money between envelopes
    Transfer {
        /// Source category or section
        from: String,
        /// Destination category or section
        to: String,
        /// Amount to move
        amount: String,
        /// Budget month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Destination month when moving money across months
        #[arg(long)]
        to_month: Option<String>,
    },

    /// Set the planned (allocated) amount for an envelope
    Plan {
        /// Category or section
        target: String,
        /// Planned amount
        amount: String,
        /// Budget month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Show allocations for a month
    Show {
        /// Budget month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// List assignment entries for an envelope
    Entries {
        /// Category or section
        target: String,
        /// Budget month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Rebuild cached assigned amounts from the entry log
    Reconcile,
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    household: Option<&str>,
    cmd: BudgetCommands,
) -> EnvelopeResult<()> {
    let household = resolve_household(storage, household)?;
    let hh = household.id;
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        BudgetCommands::Assign {
            target,
            amount,
            month,
            source,
        } => {
            let target = parse_target(storage, hh, &target)?;
            let month = parse_month(month.as_deref())?;
            let amount = parse_amount(&amount)?;
            let source = source
                .map(|s| {
                    FundingSourceId::parse(&s).map_err(|_| {
                        EnvelopeError::Validation(format!("Invalid funding source ID '{}'", s))
                    })
                })
                .transpose()?;

            let result = AssignmentService::new(storage)
                .with_actor(settings.actor.clone())
                .assign(hh, target, month, amount, source)?;

            println!(
                "Assigned {} to '{}' for {}",
                amount.format_with_symbol(symbol),
                target_label(storage, hh, target)?,
                month
            );
            for entry in &result.entries {
                println!(
                    "  {} from {}  ({})",
                    entry.amount.format_with_symbol(symbol),
                    entry.funding_source_id,
                    entry.id
                );
            }
            println!(
                "Assigned this month: {}",
                result.assigned_amount.format_with_symbol(symbol)
            );
            println!(
                "To be assigned: {}",
                result.to_be_assigned.format_with_symbol(symbol)
            );
        }

        BudgetCommands::Unassign { entry } => {
            let entry_id = AssignmentId::parse(&entry).map_err(|_| {
                EnvelopeError::Validation(format!("Invalid assignment entry ID '{}'", entry))
            })?;
            let outcome = AssignmentService::new(storage)
                .with_actor(settings.actor.clone())
                .with_unassign_policy(settings.unassign_policy)
                .unassign(entry_id)?;

            let original = outcome.original();
            let label = target_label(storage, hh, original.target)?;
            match &outcome {
                Unassigned::Deleted(_) => println!(
                    "Removed {} from '{}' for {}",
                    original.amount.format_with_symbol(symbol),
                    label,
                    original.month
                ),
                Unassigned::Reversed { reversal, .. } => println!(
                    "Reversed {} from '{}' for {} ({})",
                    original.amount.format_with_symbol(symbol),
                    label,
                    original.month,
                    reversal.id
                ),
            }
        }

        BudgetCommands::Transfer {
            from,
            to,
            amount,
            month,
            to_month,
        } => {
            let from = parse_target(storage, hh, &from)?;
            let to = parse_target(storage, hh, &to)?;
            let from_month = parse_month(month.as_deref())?;
            let to_month = match to_month {
                Some(m) => parse_month(Some(&m))?,
                None => from_month,
            };
            let amount = parse_amount(&amount)?;

            let entry = TransferService::new(storage)
                .with_actor(settings.actor.clone())
                .allow_cross_month(settings.allow_cross_month_transfers)
                .transfer_between_months(hh, from, from_month, to, to_month, amount)?;

            let from_label = target_label(storage, hh, from)?;
            let to_label = target_label(storage, hh, to)?;
            if entry.is_cross_month() {
                println!(
                    "Moved {} from '{}' ({}) to '{}' ({})",
                    amount.format_with_symbol(symbol),
                    from_label,
                    from_month,
                    to_label,
                    to_month
                );
            } else {
                println!(
                    "Moved {} from '{}' to '{}' for {}",
                    amount.format_with_symbol(symbol),
                    from_label,
                    to_label,
                    from_month
                );
            }
        }

        BudgetCommands::Plan {
            target,
            amount,
            month,
        } => {
            let target = parse_target(storage, hh, &target)?;
            let month = parse_month(month.as_deref())?;
            let allocation = AllocationService::new(storage)
                .with_actor(settings.actor.clone())
                .set_allocated(hh, target, month, parse_amount(&amount)?)?;

            println!(
                "Planned {} for '{}' in {} ({} assigned)",
                allocation.allocated_amount.format_with_symbol(symbol),
                target_label(storage, hh, target)?,
                month,
                allocation.assigned_amount.format_with_symbol(symbol)
            );
        }

        BudgetCommands::Show { month } => {
            let month = parse_month(month.as_deref())?;
            let allocations = AllocationService::new(storage).allocations_for_month(hh, month)?;
            let available = FundingService::new(storage).to_be_assigned(hh)?;

            println!("Budget for {} ({})", month, household.name);
            if allocations.is_empty() {
                println!("  Nothing allocated or assigned yet.");
            } else {
                println!("{:30} {:>12} {:>12} {:>12}", "Envelope", "Planned", "Assigned", "Unfunded");
                for allocation in &allocations {
                    println!(
                        "{:30} {:>12} {:>12} {:>12}",
                        target_label(storage, hh, allocation.target)?,
                        allocation.allocated_amount.format_with_symbol(symbol),
                        allocation.assigned_amount.format_with_symbol(symbol),
                        allocation.unfunded().format_with_symbol(symbol)
                    );
                }
            }
            println!();
            println!("To be assigned: {}", available.format_with_symbol(symbol));
        }

        BudgetCommands::Entries { target, month } => {
            let target = parse_target(storage, hh, &target)?;
            let month = parse_month(month.as_deref())?;
            let entries = AssignmentService::new(storage).entries_for(hh, target, month)?;

            if entries.is_empty() {
                println!("No assignment entries.");
                return Ok(());
            }
            for entry in entries {
                let marker = if entry.is_reversal() { " (reversal)" } else { "" };
                println!(
                    "{}  {:>12}  {}  {}{}",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.effect().format_with_symbol(symbol),
                    entry.funding_source_id,
                    entry.id,
                    marker
                );
            }
        }

        BudgetCommands::Reconcile => {
            let repairs = AllocationService::new(storage)
                .with_actor(settings.actor.clone())
                .reconcile(hh)?;
            if repairs.is_empty() {
                println!("All assigned amounts match the entry log.");
            }
            for repair in repairs {
                println!(
                    "Repaired '{}' {}: {} -> {}",
                    target_label(storage, hh, repair.target)?,
                    repair.month,
                    repair.cached.format_with_symbol(symbol),
                    repair.derived.format_with_symbol(symbol)
                );
            }
        }
    }

    Ok(())
}

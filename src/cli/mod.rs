//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer. The CLI is an
//! operator tool over the engine; it defines no wire format.

pub mod budget;
pub mod funding;
pub mod household;
pub mod month;

pub use budget::{handle_budget_command, BudgetCommands};
pub use funding::{handle_funding_command, FundingCommands};
pub use household::{handle_household_command, HouseholdCommands};
pub use month::{handle_month_command, MonthCommands};

use chrono::NaiveDate;

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{BudgetMonth, Household, HouseholdId, Money, Target};
use crate::services::HouseholdService;
use crate::storage::Storage;

/// Pick the household a command applies to
///
/// Without an explicit name the only household is used.
pub fn resolve_household(storage: &Storage, identifier: Option<&str>) -> EnvelopeResult<Household> {
    let service = HouseholdService::new(storage);
    if let Some(identifier) = identifier {
        return service.find_household(identifier);
    }

    let mut households = service.list_households()?;
    match households.len() {
        1 => Ok(households.remove(0)),
        0 => Err(EnvelopeError::Validation(
            "No households yet. Run 'envelope household create <name>' first".into(),
        )),
        _ => Err(EnvelopeError::Validation(
            "Several households exist. Choose one with --household".into(),
        )),
    }
}

/// Parse a user-entered amount such as "500", "12.34" or "$1,200"
pub fn parse_amount(input: &str) -> EnvelopeResult<Money> {
    Money::parse(input).map_err(|e| EnvelopeError::Validation(e.to_string()))
}

/// Parse "YYYY-MM", defaulting to the current month
pub fn parse_month(input: Option<&str>) -> EnvelopeResult<BudgetMonth> {
    match input {
        Some(s) => s
            .parse()
            .map_err(|e: crate::models::month::MonthParseError| {
                EnvelopeError::Validation(e.to_string())
            }),
        None => Ok(BudgetMonth::current()),
    }
}

/// Parse "YYYY-MM-DD", defaulting to today
pub fn parse_date(input: Option<&str>) -> EnvelopeResult<NaiveDate> {
    match input {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| EnvelopeError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", s))),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Resolve an envelope argument
///
/// `category:<name>` and `section:<name>` pick the kind explicitly; a bare
/// name matches a category first, then a section.
pub fn parse_target(storage: &Storage, household_id: HouseholdId, input: &str) -> EnvelopeResult<Target> {
    let service = HouseholdService::new(storage);
    match input.split_once(':') {
        Some(("category", name)) => Ok(Target::Category(service.find_category(household_id, name)?.id)),
        Some(("section", name)) => Ok(Target::Section(service.find_section(household_id, name)?.id)),
        _ => service.resolve_target(household_id, input),
    }
}

/// Display name of a target, for output
pub fn target_label(storage: &Storage, household_id: HouseholdId, target: Target) -> EnvelopeResult<String> {
    storage.read(household_id, |ledger| ledger.target_name(target))
}

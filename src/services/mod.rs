//! Business logic layer
//!
//! `AssignmentService` and `TransferService` are the only writers of ledger
//! entries. Every mutating call runs inside one `LedgerTxn` and either commits
//! everything it wrote or nothing.

mod allocation;
mod assignment;
mod funding;
mod household;
mod transfer;

pub use allocation::AllocationService;
pub use assignment::{AssignmentResult, AssignmentService, Unassigned};
pub use funding::FundingService;
pub use household::HouseholdService;
pub use transfer::TransferService;

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::ledger::HouseholdLedger;
use crate::models::BudgetMonth;

/// Actor recorded when the caller names none
pub const DEFAULT_ACTOR: &str = "system";

/// The month must be open for the household and not finalized
fn ensure_month_open(ledger: &HouseholdLedger, month: BudgetMonth) -> EnvelopeResult<()> {
    let record = ledger
        .month(month)
        .ok_or_else(|| EnvelopeError::month_not_found(month.to_string()))?;
    if record.closed {
        return Err(EnvelopeError::Locked(format!(
            "budget month {} is closed",
            month
        )));
    }
    Ok(())
}

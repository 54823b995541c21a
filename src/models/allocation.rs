//! Budget allocation model
//!
//! Per household, month and target: the planned amount and the cached
//! assigned amount. The cache is rebuilt from ledger entries and is never an
//! input to a write decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::HouseholdId;
use super::money::Money;
use super::month::BudgetMonth;
use super::target::Target;

/// Plan and assigned cache for one target in one month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAllocation {
    pub household_id: HouseholdId,
    pub target: Target,
    pub month: BudgetMonth,

    /// The plan, independent of funding
    #[serde(default)]
    pub allocated_amount: Money,

    /// Derived from assignment and transfer entries
    #[serde(default)]
    pub assigned_amount: Money,

    pub updated_at: DateTime<Utc>,
}

impl BudgetAllocation {
    pub fn new(household_id: HouseholdId, target: Target, month: BudgetMonth) -> Self {
        Self {
            household_id,
            target,
            month,
            allocated_amount: Money::zero(),
            assigned_amount: Money::zero(),
            updated_at: Utc::now(),
        }
    }

    pub fn set_allocated(&mut self, amount: Money) {
        self.allocated_amount = amount;
        self.updated_at = Utc::now();
    }

    /// Overwrite the cached assigned amount, returning whether it changed
    pub fn set_assigned(&mut self, amount: Money) -> bool {
        if self.assigned_amount == amount {
            return false;
        }
        self.assigned_amount = amount;
        self.updated_at = Utc::now();
        true
    }

    /// Planned amount still lacking funding (negative when over-funded)
    pub fn unfunded(&self) -> Money {
        self.allocated_amount - self.assigned_amount
    }

    pub fn validate(&self) -> Result<(), AllocationValidationError> {
        if self.allocated_amount.is_negative() {
            return Err(AllocationValidationError::NegativeAllocation);
        }
        Ok(())
    }
}

impl fmt::Display for BudgetAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} allocated: {} assigned: {}",
            self.month, self.allocated_amount, self.assigned_amount
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationValidationError {
    #[error("Allocated amount cannot be negative")]
    NegativeAllocation,
}

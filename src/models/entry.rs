//! Ledger entries
//!
//! Assignment and transfer entries form the append-only log that every
//! assigned figure is derived from. Amounts are always positive; the sign of
//! an entry's effect comes from its kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AssignmentId, FundingSourceId, HouseholdId, TransferId};
use super::money::Money;
use super::month::BudgetMonth;
use super::target::Target;

/// Whether an assignment entry adds money or reverses an earlier entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssignmentKind {
    #[default]
    Assign,
    Reversal {
        reverses: AssignmentId,
    },
}

/// Money from one funding source assigned to one target for one month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentEntry {
    pub id: AssignmentId,
    pub household_id: HouseholdId,
    pub funding_source_id: FundingSourceId,
    pub target: Target,
    pub month: BudgetMonth,
    pub amount: Money,
    #[serde(default)]
    pub kind: AssignmentKind,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl AssignmentEntry {
    pub fn new(
        household_id: HouseholdId,
        funding_source_id: FundingSourceId,
        target: Target,
        month: BudgetMonth,
        amount: Money,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: AssignmentId::new(),
            household_id,
            funding_source_id,
            target,
            month,
            amount,
            kind: AssignmentKind::Assign,
            created_at: Utc::now(),
            created_by: created_by.into(),
        }
    }

    /// A reversal of this entry, drawing back the same amount
    pub fn reversal(&self, created_by: impl Into<String>) -> Self {
        Self {
            id: AssignmentId::new(),
            household_id: self.household_id,
            funding_source_id: self.funding_source_id,
            target: self.target,
            month: self.month,
            amount: self.amount,
            kind: AssignmentKind::Reversal { reverses: self.id },
            created_at: Utc::now(),
            created_by: created_by.into(),
        }
    }

    /// Signed effect on the source's remaining and the target's assigned amount
    pub fn effect(&self) -> Money {
        match self.kind {
            AssignmentKind::Assign => self.amount,
            AssignmentKind::Reversal { .. } => -self.amount,
        }
    }

    pub fn is_reversal(&self) -> bool {
        matches!(self.kind, AssignmentKind::Reversal { .. })
    }

    /// The entry this one reverses, if it is a reversal
    pub fn reverses(&self) -> Option<AssignmentId> {
        match self.kind {
            AssignmentKind::Assign => None,
            AssignmentKind::Reversal { reverses } => Some(reverses),
        }
    }
}

/// Already-assigned money moved from one target/month to another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferEntry {
    pub id: TransferId,
    pub household_id: HouseholdId,
    pub from_target: Target,
    pub from_month: BudgetMonth,
    pub to_target: Target,
    pub to_month: BudgetMonth,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl TransferEntry {
    pub fn new(
        household_id: HouseholdId,
        (from_target, from_month): (Target, BudgetMonth),
        (to_target, to_month): (Target, BudgetMonth),
        amount: Money,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: TransferId::new(),
            household_id,
            from_target,
            from_month,
            to_target,
            to_month,
            amount,
            created_at: Utc::now(),
            created_by: created_by.into(),
        }
    }

    pub fn is_cross_month(&self) -> bool {
        self.from_month != self.to_month
    }

    /// Net effect of this transfer on the given target/month
    pub fn effect_on(&self, target: Target, month: BudgetMonth) -> Money {
        let mut net = Money::zero();
        if self.to_target == target && self.to_month == month {
            net += self.amount;
        }
        if self.from_target == target && self.from_month == month {
            net -= self.amount;
        }
        net
    }
}

//! Assignment service
//!
//! Puts money from funding sources into envelopes. Sufficiency is always
//! judged against every pool a household has, income and balance alike;
//! only once the whole amount is known to be fundable are individual sources
//! picked. Each source drawn yields its own entry so provenance stays
//! traceable.

use tracing::{debug, info, warn};

use crate::audit::{AuditEntry, EntityType};
use crate::config::UnassignPolicy;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::ledger::{AllocationAggregator, FundingPoolLedger};
use crate::models::{
    AssignmentEntry, AssignmentId, BudgetMonth, FundingSourceId, HouseholdId, Money, Target,
};
use crate::storage::Storage;

use super::{ensure_month_open, DEFAULT_ACTOR};

/// Outcome of a successful `assign`
#[derive(Debug, Clone)]
pub struct AssignmentResult {
    /// One entry per funding source drawn, in draw order
    pub entries: Vec<AssignmentEntry>,
    /// Assigned amount of the target/month after the assignment
    pub assigned_amount: Money,
    /// Household available to assign after the assignment
    pub to_be_assigned: Money,
}

/// What `unassign` did with the entry
#[derive(Debug, Clone)]
pub enum Unassigned {
    /// The entry row was removed
    Deleted(AssignmentEntry),
    /// A reversal entry was appended; the original stays in the log
    Reversed {
        original: AssignmentEntry,
        /// Points back at `original` and cancels its effect
        reversal: AssignmentEntry,
    },
}

impl Unassigned {
    /// The entry that was unassigned, whichever policy applied
    pub fn original(&self) -> &AssignmentEntry {
        match self {
            Self::Deleted(entry) => entry,
            Self::Reversed { original, .. } => original,
        }
    }
}

/// Service for assigning money to envelopes
pub struct AssignmentService<'a> {
    storage: &'a Storage,
    actor: String,
    /// Delete unless the caller picks a policy
    unassign_policy: UnassignPolicy,
}

impl<'a> AssignmentService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            actor: DEFAULT_ACTOR.to_string(),
            unassign_policy: UnassignPolicy::default(),
        }
    }

    /// Recorded as `created_by` on new entries
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Choose how `unassign` removes an entry from the log
    pub fn with_unassign_policy(mut self, policy: UnassignPolicy) -> Self {
        self.unassign_policy = policy;
        self
    }

    /// Assign `amount` to a target for a month
    ///
    /// With a preferred source the whole amount must come from it. Without
    /// one, sources are drawn oldest first and the amount is split across as
    /// many as needed. Either every entry is committed or none is.
    pub fn assign(
        &self,
        household_id: HouseholdId,
        target: Target,
        month: BudgetMonth,
        amount: Money,
        preferred_source: Option<FundingSourceId>,
    ) -> EnvelopeResult<AssignmentResult> {
        if !amount.is_positive() {
            return Err(EnvelopeError::InvalidAmount(amount));
        }

        let mut txn = self.storage.begin(household_id, &self.actor)?;
        let ledger = txn.ledger();

        if !ledger.has_target(target) {
            return Err(EnvelopeError::target_not_found(target.to_string()));
        }
        ensure_month_open(ledger, month)?;

        let pools = FundingPoolLedger::new(ledger);
        let plan = match preferred_source {
            Some(source_id) => pools.plan_pinned_draw(source_id, amount).map(|d| vec![d]),
            None => pools.plan_draw(target, month, amount),
        };
        let draws = match plan {
            Ok(draws) => draws,
            Err(e) => {
                if matches!(
                    e,
                    EnvelopeError::InsufficientFunds { .. }
                        | EnvelopeError::InsufficientSourceFunds { .. }
                ) {
                    warn!(
                        household = %household_id,
                        %target,
                        %month,
                        amount = %amount,
                        error = %e,
                        "assignment rejected"
                    );
                }
                return Err(e);
            }
        };

        let mut entries = Vec::with_capacity(draws.len());
        for draw in &draws {
            debug!(
                household = %household_id,
                source = %draw.source_id,
                amount = %draw.amount,
                "drawing from funding source"
            );
            let entry = AssignmentEntry::new(
                household_id,
                draw.source_id,
                target,
                month,
                draw.amount,
                self.actor.clone(),
            );
            txn.record(AuditEntry::create(EntityType::Assignment, entry.id, &entry));
            txn.ledger_mut().assignments.push(entry.clone());
            entries.push(entry);
        }

        let assigned_amount = AllocationAggregator::recompute(txn.ledger_mut(), target, month);
        let to_be_assigned = FundingPoolLedger::new(txn.ledger()).to_be_assigned()?;
        txn.commit()?;

        info!(
            household = %household_id,
            %target,
            %month,
            amount = %amount,
            entries = entries.len(),
            to_be_assigned = %to_be_assigned,
            "money assigned"
        );

        Ok(AssignmentResult {
            entries,
            assigned_amount,
            to_be_assigned,
        })
    }

    /// Take an assignment entry's money back out of its envelope
    ///
    /// The configured policy decides whether the row is deleted or a reversal
    /// is appended. Money that has since been transferred out of the
    /// envelope cannot be unassigned.
    pub fn unassign(&self, entry_id: AssignmentId) -> EnvelopeResult<Unassigned> {
        let household_id = self.storage.household_of_entry(entry_id)?;
        let mut txn = self.storage.begin(household_id, &self.actor)?;
        let ledger = txn.ledger();

        let entry = ledger
            .assignment(entry_id)
            .cloned()
            .ok_or_else(|| EnvelopeError::entry_not_found(entry_id.to_string()))?;

        ensure_month_open(ledger, entry.month)?;

        if entry.is_reversal() {
            return Err(EnvelopeError::Validation(format!(
                "entry {} is a reversal and cannot be unassigned",
                entry_id
            )));
        }
        if ledger.reversal_of(entry_id).is_some() {
            return Err(EnvelopeError::Validation(format!(
                "entry {} has already been reversed",
                entry_id
            )));
        }

        let assigned = AllocationAggregator::derive(ledger, entry.target, entry.month);
        if assigned < entry.amount {
            return Err(EnvelopeError::InsufficientAssignedFunds {
                target: ledger.target_name(entry.target),
                month: entry.month.to_string(),
                needed: entry.amount,
                available: assigned,
            });
        }

        let outcome = match self.unassign_policy {
            UnassignPolicy::Delete => {
                txn.ledger_mut().remove_assignment(entry_id);
                txn.record(AuditEntry::delete(EntityType::Assignment, entry_id, &entry));
                Unassigned::Deleted(entry)
            }
            UnassignPolicy::Reversal => {
                let reversal = entry.reversal(self.actor.clone());
                txn.record(AuditEntry::create(EntityType::Assignment, reversal.id, &reversal));
                txn.ledger_mut().assignments.push(reversal.clone());
                Unassigned::Reversed {
                    original: entry,
                    reversal,
                }
            }
        };

        let original = outcome.original();
        AllocationAggregator::recompute(txn.ledger_mut(), original.target, original.month);
        txn.commit()?;

        info!(
            household = %household_id,
            entry = %entry_id,
            amount = %original.amount,
            policy = ?self.unassign_policy,
            "assignment undone"
        );
        Ok(outcome)
    }

    /// Assignment entries for a target/month, oldest first
    pub fn entries_for(
        &self,
        household_id: HouseholdId,
        target: Target,
        month: BudgetMonth,
    ) -> EnvelopeResult<Vec<AssignmentEntry>> {
        self.storage.read(household_id, |ledger| {
            let mut entries: Vec<AssignmentEntry> = ledger
                .assignments
                .iter()
                .filter(|a| a.target == target && a.month == month)
                .cloned()
                .collect();
            entries.sort_by_key(|a| a.created_at);
            entries
        })
    }
}

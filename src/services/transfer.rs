//! Transfer service
//!
//! Moves already-assigned money between envelopes. Transfers never touch
//! funding sources, so available to assign is the same before and after.
//! The amount moved is checked against the entry-derived assigned amount of
//! the source envelope, never against the cached row.

use tracing::{info, warn};

use crate::audit::{AuditEntry, EntityType};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::ledger::AllocationAggregator;
use crate::models::{BudgetMonth, HouseholdId, Money, Target, TransferEntry};
use crate::storage::Storage;

use super::{ensure_month_open, DEFAULT_ACTOR};

/// Service for moving assigned money between envelopes
pub struct TransferService<'a> {
    storage: &'a Storage,
    actor: String,
    /// On unless turned off by `allow_cross_month`
    allow_cross_month: bool,
}

impl<'a> TransferService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            actor: DEFAULT_ACTOR.to_string(),
            allow_cross_month: true,
        }
    }

    /// Recorded as `created_by` on new transfers
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Whether transfers may move money between different months
    pub fn allow_cross_month(mut self, allow: bool) -> Self {
        self.allow_cross_month = allow;
        self
    }

    /// Move `amount` between two envelopes within one month
    pub fn transfer(
        &self,
        household_id: HouseholdId,
        from: Target,
        to: Target,
        month: BudgetMonth,
        amount: Money,
    ) -> EnvelopeResult<TransferEntry> {
        self.transfer_between_months(household_id, from, month, to, month, amount)
    }

    /// Move `amount` from one target/month to another target/month
    pub fn transfer_between_months(
        &self,
        household_id: HouseholdId,
        from: Target,
        from_month: BudgetMonth,
        to: Target,
        to_month: BudgetMonth,
        amount: Money,
    ) -> EnvelopeResult<TransferEntry> {
        if !amount.is_positive() {
            return Err(EnvelopeError::InvalidAmount(amount));
        }
        if from == to && from_month == to_month {
            return Err(EnvelopeError::Validation(
                "Cannot transfer to the same envelope".into(),
            ));
        }
        if from_month != to_month && !self.allow_cross_month {
            return Err(EnvelopeError::CrossMonthTransfer {
                from_month: from_month.to_string(),
                to_month: to_month.to_string(),
            });
        }

        let mut txn = self.storage.begin(household_id, &self.actor)?;
        let ledger = txn.ledger();

        for target in [from, to] {
            if !ledger.has_target(target) {
                return Err(EnvelopeError::target_not_found(target.to_string()));
            }
        }
        ensure_month_open(ledger, from_month)?;
        ensure_month_open(ledger, to_month)?;

        let available = AllocationAggregator::derive(ledger, from, from_month);
        if available < amount {
            warn!(
                household = %household_id,
                from = %from,
                month = %from_month,
                amount = %amount,
                available = %available,
                "transfer rejected"
            );
            return Err(EnvelopeError::InsufficientAssignedFunds {
                target: ledger.target_name(from),
                month: from_month.to_string(),
                needed: amount,
                available,
            });
        }

        let entry = TransferEntry::new(
            household_id,
            (from, from_month),
            (to, to_month),
            amount,
            self.actor.clone(),
        );
        txn.record(AuditEntry::create(EntityType::Transfer, entry.id, &entry));
        txn.ledger_mut().transfers.push(entry.clone());

        AllocationAggregator::recompute(txn.ledger_mut(), from, from_month);
        AllocationAggregator::recompute(txn.ledger_mut(), to, to_month);
        txn.commit()?;

        info!(
            household = %household_id,
            transfer = %entry.id,
            from = %from,
            to = %to,
            from_month = %from_month,
            to_month = %to_month,
            amount = %amount,
            "assigned money transferred"
        );
        Ok(entry)
    }

    /// Transfers touching a month, oldest first
    pub fn list_transfers(
        &self,
        household_id: HouseholdId,
        month: BudgetMonth,
    ) -> EnvelopeResult<Vec<TransferEntry>> {
        self.storage.read(household_id, |ledger| {
            let mut transfers: Vec<TransferEntry> = ledger
                .transfers
                .iter()
                .filter(|t| t.from_month == month || t.to_month == month)
                .cloned()
                .collect();
            transfers.sort_by_key(|t| t.created_at);
            transfers
        })
    }
}

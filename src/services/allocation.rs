//! Allocation service
//!
//! Reads of assigned amounts, the per-envelope plan, and the reconciliation
//! job that rebuilds cached assigned amounts from the entry log.

use tracing::{info, warn};

use crate::audit::{AuditEntry, EntityType};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::ledger::{AllocationAggregator, Repair};
use crate::models::{BudgetAllocation, BudgetMonth, HouseholdId, Money, Target};
use crate::storage::Storage;

use super::DEFAULT_ACTOR;

/// Service for budget allocations
pub struct AllocationService<'a> {
    storage: &'a Storage,
    actor: String,
}

impl<'a> AllocationService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            actor: DEFAULT_ACTOR.to_string(),
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Assigned amount for a target/month, derived from the entry log
    ///
    /// The owning household is found from the target.
    pub fn assigned_amount(&self, target: Target, month: BudgetMonth) -> EnvelopeResult<Money> {
        let household_id = self.storage.household_of_target(target)?;
        self.storage.read(household_id, |ledger| {
            AllocationAggregator::derive(ledger, target, month)
        })
    }

    /// The cached allocation row, or an empty one if nothing was recorded yet
    pub fn allocation(
        &self,
        household_id: HouseholdId,
        target: Target,
        month: BudgetMonth,
    ) -> EnvelopeResult<BudgetAllocation> {
        self.storage.read(household_id, |ledger| {
            if !ledger.has_target(target) {
                return Err(EnvelopeError::target_not_found(target.to_string()));
            }
            Ok(ledger
                .allocation(target, month)
                .cloned()
                .unwrap_or_else(|| BudgetAllocation::new(household_id, target, month)))
        })?
    }

    /// Every cached allocation row for a month
    pub fn allocations_for_month(
        &self,
        household_id: HouseholdId,
        month: BudgetMonth,
    ) -> EnvelopeResult<Vec<BudgetAllocation>> {
        self.storage.read(household_id, |ledger| {
            ledger
                .allocations
                .iter()
                .filter(|a| a.month == month)
                .cloned()
                .collect()
        })
    }

    /// Set the planned amount for a target/month
    ///
    /// The plan is independent of funding: it neither draws from nor checks
    /// any pool.
    pub fn set_allocated(
        &self,
        household_id: HouseholdId,
        target: Target,
        month: BudgetMonth,
        amount: Money,
    ) -> EnvelopeResult<BudgetAllocation> {
        if amount.is_negative() {
            return Err(EnvelopeError::InvalidAmount(amount));
        }

        let mut txn = self.storage.begin(household_id, &self.actor)?;
        if !txn.ledger().has_target(target) {
            return Err(EnvelopeError::target_not_found(target.to_string()));
        }
        if txn.ledger().month(month).is_none() {
            return Err(EnvelopeError::month_not_found(month.to_string()));
        }

        let before = txn.ledger().allocation(target, month).cloned();
        let allocation = txn.ledger_mut().allocation_mut(target, month);
        allocation.set_allocated(amount);
        allocation
            .validate()
            .map_err(|e| EnvelopeError::Validation(e.to_string()))?;
        let after = allocation.clone();

        let entity_id = format!("{}:{}", target, month);
        let audit = match &before {
            Some(before) => {
                AuditEntry::update(EntityType::BudgetAllocation, &entity_id, before, &after)
            }
            None => AuditEntry::create(EntityType::BudgetAllocation, &entity_id, &after),
        };
        txn.record(audit);
        txn.commit()?;

        info!(
            household = %household_id,
            %target,
            %month,
            allocated = %amount,
            "allocation planned"
        );
        Ok(after)
    }

    /// Rebuild every cached assigned amount from the entry log
    ///
    /// Returns the rows that disagreed. Running it on a consistent ledger
    /// changes nothing and commits nothing.
    pub fn reconcile(&self, household_id: HouseholdId) -> EnvelopeResult<Vec<Repair>> {
        let mut txn = self.storage.begin(household_id, &self.actor)?;
        let repairs = AllocationAggregator::recompute_all(txn.ledger_mut());
        if repairs.is_empty() {
            return Ok(repairs);
        }

        for repair in &repairs {
            warn!(
                household = %household_id,
                target = %repair.target,
                month = %repair.month,
                cached = %repair.cached,
                derived = %repair.derived,
                "repaired stale assigned amount"
            );
            if let Some(after) = txn.ledger().allocation(repair.target, repair.month) {
                let entity_id = format!("{}:{}", repair.target, repair.month);
                let audit = AuditEntry::update(
                    EntityType::BudgetAllocation,
                    &entity_id,
                    &repair.cached,
                    &after.assigned_amount,
                );
                txn.record(audit);
            }
        }
        txn.commit()?;

        info!(household = %household_id, repaired = repairs.len(), "allocations reconciled");
        Ok(repairs)
    }
}

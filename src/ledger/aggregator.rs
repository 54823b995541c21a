//! Allocation aggregator
//!
//! `assigned(target, month) = assignments + transfers in - transfers out`,
//! computed from the entry log alone. Recomputing writes the result into the
//! cached `BudgetAllocation` row and is safe to repeat.

use std::collections::BTreeSet;

use crate::models::{BudgetMonth, Money, Target};

use super::HouseholdLedger;

/// A cached row whose value disagreed with the entry log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repair {
    pub target: Target,
    pub month: BudgetMonth,
    pub cached: Money,
    pub derived: Money,
}

/// Derives and refreshes assigned amounts
pub struct AllocationAggregator;

impl AllocationAggregator {
    /// Assigned amount for a target/month, from entries only
    pub fn derive(ledger: &HouseholdLedger, target: Target, month: BudgetMonth) -> Money {
        let assigned: Money = ledger
            .assignments
            .iter()
            .filter(|a| a.target == target && a.month == month)
            .map(|a| a.effect())
            .sum();

        let transferred: Money = ledger
            .transfers
            .iter()
            .map(|t| t.effect_on(target, month))
            .sum();

        assigned + transferred
    }

    /// Recompute one target/month and store it in the allocation cache
    ///
    /// Returns the derived amount. A missing row is only created when there
    /// is something to record.
    pub fn recompute(ledger: &mut HouseholdLedger, target: Target, month: BudgetMonth) -> Money {
        let derived = Self::derive(ledger, target, month);
        if derived.is_zero() && ledger.allocation(target, month).is_none() {
            return derived;
        }
        ledger.allocation_mut(target, month).set_assigned(derived);
        derived
    }

    /// Every target/month that has a cache row or appears in an entry
    pub fn keys(ledger: &HouseholdLedger) -> BTreeSet<(Target, BudgetMonth)> {
        let mut keys = BTreeSet::new();
        keys.extend(ledger.allocations.iter().map(|a| (a.target, a.month)));
        keys.extend(ledger.assignments.iter().map(|a| (a.target, a.month)));
        for transfer in &ledger.transfers {
            keys.insert((transfer.from_target, transfer.from_month));
            keys.insert((transfer.to_target, transfer.to_month));
        }
        keys
    }

    /// Rows whose cache differs from the log, without changing anything
    pub fn drift(ledger: &HouseholdLedger) -> Vec<Repair> {
        Self::keys(ledger)
            .into_iter()
            .filter_map(|(target, month)| {
                let cached = ledger
                    .allocation(target, month)
                    .map(|a| a.assigned_amount)
                    .unwrap_or_default();
                let derived = Self::derive(ledger, target, month);
                (cached != derived).then_some(Repair {
                    target,
                    month,
                    cached,
                    derived,
                })
            })
            .collect()
    }

    /// Recompute every known target/month, returning what was repaired
    pub fn recompute_all(ledger: &mut HouseholdLedger) -> Vec<Repair> {
        let repairs = Self::drift(ledger);
        for repair in &repairs {
            Self::recompute(ledger, repair.target, repair.month);
        }
        repairs
    }

    /// Sum of every cached assigned amount
    pub fn total_assigned(ledger: &HouseholdLedger) -> Money {
        ledger.allocations.iter().map(|a| a.assigned_amount).sum()
    }
}

//! Household ledger
//!
//! A `HouseholdLedger` holds every row belonging to one household. It is the
//! unit the store versions, snapshots and commits. The pure engine pieces,
//! [`FundingPoolLedger`] and [`AllocationAggregator`], read it; services mutate
//! a transaction-private copy of it.

pub mod aggregator;
pub mod invariants;
pub mod pool;

pub use aggregator::{AllocationAggregator, Repair};
pub use pool::{Draw, FundingPoolLedger, PoolBalance};

use serde::{Deserialize, Serialize};

use crate::models::{
    AssignmentEntry, AssignmentId, BudgetAllocation, BudgetMonth, BudgetMonthRecord, Category,
    CategoryId, FundingSource, FundingSourceId, Household, HouseholdId, Section, SectionId,
    Target, TransactionId, TransferEntry,
};

/// All rows of one household, plus its commit version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdLedger {
    pub household: Household,

    /// Bumped on every commit; used for optimistic conflict detection
    #[serde(default)]
    pub version: u64,

    /// Next creation sequence number for funding sources
    #[serde(default)]
    pub next_sequence: u64,

    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub months: Vec<BudgetMonthRecord>,
    #[serde(default)]
    pub sources: Vec<FundingSource>,
    #[serde(default)]
    pub assignments: Vec<AssignmentEntry>,
    #[serde(default)]
    pub transfers: Vec<TransferEntry>,
    #[serde(default)]
    pub allocations: Vec<BudgetAllocation>,
}

impl HouseholdLedger {
    /// An empty ledger for a new household
    pub fn new(household: Household) -> Self {
        Self {
            household,
            version: 0,
            next_sequence: 1,
            sections: Vec::new(),
            categories: Vec::new(),
            months: Vec::new(),
            sources: Vec::new(),
            assignments: Vec::new(),
            transfers: Vec::new(),
            allocations: Vec::new(),
        }
    }

    pub fn household_id(&self) -> HouseholdId {
        self.household.id
    }

    /// Take the next funding-source sequence number
    pub fn take_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence.max(1);
        self.next_sequence = sequence + 1;
        sequence
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Whether the target is a category or section of this household
    pub fn has_target(&self, target: Target) -> bool {
        match target {
            Target::Category(id) => self.category(id).is_some(),
            Target::Section(id) => self.section(id).is_some(),
        }
    }

    /// Human-readable name of a target, falling back to its id
    pub fn target_name(&self, target: Target) -> String {
        match target {
            Target::Category(id) => self
                .category(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.to_string()),
            Target::Section(id) => self
                .section(id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| id.to_string()),
        }
    }

    pub fn month(&self, month: BudgetMonth) -> Option<&BudgetMonthRecord> {
        self.months.iter().find(|m| m.month == month)
    }

    pub fn month_mut(&mut self, month: BudgetMonth) -> Option<&mut BudgetMonthRecord> {
        self.months.iter_mut().find(|m| m.month == month)
    }

    pub fn source(&self, id: FundingSourceId) -> Option<&FundingSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// The income source recorded for a transaction, if any
    pub fn source_for_transaction(&self, transaction_id: TransactionId) -> Option<&FundingSource> {
        self.sources
            .iter()
            .find(|s| s.transaction_id() == Some(transaction_id))
    }

    pub fn assignment(&self, id: AssignmentId) -> Option<&AssignmentEntry> {
        self.assignments.iter().find(|a| a.id == id)
    }

    /// The reversal entry for an assignment, if it has been reversed
    pub fn reversal_of(&self, id: AssignmentId) -> Option<&AssignmentEntry> {
        self.assignments
            .iter()
            .find(|a| a.reverses() == Some(id))
    }

    /// Remove an assignment entry, returning it
    pub fn remove_assignment(&mut self, id: AssignmentId) -> Option<AssignmentEntry> {
        let index = self.assignments.iter().position(|a| a.id == id)?;
        Some(self.assignments.remove(index))
    }

    pub fn allocation(&self, target: Target, month: BudgetMonth) -> Option<&BudgetAllocation> {
        self.allocations
            .iter()
            .find(|a| a.target == target && a.month == month)
    }

    /// The allocation row for a target/month, inserting an empty one if missing
    pub fn allocation_mut(&mut self, target: Target, month: BudgetMonth) -> &mut BudgetAllocation {
        let index = match self
            .allocations
            .iter()
            .position(|a| a.target == target && a.month == month)
        {
            Some(index) => index,
            None => {
                let household_id = self.household.id;
                self.allocations
                    .push(BudgetAllocation::new(household_id, target, month));
                self.allocations.len() - 1
            }
        };
        &mut self.allocations[index]
    }
}

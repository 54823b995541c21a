//! Core data models
//!
//! Rows of the envelope ledger: funding sources, assignment and transfer
//! entries, cached allocations, and the household structure they refer to.

pub mod allocation;
pub mod entry;
pub mod funding;
pub mod household;
pub mod ids;
pub mod money;
pub mod month;
pub mod target;

pub use allocation::BudgetAllocation;
pub use entry::{AssignmentEntry, AssignmentKind, TransferEntry};
pub use funding::{FundingKind, FundingSource, IncomeTransaction};
pub use household::{Category, Household, Section};
pub use ids::{
    AccountId, AssignmentId, CategoryId, FundingSourceId, HouseholdId, SectionId, TransactionId,
    TransferId,
};
pub use money::Money;
pub use month::{BudgetMonth, BudgetMonthRecord};
pub use target::{Target, TargetError, TargetRef};

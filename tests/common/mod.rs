#![allow(dead_code)]

use chrono::NaiveDate;
use envelope_ledger::config::paths::EnvelopePaths;
use envelope_ledger::ledger::{AllocationAggregator, FundingPoolLedger};
use envelope_ledger::models::{
    AccountId, BudgetMonth, FundingSource, HouseholdId, IncomeTransaction, Money, Target,
};
use envelope_ledger::services::{FundingService, HouseholdService};
use envelope_ledger::storage::Storage;
use tempfile::TempDir;

pub fn month(s: &str) -> BudgetMonth {
    s.parse().unwrap()
}

pub fn jan() -> BudgetMonth {
    month("2026-01")
}

pub fn feb() -> BudgetMonth {
    month("2026-02")
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
}

pub fn dollars(d: i64) -> Money {
    Money::from_dollars(d)
}

/// A household with a "Bills" section holding Rent and Groceries, a
/// "Savings" section holding Vacation, and January and February open
pub struct Household {
    pub id: HouseholdId,
    pub rent: Target,
    pub groceries: Target,
    pub vacation: Target,
    pub savings: Target,
}

pub fn household(storage: &Storage, name: &str) -> Household {
    let service = HouseholdService::new(storage);
    let created = service.create_household(name).unwrap();
    let bills = service.add_section(created.id, "Bills").unwrap();
    let savings = service.add_section(created.id, "Savings").unwrap();
    let rent = service.add_category(created.id, bills.id, "Rent").unwrap();
    let groceries = service.add_category(created.id, bills.id, "Groceries").unwrap();
    let vacation = service.add_category(created.id, savings.id, "Vacation").unwrap();
    service.open_month(created.id, jan()).unwrap();
    service.open_month(created.id, feb()).unwrap();

    Household {
        id: created.id,
        rent: Target::Category(rent.id),
        groceries: Target::Category(groceries.id),
        vacation: Target::Category(vacation.id),
        savings: Target::Section(savings.id),
    }
}

pub fn income(storage: &Storage, household_id: HouseholdId, amount: Money) -> FundingSource {
    let txn = IncomeTransaction::new(amount, day(1)).with_payee("Employer");
    FundingService::new(storage)
        .record_income(household_id, &txn)
        .unwrap()
}

pub fn balance(storage: &Storage, household_id: HouseholdId, amount: Money) -> FundingSource {
    FundingService::new(storage)
        .declare_balance(household_id, AccountId::new(), amount, day(1))
        .unwrap()
}

/// A store persisted under a fresh temp dir
pub fn disk_storage() -> (TempDir, EnvelopePaths, Storage) {
    let temp = TempDir::new().unwrap();
    let paths = EnvelopePaths::with_base_dir(temp.path().to_path_buf());
    let storage = Storage::new(paths.clone()).unwrap();
    (temp, paths, storage)
}

/// Money is neither created nor destroyed
///
/// Checks, for one household, that total funding less every assignment
/// effect equals to-be-assigned, that to-be-assigned plus every derived
/// assigned amount equals total funding, and that no cached assigned amount
/// differs from its derivation.
pub fn assert_conserved(storage: &Storage, household_id: HouseholdId) {
    let ledger = storage.snapshot(household_id).unwrap();
    let pools = FundingPoolLedger::new(&ledger);

    let funding: Money = ledger.sources.iter().map(|s| s.total).sum();
    let assigned_effects: Money = ledger.assignments.iter().map(|a| a.effect()).sum();
    let to_be_assigned = pools.to_be_assigned().unwrap();
    assert_eq!(
        funding - assigned_effects,
        to_be_assigned,
        "funding less assignments must equal to-be-assigned"
    );

    let derived: Money = AllocationAggregator::keys(&ledger)
        .into_iter()
        .map(|(target, month)| AllocationAggregator::derive(&ledger, target, month))
        .sum();
    assert_eq!(
        to_be_assigned + derived,
        funding,
        "to-be-assigned plus envelopes must equal funding"
    );

    for source in &ledger.sources {
        let remaining = pools.remaining(source).unwrap();
        assert!(!remaining.is_negative(), "source {} overdrawn", source.id);
    }

    assert!(
        AllocationAggregator::drift(&ledger).is_empty(),
        "cached assigned amounts drifted from the entry log"
    );
}

mod common;

use common::*;
use envelope_ledger::config::UnassignPolicy;
use envelope_ledger::models::{AccountId, IncomeTransaction, Money};
use envelope_ledger::services::{AssignmentService, FundingService, TransferService};
use envelope_ledger::storage::Storage;
use envelope_ledger::EnvelopeError;
use proptest::prelude::{any, prop_assert, prop_oneof, proptest, Just, Strategy};

#[derive(Debug, Clone)]
enum Op {
    Income(i64),
    Balance(i64),
    Assign { target: usize, feb: bool, cents: i64 },
    AssignPinned { source: usize, target: usize, cents: i64 },
    Unassign(usize),
    Transfer { from: usize, to: usize, cross: bool, cents: i64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1i64..500_000).prop_map(Op::Income),
        (1i64..500_000).prop_map(Op::Balance),
        (0usize..4, any::<bool>(), -100i64..300_000)
            .prop_map(|(target, feb, cents)| Op::Assign { target, feb, cents }),
        (0usize..8, 0usize..4, 1i64..300_000)
            .prop_map(|(source, target, cents)| Op::AssignPinned { source, target, cents }),
        (0usize..16).prop_map(Op::Unassign),
        (0usize..4, 0usize..4, any::<bool>(), 1i64..200_000)
            .prop_map(|(from, to, cross, cents)| Op::Transfer { from, to, cross, cents }),
    ]
}

fn policy() -> impl Strategy<Value = UnassignPolicy> {
    prop_oneof![Just(UnassignPolicy::Delete), Just(UnassignPolicy::Reversal)]
}

/// Errors a well-formed operation may legitimately hit
fn is_expected(err: &EnvelopeError) -> bool {
    err.is_validation()
        || matches!(
            err,
            EnvelopeError::InsufficientFunds { .. }
                | EnvelopeError::InsufficientSourceFunds { .. }
                | EnvelopeError::InsufficientAssignedFunds { .. }
        )
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(48))]

    #[test]
    fn prop_random_operations_conserve_money(
        policy in policy(),
        ops in proptest::collection::vec(op(), 1..40),
    ) {
        let storage = Storage::in_memory();
        let hh = household(&storage, "Home");
        let targets = [hh.rent, hh.groceries, hh.vacation, hh.savings];
        let funding = FundingService::new(&storage);
        let assign = AssignmentService::new(&storage).with_unassign_policy(policy);
        let transfer = TransferService::new(&storage);

        for op in ops {
            let result = match op {
                Op::Income(cents) => {
                    let txn = IncomeTransaction::new(Money::from_cents(cents), day(2));
                    funding.record_income(hh.id, &txn).map(drop)
                }
                Op::Balance(cents) => funding
                    .declare_balance(hh.id, AccountId::new(), Money::from_cents(cents), day(3))
                    .map(drop),
                Op::Assign { target, feb: in_feb, cents } => {
                    let month = if in_feb { feb() } else { jan() };
                    assign
                        .assign(hh.id, targets[target], month, Money::from_cents(cents), None)
                        .map(drop)
                }
                Op::AssignPinned { source, target, cents } => {
                    let sources = storage.snapshot(hh.id).unwrap().sources;
                    if sources.is_empty() {
                        continue;
                    }
                    let source = sources[source % sources.len()].id;
                    assign
                        .assign(hh.id, targets[target], jan(), Money::from_cents(cents), Some(source))
                        .map(drop)
                }
                Op::Unassign(index) => {
                    let entries = storage.snapshot(hh.id).unwrap().assignments;
                    if entries.is_empty() {
                        continue;
                    }
                    assign.unassign(entries[index % entries.len()].id).map(drop)
                }
                Op::Transfer { from, to, cross, cents } => {
                    let to_month = if cross { feb() } else { jan() };
                    transfer
                        .transfer_between_months(
                            hh.id,
                            targets[from],
                            jan(),
                            targets[to],
                            to_month,
                            Money::from_cents(cents),
                        )
                        .map(drop)
                }
            };

            if let Err(err) = &result {
                prop_assert!(is_expected(err), "unexpected error: {}", err);
            }
            assert_conserved(&storage, hh.id);
            prop_assert!(!funding.to_be_assigned(hh.id).unwrap().is_negative());
        }
    }
}

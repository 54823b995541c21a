//! Funding pool ledger
//!
//! Answers "how much is available" for a household: per source and in total.
//! Every figure is derived from the assignment log; nothing here is cached.
//!
//! Draw order policy: sources with money left are drawn oldest first, by
//! `created_at` and then by creation sequence. The order carries no financial
//! meaning; it keeps splits deterministic.

use tracing::error;

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{BudgetMonth, FundingKind, FundingSource, FundingSourceId, Money, Target};

use super::HouseholdLedger;

/// A funding source together with what is left in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolBalance {
    pub source_id: FundingSourceId,
    pub kind: FundingKind,
    /// The source's full amount when it was created
    pub total: Money,
    /// `total` less the net effect of every entry drawn from the source
    pub remaining: Money,
}

/// A planned draw of `amount` from one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub source_id: FundingSourceId,
    /// Always positive and never more than the source's remaining amount
    pub amount: Money,
}

/// Read-only view of a household's funding pools
pub struct FundingPoolLedger<'l> {
    ledger: &'l HouseholdLedger,
}

impl<'l> FundingPoolLedger<'l> {
    pub fn new(ledger: &'l HouseholdLedger) -> Self {
        Self { ledger }
    }

    /// Net amount drawn from a source (assignments minus reversals)
    pub fn drawn(&self, source_id: FundingSourceId) -> Money {
        self.ledger
            .assignments
            .iter()
            .filter(|a| a.funding_source_id == source_id)
            .map(|a| a.effect())
            .sum()
    }

    /// `total - drawn` for a source
    ///
    /// A negative result means the log was overdrawn by an earlier write and
    /// is reported as a consistency violation.
    pub fn remaining(&self, source: &FundingSource) -> EnvelopeResult<Money> {
        let remaining = source
            .total
            .checked_sub(self.drawn(source.id))
            .ok_or_else(|| {
                EnvelopeError::ConsistencyViolation(format!(
                    "remaining of source {} overflowed",
                    source.id
                ))
            })?;

        if remaining.is_negative() {
            error!(
                household = %self.ledger.household_id(),
                source = %source.id,
                total = %source.total,
                remaining = %remaining,
                "funding source is overdrawn"
            );
            return Err(EnvelopeError::ConsistencyViolation(format!(
                "source {} is overdrawn: total {}, remaining {}",
                source.id, source.total, remaining
            )));
        }

        Ok(remaining)
    }

    /// Remaining amount of a source looked up by id
    pub fn remaining_by_id(&self, source_id: FundingSourceId) -> EnvelopeResult<Money> {
        let source = self
            .ledger
            .source(source_id)
            .ok_or_else(|| EnvelopeError::source_not_found(source_id.to_string()))?;
        self.remaining(source)
    }

    /// Household-wide "available to assign": the sum of every source's remaining
    pub fn to_be_assigned(&self) -> EnvelopeResult<Money> {
        let mut total = Money::zero();
        for source in &self.ledger.sources {
            let remaining = self.remaining(source)?;
            total = total.checked_add(remaining).ok_or_else(|| {
                EnvelopeError::ConsistencyViolation("to be assigned overflowed".into())
            })?;
        }
        Ok(total)
    }

    /// Every source with its remaining amount, in draw order
    pub fn balances(&self) -> EnvelopeResult<Vec<PoolBalance>> {
        let mut sources: Vec<&FundingSource> = self.ledger.sources.iter().collect();
        sources.sort_by_key(|s| s.draw_order_key());

        sources
            .into_iter()
            .map(|source| {
                Ok(PoolBalance {
                    source_id: source.id,
                    kind: source.kind.clone(),
                    total: source.total,
                    remaining: self.remaining(source)?,
                })
            })
            .collect()
    }

    /// Sources with money left, oldest first
    ///
    /// The target and month do not influence the order today; they are part
    /// of the signature so per-envelope draw preferences can slot in.
    pub fn pools_ordered_for(
        &self,
        _target: Target,
        _month: BudgetMonth,
    ) -> EnvelopeResult<Vec<PoolBalance>> {
        Ok(self
            .balances()?
            .into_iter()
            .filter(|b| b.remaining.is_positive())
            .collect())
    }

    /// Split `amount` across pools in draw order
    ///
    /// Sufficiency is checked against the union of all pools first; only then
    /// are individual sources picked.
    pub fn plan_draw(
        &self,
        target: Target,
        month: BudgetMonth,
        amount: Money,
    ) -> EnvelopeResult<Vec<Draw>> {
        let available = self.to_be_assigned()?;
        if amount > available {
            return Err(EnvelopeError::InsufficientFunds {
                needed: amount,
                available,
            });
        }

        let mut outstanding = amount;
        let mut draws = Vec::new();
        for pool in self.pools_ordered_for(target, month)? {
            if outstanding.is_zero() {
                break;
            }
            let take = pool.remaining.min(outstanding);
            draws.push(Draw {
                source_id: pool.source_id,
                amount: take,
            });
            outstanding -= take;
        }

        if !outstanding.is_zero() {
            return Err(EnvelopeError::ConsistencyViolation(format!(
                "draw plan left {} uncovered after passing the availability check",
                outstanding
            )));
        }

        Ok(draws)
    }

    /// Draw `amount` from one pinned source only
    pub fn plan_pinned_draw(
        &self,
        source_id: FundingSourceId,
        amount: Money,
    ) -> EnvelopeResult<Draw> {
        let remaining = self.remaining_by_id(source_id)?;
        if remaining < amount {
            return Err(EnvelopeError::InsufficientSourceFunds {
                source_id: source_id.to_string(),
                needed: amount,
                available: remaining,
            });
        }
        Ok(Draw { source_id, amount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AccountId, AssignmentEntry, CategoryId, Household, IncomeTransaction,
    };
    use chrono::{Duration, NaiveDate};

    fn jan() -> BudgetMonth {
        "2026-01".parse().unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    fn ledger_with_sources(amounts: &[i64]) -> HouseholdLedger {
        let mut ledger = HouseholdLedger::new(Household::new("Home"));
        let base = chrono::Utc::now();
        for (i, dollars) in amounts.iter().enumerate() {
            let sequence = ledger.take_sequence();
            let mut source = FundingSource::balance(
                ledger.household_id(),
                AccountId::new(),
                Money::from_dollars(*dollars),
                date(),
                sequence,
            );
            source.created_at = base + Duration::seconds(i as i64);
            ledger.sources.push(source);
        }
        ledger
    }

    fn assign(ledger: &mut HouseholdLedger, source_index: usize, dollars: i64) {
        let entry = AssignmentEntry::new(
            ledger.household_id(),
            ledger.sources[source_index].id,
            Target::Category(CategoryId::new()),
            jan(),
            Money::from_dollars(dollars),
            "test",
        );
        ledger.assignments.push(entry);
    }

    #[test]
    fn test_remaining_and_to_be_assigned() {
        let mut ledger = ledger_with_sources(&[100, 200]);
        assign(&mut ledger, 0, 40);

        let pools = FundingPoolLedger::new(&ledger);
        assert_eq!(
            pools.remaining(&ledger.sources[0]).unwrap(),
            Money::from_dollars(60)
        );
        assert_eq!(pools.to_be_assigned().unwrap(), Money::from_dollars(260));
    }

    #[test]
    fn test_overdrawn_source_is_consistency_violation() {
        let mut ledger = ledger_with_sources(&[100]);
        assign(&mut ledger, 0, 150);

        let pools = FundingPoolLedger::new(&ledger);
        let err = pools.to_be_assigned().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_pools_ordered_oldest_first_and_skip_empty() {
        let mut ledger = ledger_with_sources(&[100, 200, 300]);
        assign(&mut ledger, 1, 200);

        let target = Target::Category(CategoryId::new());
        let pools = FundingPoolLedger::new(&ledger);
        let ordered = pools.pools_ordered_for(target, jan()).unwrap();

        let ids: Vec<_> = ordered.iter().map(|p| p.source_id).collect();
        assert_eq!(ids, vec![ledger.sources[0].id, ledger.sources[2].id]);
    }

    #[test]
    fn test_sequence_breaks_timestamp_ties() {
        let mut ledger = ledger_with_sources(&[100, 200]);
        let stamp = ledger.sources[1].created_at;
        ledger.sources[0].created_at = stamp;
        ledger.sources.swap(0, 1);

        let pools = FundingPoolLedger::new(&ledger);
        let balances = pools.balances().unwrap();
        assert_eq!(balances[0].total, Money::from_dollars(100));
    }

    #[test]
    fn test_plan_draw_splits_fifo() {
        let ledger = ledger_with_sources(&[100, 200]);
        let pools = FundingPoolLedger::new(&ledger);

        let draws = pools
            .plan_draw(Target::Category(CategoryId::new()), jan(), Money::from_dollars(150))
            .unwrap();

        assert_eq!(
            draws,
            vec![
                Draw {
                    source_id: ledger.sources[0].id,
                    amount: Money::from_dollars(100)
                },
                Draw {
                    source_id: ledger.sources[1].id,
                    amount: Money::from_dollars(50)
                },
            ]
        );
    }

    #[test]
    fn test_plan_draw_checks_union_of_pools() {
        let mut ledger = HouseholdLedger::new(Household::new("Home"));
        let txn = IncomeTransaction::new(Money::from_dollars(300), date());
        let sequence = ledger.take_sequence();
        let income = FundingSource::income(ledger.household_id(), &txn, sequence);
        ledger.sources.push(income);
        assign(&mut ledger, 0, 300);

        let sequence = ledger.take_sequence();
        let balance = FundingSource::balance(
            ledger.household_id(),
            AccountId::new(),
            Money::from_dollars(6000),
            date(),
            sequence,
        );
        ledger.sources.push(balance);

        let pools = FundingPoolLedger::new(&ledger);
        let draws = pools
            .plan_draw(Target::Category(CategoryId::new()), jan(), Money::from_dollars(500))
            .unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].source_id, ledger.sources[1].id);

        let err = pools
            .plan_draw(Target::Category(CategoryId::new()), jan(), Money::from_dollars(6001))
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_pinned_draw_must_fit_in_source() {
        let ledger = ledger_with_sources(&[100, 200]);
        let pools = FundingPoolLedger::new(&ledger);

        assert!(pools
            .plan_pinned_draw(ledger.sources[1].id, Money::from_dollars(200))
            .is_ok());
        let err = pools
            .plan_pinned_draw(ledger.sources[0].id, Money::from_dollars(150))
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::InsufficientSourceFunds { .. }));
    }
}

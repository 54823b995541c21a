//! Funding service
//!
//! Creation hooks for funding sources and read access to the pools. Income
//! transactions become income sources one-to-one; every declared balance
//! becomes a new balance source. Neither kind is ever edited afterwards.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::audit::{AuditEntry, EntityType};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::ledger::{FundingPoolLedger, HouseholdLedger, PoolBalance};
use crate::models::{
    AccountId, BudgetMonth, FundingSource, FundingSourceId, HouseholdId, IncomeTransaction,
    Money, Target,
};
use crate::storage::Storage;

use super::DEFAULT_ACTOR;

/// Service for funding sources and availability
pub struct FundingService<'a> {
    storage: &'a Storage,
    actor: String,
}

impl<'a> FundingService<'a> {
    /// A service acting as the default actor
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

    /// Create the income source for a newly recorded inflow
    pub fn record_income(
        &self,
        household_id: HouseholdId,
        transaction: &IncomeTransaction,
    ) -> EnvelopeResult<FundingSource> {
        if !transaction.amount.is_positive() {
            return Err(EnvelopeError::InvalidAmount(transaction.amount));
        }

        let mut txn = self.storage.begin(household_id, &self.actor)?;
        if txn
            .ledger()
            .source_for_transaction(transaction.transaction_id)
            .is_some()
        {
            return Err(EnvelopeError::Duplicate {
                entity_type: "Income source",
                identifier: transaction.transaction_id.to_string(),
            });
        }

        ensure_total_fits(txn.ledger(), transaction.amount)?;

        let sequence = txn.ledger_mut().take_sequence();
        let source = FundingSource::income(household_id, transaction, sequence);
        txn.record(AuditEntry::create(EntityType::FundingSource, source.id, &source));
        txn.ledger_mut().sources.push(source.clone());
        txn.commit()?;

        info!(
            household = %household_id,
            source = %source.id,
            transaction = %transaction.transaction_id,
            amount = %source.total,
            "income source created"
        );
        Ok(source)
    }

    /// Create a balance source for a declared account balance
    pub fn declare_balance(
        &self,
        household_id: HouseholdId,
        account_id: AccountId,
        amount: Money,
        as_of: NaiveDate,
    ) -> EnvelopeResult<FundingSource> {
        if !amount.is_positive() {
            return Err(EnvelopeError::InvalidAmount(amount));
        }

        let mut txn = self.storage.begin(household_id, &self.actor)?;
        ensure_total_fits(txn.ledger(), amount)?;

        let sequence = txn.ledger_mut().take_sequence();
        let source = FundingSource::balance(household_id, account_id, amount, as_of, sequence);
        txn.record(AuditEntry::create(EntityType::FundingSource, source.id, &source));
        txn.ledger_mut().sources.push(source.clone());
        txn.commit()?;

        info!(
            household = %household_id,
            source = %source.id,
            account = %account_id,
            amount = %amount,
            "balance source created"
        );
        Ok(source)
    }

    /// What is left to draw from one source
    pub fn remaining(
        &self,
        household_id: HouseholdId,
        source_id: FundingSourceId,
    ) -> EnvelopeResult<Money> {
        self.storage.read(household_id, |ledger| {
            FundingPoolLedger::new(ledger).remaining_by_id(source_id)
        })?
    }

    /// Household-wide available to assign
    pub fn to_be_assigned(&self, household_id: HouseholdId) -> EnvelopeResult<Money> {
        self.storage
            .read(household_id, |ledger| FundingPoolLedger::new(ledger).to_be_assigned())?
    }

    /// Sources with money left, in the order an unpinned assignment draws them
    pub fn pools_ordered_for(
        &self,
        household_id: HouseholdId,
        target: Target,
        month: BudgetMonth,
    ) -> EnvelopeResult<Vec<PoolBalance>> {
        self.storage.read(household_id, |ledger| {
            FundingPoolLedger::new(ledger).pools_ordered_for(target, month)
        })?
    }

    /// Every source with its remaining amount, in draw order
    pub fn list_sources(&self, household_id: HouseholdId) -> EnvelopeResult<Vec<PoolBalance>> {
        self.storage
            .read(household_id, |ledger| FundingPoolLedger::new(ledger).balances())?
    }
}

/// The household's funding total must stay representable after adding `amount`
fn ensure_total_fits(ledger: &HouseholdLedger, amount: Money) -> EnvelopeResult<()> {
    let fits = ledger
        .sources
        .iter()
        .map(|s| s.total)
        .try_fold(amount, Money::checked_add)
        .is_some();
    if fits {
        return Ok(());
    }

    warn!(
        household = %ledger.household_id(),
        amount = %amount,
        "funding source rejected: household total would overflow"
    );
    Err(EnvelopeError::Validation(format!(
        "adding {} would overflow the household's funding total",
        amount
    )))
}

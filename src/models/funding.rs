//! Funding sources
//!
//! A funding source is an origin of assignable money. Income transactions and
//! declared account balances are the two kinds, kept as one tagged entity so
//! availability is always computed across both.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, FundingSourceId, HouseholdId, TransactionId};
use super::money::Money;

/// Where a funding source's money came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FundingKind {
    /// Backed by one inflow transaction
    Income {
        transaction_id: TransactionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account_id: Option<AccountId>,
        date: NaiveDate,
        #[serde(default)]
        payee: String,
    },
    /// Backed by a declared account balance
    Balance { account_id: AccountId, as_of: NaiveDate },
}

impl fmt::Display for FundingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income { .. } => write!(f, "income"),
            Self::Balance { .. } => write!(f, "balance"),
        }
    }
}

/// An origin of assignable money; `total` never changes after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingSource {
    pub id: FundingSourceId,
    pub household_id: HouseholdId,
    #[serde(flatten)]
    pub kind: FundingKind,
    pub total: Money,
    /// Per-household creation counter; breaks `created_at` ties in draw order
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
}

impl FundingSource {
    /// Create an income-backed source
    pub fn income(
        household_id: HouseholdId,
        transaction: &IncomeTransaction,
        sequence: u64,
    ) -> Self {
        Self {
            id: FundingSourceId::new(),
            household_id,
            kind: FundingKind::Income {
                transaction_id: transaction.transaction_id,
                account_id: transaction.account_id,
                date: transaction.date,
                payee: transaction.payee.clone(),
            },
            total: transaction.amount,
            sequence,
            created_at: Utc::now(),
        }
    }

    /// Create a balance-backed source
    pub fn balance(
        household_id: HouseholdId,
        account_id: AccountId,
        amount: Money,
        as_of: NaiveDate,
        sequence: u64,
    ) -> Self {
        Self {
            id: FundingSourceId::new(),
            household_id,
            kind: FundingKind::Balance { account_id, as_of },
            total: amount,
            sequence,
            created_at: Utc::now(),
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self.kind, FundingKind::Income { .. })
    }

    pub fn is_balance(&self) -> bool {
        matches!(self.kind, FundingKind::Balance { .. })
    }

    /// The income transaction backing this source, if any
    pub fn transaction_id(&self) -> Option<TransactionId> {
        match &self.kind {
            FundingKind::Income { transaction_id, .. } => Some(*transaction_id),
            FundingKind::Balance { .. } => None,
        }
    }

    /// FIFO draw-order key
    pub fn draw_order_key(&self) -> (DateTime<Utc>, u64) {
        (self.created_at, self.sequence)
    }
}

/// An income transaction as recorded by the transaction layer
#[derive(Debug, Clone)]
pub struct IncomeTransaction {
    pub transaction_id: TransactionId,
    pub account_id: Option<AccountId>,
    pub amount: Money,
    pub date: NaiveDate,
    pub payee: String,
}

impl IncomeTransaction {
    pub fn new(amount: Money, date: NaiveDate) -> Self {
        Self {
            transaction_id: TransactionId::new(),
            account_id: None,
            amount,
            date,
            payee: String::new(),
        }
    }

    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = payee.into();
        self
    }

    pub fn with_account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }
}

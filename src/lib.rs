//! envelope-ledger - envelope budgeting ledger engine
//!
//! Money enters a household through funding sources (income transactions
//! and declared account balances) and is assigned into envelopes, which are
//! budget categories or whole sections, for a budget month. Assigned money
//! can be moved between envelopes by transfers. The per-month assigned
//! amount of an envelope is always derived from the entry log; the cached
//! figure on `BudgetAllocation` is kept equal to it on every commit.
//!
//! # Architecture
//!
//! - `models`: rows of the ledger and the ids and value types they use
//! - `ledger`: the per-household ledger, funding pool arithmetic and the
//!   allocation aggregator
//! - `storage`: JSON persistence and optimistic per-household transactions
//! - `services`: assignment, transfer, funding and allocation operations
//! - `audit`: JSONL audit log of every committed change
//! - `config`: paths and settings
//! - `cli`: command handlers for the `envelope` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use envelope_ledger::services::{AssignmentService, FundingService};
//! use envelope_ledger::storage::Storage;
//!
//! let storage = Storage::in_memory();
//! let result = AssignmentService::new(&storage).assign(household, target, month, amount, None)?;
//! println!("left to assign: {}", result.to_be_assigned);
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{EnvelopeError, EnvelopeResult};

//! Error types for the envelope ledger
//!
//! Every engine failure is a typed, recoverable `EnvelopeError`, except
//! `ConsistencyViolation`, which signals a broken ledger invariant and should
//! be alerted on rather than shown to a user.

use thiserror::Error;

use crate::models::{Money, TargetError};

/// The main error type for envelope ledger operations
#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors that are not covered by a more specific kind
    #[error("Validation error: {0}")]
    Validation(String),

    /// Amount was zero or negative
    #[error("Invalid amount {0}: amount must be greater than zero")]
    InvalidAmount(Money),

    /// A target referenced both or neither of category and section
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// The household cannot fund the requested amount from all of its pools combined
    #[error("Insufficient funds to assign: need {needed}, to be assigned is {available}")]
    InsufficientFunds { needed: Money, available: Money },

    /// A pinned funding source cannot cover the amount alone
    #[error("Insufficient funds in source {source_id}: need {needed}, remaining {available}")]
    InsufficientSourceFunds {
        source_id: String,
        needed: Money,
        available: Money,
    },

    /// A transfer asked to move more than is assigned to its source envelope
    #[error("Insufficient assigned funds in {target} for {month}: need {needed}, assigned {available}")]
    InsufficientAssignedFunds {
        target: String,
        month: String,
        needed: Money,
        available: Money,
    },

    /// The entry or month is closed for changes
    #[error("Entry is locked: {0}")]
    Locked(String),

    /// Cross-month transfers are disabled
    #[error("Cross-month transfer from {from_month} to {to_month} is not allowed")]
    CrossMonthTransfer { from_month: String, to_month: String },

    /// Concurrent modification detected at commit time; safe to retry
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A ledger invariant failed after a write that passed validation
    #[error("Consistency violation: {0}")]
    ConsistencyViolation(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl EnvelopeError {
    /// Create a "not found" error for assignment entries
    pub fn entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Assignment entry",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for targets (categories or sections)
    pub fn target_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Target",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budget months
    pub fn month_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget month",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for households
    pub fn household_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Household",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for funding sources
    pub fn source_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Funding source",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error of any kind
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidAmount(_)
                | Self::InvalidTarget(_)
                | Self::CrossMonthTransfer { .. }
        )
    }

    /// Whether the caller may retry the whole operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Whether this error signals a broken invariant rather than bad input
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConsistencyViolation(_))
    }
}

impl From<std::io::Error> for EnvelopeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EnvelopeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<TargetError> for EnvelopeError {
    fn from(err: TargetError) -> Self {
        Self::InvalidTarget(err.to_string())
    }
}

/// Result type alias for envelope ledger operations
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

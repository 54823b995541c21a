//! Ledger invariants
//!
//! Checked on a transaction's working copy immediately before it is
//! installed. Any failure here means a service let a bad write through.

use std::collections::HashSet;

use crate::error::EnvelopeError;
use crate::models::{AssignmentKind, Money};

use super::{AllocationAggregator, FundingPoolLedger, HouseholdLedger};

/// Verify every invariant, returning a description of the first violation
pub fn verify(ledger: &HouseholdLedger) -> Result<(), String> {
    verify_amounts(ledger)?;
    verify_references(ledger)?;
    verify_sources(ledger)?;
    verify_conservation(ledger)?;
    verify_allocations(ledger)?;
    Ok(())
}

/// The bare description of a pool error; `install` adds the error kind itself
fn violation_message(err: EnvelopeError) -> String {
    match err {
        EnvelopeError::ConsistencyViolation(message) => message,
        other => other.to_string(),
    }
}

fn verify_amounts(ledger: &HouseholdLedger) -> Result<(), String> {
    if let Some(source) = ledger.sources.iter().find(|s| !s.total.is_positive()) {
        return Err(format!(
            "funding source {} has non-positive total {}",
            source.id, source.total
        ));
    }
    if let Some(entry) = ledger.assignments.iter().find(|a| !a.amount.is_positive()) {
        return Err(format!(
            "assignment {} has non-positive amount {}",
            entry.id, entry.amount
        ));
    }
    if let Some(transfer) = ledger.transfers.iter().find(|t| !t.amount.is_positive()) {
        return Err(format!(
            "transfer {} has non-positive amount {}",
            transfer.id, transfer.amount
        ));
    }
    Ok(())
}

fn verify_references(ledger: &HouseholdLedger) -> Result<(), String> {
    for entry in &ledger.assignments {
        if ledger.source(entry.funding_source_id).is_none() {
            return Err(format!(
                "assignment {} references missing source {}",
                entry.id, entry.funding_source_id
            ));
        }
        if !ledger.has_target(entry.target) {
            return Err(format!(
                "assignment {} references missing target {}",
                entry.id, entry.target
            ));
        }
    }

    let mut reversed = HashSet::new();
    for entry in &ledger.assignments {
        let AssignmentKind::Reversal { reverses } = entry.kind else {
            continue;
        };
        let original = ledger
            .assignment(reverses)
            .ok_or_else(|| format!("reversal {} references missing entry {}", entry.id, reverses))?;
        if original.is_reversal() {
            return Err(format!("reversal {} reverses another reversal", entry.id));
        }
        if original.funding_source_id != entry.funding_source_id
            || original.target != entry.target
            || original.month != entry.month
            || original.amount != entry.amount
        {
            return Err(format!(
                "reversal {} does not mirror entry {}",
                entry.id, reverses
            ));
        }
        if !reversed.insert(reverses) {
            return Err(format!("entry {} is reversed more than once", reverses));
        }
    }

    for transfer in &ledger.transfers {
        if !ledger.has_target(transfer.from_target) || !ledger.has_target(transfer.to_target) {
            return Err(format!("transfer {} references a missing target", transfer.id));
        }
    }
    Ok(())
}

fn verify_sources(ledger: &HouseholdLedger) -> Result<(), String> {
    let pools = FundingPoolLedger::new(ledger);
    for source in &ledger.sources {
        pools.remaining(source).map_err(violation_message)?;
    }
    Ok(())
}

fn verify_conservation(ledger: &HouseholdLedger) -> Result<(), String> {
    let pools = FundingPoolLedger::new(ledger);
    let to_be_assigned = pools.to_be_assigned().map_err(violation_message)?;
    let total_funding: Money = ledger.sources.iter().map(|s| s.total).sum();
    let total_drawn: Money = ledger.assignments.iter().map(|a| a.effect()).sum();

    if total_funding - total_drawn != to_be_assigned {
        return Err(format!(
            "funding {} minus drawn {} does not equal to be assigned {}",
            total_funding, total_drawn, to_be_assigned
        ));
    }
    if to_be_assigned.is_negative() {
        return Err(format!("to be assigned is negative: {}", to_be_assigned));
    }
    Ok(())
}

fn verify_allocations(ledger: &HouseholdLedger) -> Result<(), String> {
    if let Some(repair) = AllocationAggregator::drift(ledger).first() {
        return Err(format!(
            "cached assigned amount for {} in {} is {}, entries give {}",
            repair.target, repair.month, repair.cached, repair.derived
        ));
    }

    for (target, month) in AllocationAggregator::keys(ledger) {
        let assigned = AllocationAggregator::derive(ledger, target, month);
        if assigned.is_negative() {
            return Err(format!(
                "assigned amount for {} in {} is negative: {}",
                target, month, assigned
            ));
        }
    }

    let total_drawn: Money = ledger.assignments.iter().map(|a| a.effect()).sum();
    let total_assigned = AllocationAggregator::total_assigned(ledger);
    if total_drawn != total_assigned {
        return Err(format!(
            "envelopes hold {} but sources gave {}",
            total_assigned, total_drawn
        ));
    }
    Ok(())
}

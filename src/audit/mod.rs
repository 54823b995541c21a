//! Audit logging
//!
//! Every committed ledger change is recorded with before/after values in an
//! append-only JSONL log. Entries are written after the commit that produced
//! them; the ledger itself never depends on the log.
//!
//! - `AuditEntry`: one operation on one entity, stamped with household and actor.
//! - `AuditLogger`: appends entries to the log file and reads them back.

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;

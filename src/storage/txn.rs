//! Ledger transactions
//!
//! A `LedgerTxn` works on a private copy of one household. Nothing it does is
//! visible to anyone else until `commit`, which installs the copy only if the
//! household is still at the version the transaction started from and every
//! ledger invariant holds. Dropping a transaction discards it.

use tracing::debug;

use crate::audit::AuditEntry;
use crate::error::EnvelopeResult;
use crate::ledger::HouseholdLedger;
use crate::models::HouseholdId;

use super::Storage;

pub struct LedgerTxn<'s> {
    storage: &'s Storage,
    base_version: u64,
    ledger: HouseholdLedger,
    actor: String,
    audit: Vec<AuditEntry>,
}

impl<'s> LedgerTxn<'s> {
    pub(super) fn new(storage: &'s Storage, ledger: HouseholdLedger, actor: &str) -> Self {
        Self {
            storage,
            base_version: ledger.version,
            ledger,
            actor: actor.to_string(),
            audit: Vec::new(),
        }
    }

    pub fn household_id(&self) -> HouseholdId {
        self.ledger.household_id()
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Version of the committed ledger this transaction was copied from
    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    pub fn ledger(&self) -> &HouseholdLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut HouseholdLedger {
        &mut self.ledger
    }

    /// Queue an audit entry, written once the commit succeeds
    pub fn record(&mut self, entry: AuditEntry) {
        let entry = entry
            .in_household(self.ledger.household_id())
            .by(self.actor.clone());
        self.audit.push(entry);
    }

    /// Install the working copy, returning the new version
    pub fn commit(self) -> EnvelopeResult<u64> {
        let household_id = self.ledger.household_id();
        let version = self.storage.install(self.base_version, self.ledger)?;

        debug!(
            household = %household_id,
            version,
            audit_entries = self.audit.len(),
            "ledger committed"
        );

        self.storage.write_audit(&self.audit);
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::EntityType;
    use crate::error::EnvelopeError;
    use crate::config::paths::EnvelopePaths;
    use crate::ledger::AllocationAggregator;
    use crate::models::{
        AccountId, AssignmentEntry, FundingSource, Household, Money, Section, Target,
    };
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn storage_with_household() -> (Storage, HouseholdId) {
        let storage = Storage::in_memory();
        let household = Household::new("Home");
        let id = household.id;
        storage.create_household(household, "test").unwrap();
        (storage, id)
    }

    #[test]
    fn test_commit_bumps_version_and_publishes() {
        let (storage, id) = storage_with_household();

        let mut txn = storage.begin(id, "test").unwrap();
        let section = Section::new(id, "Bills");
        txn.ledger_mut().sections.push(section);

        assert!(storage.read(id, |l| l.sections.is_empty()).unwrap());
        let version = txn.commit().unwrap();

        assert_eq!(version, 1);
        assert_eq!(storage.read(id, |l| l.sections.len()).unwrap(), 1);
    }

    #[test]
    fn test_dropped_transaction_changes_nothing() {
        let (storage, id) = storage_with_household();
        {
            let mut txn = storage.begin(id, "test").unwrap();
            txn.ledger_mut().sections.push(Section::new(id, "Bills"));
        }
        assert!(storage.read(id, |l| l.sections.is_empty()).unwrap());
    }

    #[test]
    fn test_second_writer_gets_conflict() {
        let (storage, id) = storage_with_household();

        let mut first = storage.begin(id, "a").unwrap();
        let mut second = storage.begin(id, "b").unwrap();
        first.ledger_mut().sections.push(Section::new(id, "Bills"));
        second.ledger_mut().sections.push(Section::new(id, "Fun"));

        first.commit().unwrap();
        let err = second.commit().unwrap_err();

        assert!(err.is_retryable());
        let names: Vec<String> = storage
            .read(id, |l| l.sections.iter().map(|s| s.name.clone()).collect())
            .unwrap();
        assert_eq!(names, vec!["Bills".to_string()]);
    }

    #[test]
    fn test_invariant_failure_is_not_installed() {
        let (storage, id) = storage_with_household();
        let mut txn = storage.begin(id, "test").unwrap();

        let section = Section::new(id, "Bills");
        let target = Target::Section(section.id);
        txn.ledger_mut().sections.push(section);
        txn.ledger_mut()
            .allocation_mut(target, "2026-01".parse().unwrap())
            .set_assigned(Money::from_dollars(5));

        let err = txn.commit().unwrap_err();
        assert!(matches!(err, EnvelopeError::ConsistencyViolation(_)));
        assert_eq!(storage.read(id, |l| l.version).unwrap(), 0);
    }

    #[test]
    fn test_overdrawn_source_reports_one_violation() {
        let (storage, id) = storage_with_household();
        let mut txn = storage.begin(id, "test").unwrap();

        let section = Section::new(id, "Bills");
        let target = Target::Section(section.id);
        let month = "2026-01".parse().unwrap();
        let sequence = txn.ledger_mut().take_sequence();
        let source = FundingSource::balance(
            id,
            AccountId::new(),
            Money::from_dollars(10),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            sequence,
        );
        let entry = AssignmentEntry::new(id, source.id, target, month, Money::from_dollars(50), "test");
        let ledger = txn.ledger_mut();
        ledger.sections.push(section);
        ledger.sources.push(source);
        ledger.assignments.push(entry);
        AllocationAggregator::recompute(ledger, target, month);

        let message = txn.commit().unwrap_err().to_string();
        assert!(message.starts_with("Consistency violation: source "));
        assert_eq!(message.matches("Consistency violation").count(), 1);
    }

    #[test]
    fn test_audit_written_after_commit() {
        let temp_dir = TempDir::new().unwrap();
        let paths = EnvelopePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        let household = Household::new("Home");
        let id = household.id;
        storage.create_household(household, "sam").unwrap();

        let mut txn = storage.begin(id, "sam").unwrap();
        let section = Section::new(id, "Bills");
        txn.record(AuditEntry::create(EntityType::Section, section.id, &section));
        txn.ledger_mut().sections.push(section);
        txn.commit().unwrap();

        let entries = storage.audit_log().unwrap().read_all().unwrap();
        let last = entries.last().unwrap();
        assert_eq!(last.entity_type, EntityType::Section);
        assert_eq!(last.household_id, Some(id));
        assert_eq!(last.actor, "sam");
    }
}

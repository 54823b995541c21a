//! Storage layer for the envelope ledger
//!
//! Every household's rows are kept in one JSON document, `data/ledger.json`,
//! written atomically. In memory the ledgers sit behind a single `RwLock`.
//! Reads see a whole committed household; writes go through [`LedgerTxn`],
//! which installs a household's new state in one step or not at all.

pub mod file_io;
mod txn;

pub use file_io::{read_json, write_json_atomic};
pub use txn::LedgerTxn;

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::EnvelopePaths;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::ledger::{invariants, HouseholdLedger};
use crate::models::{AssignmentId, Household, HouseholdId, Target};

/// Current layout of ledger.json
pub const SCHEMA_VERSION: u32 = 1;

type Ledgers = BTreeMap<HouseholdId, HouseholdLedger>;

#[derive(Debug, Default, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    schema_version: u32,
    #[serde(default)]
    households: Vec<HouseholdLedger>,
}

#[derive(Serialize)]
struct LedgerFileRef<'a> {
    schema_version: u32,
    households: Vec<&'a HouseholdLedger>,
}

/// Owns every household ledger and the files backing them
///
/// Versions are tracked per household, so a commit only conflicts with
/// another commit to the same household. Installing still takes the one
/// write lock and rewrites the whole ledger.json, which serializes commits
/// across households.
pub struct Storage {
    paths: Option<EnvelopePaths>,
    ledgers: RwLock<Ledgers>,
    audit: Option<AuditLogger>,
}

impl Storage {
    /// Open the store under `paths`, loading ledger.json if present
    pub fn new(paths: EnvelopePaths) -> EnvelopeResult<Self> {
        paths.ensure_directories()?;

        let file: LedgerFile = read_json(paths.ledger_file())?;
        if file.schema_version > SCHEMA_VERSION {
            return Err(EnvelopeError::Storage(format!(
                "ledger file has schema version {}, newest supported is {}",
                file.schema_version, SCHEMA_VERSION
            )));
        }

        let ledgers: Ledgers = file
            .households
            .into_iter()
            .map(|ledger| (ledger.household_id(), ledger))
            .collect();

        debug!(
            households = ledgers.len(),
            path = %paths.ledger_file().display(),
            "ledger loaded"
        );

        Ok(Self {
            audit: Some(AuditLogger::new(paths.audit_log())),
            paths: Some(paths),
            ledgers: RwLock::new(ledgers),
        })
    }

    /// A store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            paths: None,
            ledgers: RwLock::new(BTreeMap::new()),
            audit: None,
        }
    }

    pub fn paths(&self) -> Option<&EnvelopePaths> {
        self.paths.as_ref()
    }

    pub fn audit_log(&self) -> Option<&AuditLogger> {
        self.audit.as_ref()
    }

    fn read_lock(&self) -> EnvelopeResult<RwLockReadGuard<'_, Ledgers>> {
        self.ledgers
            .read()
            .map_err(|e| EnvelopeError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_lock(&self) -> EnvelopeResult<RwLockWriteGuard<'_, Ledgers>> {
        self.ledgers
            .write()
            .map_err(|e| EnvelopeError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Run `f` against the committed state of one household
    pub fn read<R>(
        &self,
        household_id: HouseholdId,
        f: impl FnOnce(&HouseholdLedger) -> R,
    ) -> EnvelopeResult<R> {
        let ledgers = self.read_lock()?;
        let ledger = ledgers
            .get(&household_id)
            .ok_or_else(|| EnvelopeError::household_not_found(household_id.to_string()))?;
        Ok(f(ledger))
    }

    /// A copy of one household's committed ledger
    pub fn snapshot(&self, household_id: HouseholdId) -> EnvelopeResult<HouseholdLedger> {
        self.read(household_id, HouseholdLedger::clone)
    }

    /// Every household, ordered by name
    pub fn households(&self) -> EnvelopeResult<Vec<Household>> {
        let ledgers = self.read_lock()?;
        let mut households: Vec<Household> =
            ledgers.values().map(|l| l.household.clone()).collect();
        households.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(households)
    }

    /// Look up a household by name (case-insensitive) or id
    pub fn find_household(&self, identifier: &str) -> EnvelopeResult<Household> {
        let ledgers = self.read_lock()?;
        let by_id = HouseholdId::parse(identifier).ok();
        ledgers
            .values()
            .map(|l| &l.household)
            .find(|h| Some(h.id) == by_id || h.name.eq_ignore_ascii_case(identifier))
            .cloned()
            .ok_or_else(|| EnvelopeError::household_not_found(identifier))
    }

    /// The household owning an assignment entry
    pub fn household_of_entry(&self, entry_id: AssignmentId) -> EnvelopeResult<HouseholdId> {
        let ledgers = self.read_lock()?;
        ledgers
            .values()
            .find(|l| l.assignment(entry_id).is_some())
            .map(|l| l.household_id())
            .ok_or_else(|| EnvelopeError::entry_not_found(entry_id.to_string()))
    }

    /// The household owning a category or section
    pub fn household_of_target(&self, target: Target) -> EnvelopeResult<HouseholdId> {
        let ledgers = self.read_lock()?;
        ledgers
            .values()
            .find(|l| l.has_target(target))
            .map(|l| l.household_id())
            .ok_or_else(|| EnvelopeError::target_not_found(target.to_string()))
    }

    /// Add a new, empty household
    pub fn create_household(&self, household: Household, actor: &str) -> EnvelopeResult<()> {
        let mut ledgers = self.write_lock()?;

        if ledgers
            .values()
            .any(|l| l.household.name.eq_ignore_ascii_case(&household.name))
        {
            return Err(EnvelopeError::Duplicate {
                entity_type: "Household",
                identifier: household.name,
            });
        }

        let household_id = household.id;
        let audit = AuditEntry::create(EntityType::Household, household_id, &household)
            .named(household.name.clone())
            .in_household(household_id)
            .by(actor);

        ledgers.insert(household_id, HouseholdLedger::new(household));
        if let Err(e) = self.persist(&ledgers) {
            ledgers.remove(&household_id);
            return Err(e);
        }
        drop(ledgers);

        info!(household = %household_id, "household created");
        self.write_audit(std::slice::from_ref(&audit));
        Ok(())
    }

    /// Start a transaction on one household
    pub fn begin(&self, household_id: HouseholdId, actor: &str) -> EnvelopeResult<LedgerTxn<'_>> {
        let ledger = self.snapshot(household_id)?;
        Ok(LedgerTxn::new(self, ledger, actor))
    }

    /// Install a transaction's working copy if nothing else committed first
    ///
    /// Only `household_id`'s version is compared. Returns the new version.
    fn install(&self, base_version: u64, mut ledger: HouseholdLedger) -> EnvelopeResult<u64> {
        let household_id = ledger.household_id();
        let mut ledgers = self.write_lock()?;

        let current_version = ledgers
            .get(&household_id)
            .map(|l| l.version)
            .ok_or_else(|| EnvelopeError::household_not_found(household_id.to_string()))?;

        if current_version != base_version {
            warn!(
                household = %household_id,
                base_version,
                current_version,
                "commit rejected: ledger changed since transaction began"
            );
            return Err(EnvelopeError::Conflict(format!(
                "household {} moved from version {} to {}",
                household_id, base_version, current_version
            )));
        }

        if let Err(violation) = invariants::verify(&ledger) {
            error!(
                household = %household_id,
                version = base_version,
                violation = %violation,
                "commit rejected: ledger invariant violated"
            );
            return Err(EnvelopeError::ConsistencyViolation(violation));
        }

        let version = base_version + 1;
        ledger.version = version;
        let previous = ledgers.insert(household_id, ledger);

        if let Err(e) = self.persist(&ledgers) {
            if let Some(previous) = previous {
                ledgers.insert(household_id, previous);
            }
            error!(household = %household_id, error = %e, "failed to persist ledger");
            return Err(e);
        }

        Ok(version)
    }

    fn persist(&self, ledgers: &Ledgers) -> EnvelopeResult<()> {
        let Some(paths) = &self.paths else {
            return Ok(());
        };

        let file = LedgerFileRef {
            schema_version: SCHEMA_VERSION,
            households: ledgers.values().collect(),
        };
        write_json_atomic(paths.ledger_file(), &file)
    }

    fn write_audit(&self, entries: &[AuditEntry]) {
        let Some(logger) = &self.audit else {
            return;
        };
        if let Err(e) = logger.log_batch(entries) {
            warn!(error = %e, entries = entries.len(), "failed to write audit entries");
        }
    }
}

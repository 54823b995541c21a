//! Household service
//!
//! Households, their sections and categories (the assignable targets), and
//! the budget months assignments are recorded against.

use tracing::info;

use crate::audit::{AuditEntry, EntityType};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::household::validate_name;
use crate::models::{
    BudgetMonth, BudgetMonthRecord, Category, CategoryId, Household, HouseholdId, Section,
    SectionId, Target,
};
use crate::storage::Storage;

use super::DEFAULT_ACTOR;

/// Service for household structure and budget months
pub struct HouseholdService<'a> {
    storage: &'a Storage,
    actor: String,
}

impl<'a> HouseholdService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            actor: DEFAULT_ACTOR.to_string(),
        }
    }

    /// Record `actor` on everything this service writes
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Create a new household
    pub fn create_household(&self, name: &str) -> EnvelopeResult<Household> {
        let name = name.trim();
        validate_name(name).map_err(|e| EnvelopeError::Validation(e.to_string()))?;

        let household = Household::new(name);
        self.storage
            .create_household(household.clone(), &self.actor)?;
        Ok(household)
    }

    /// Find a household by name or id
    pub fn find_household(&self, identifier: &str) -> EnvelopeResult<Household> {
        self.storage.find_household(identifier)
    }

    pub fn list_households(&self) -> EnvelopeResult<Vec<Household>> {
        self.storage.households()
    }

    /// Add a section (category group)
    pub fn add_section(&self, household_id: HouseholdId, name: &str) -> EnvelopeResult<Section> {
        let name = name.trim();
        validate_name(name).map_err(|e| EnvelopeError::Validation(e.to_string()))?;

        let mut txn = self.storage.begin(household_id, &self.actor)?;
        if txn.ledger().section_by_name(name).is_some() {
            return Err(EnvelopeError::Duplicate {
                entity_type: "Section",
                identifier: name.to_string(),
            });
        }

        let mut section = Section::new(household_id, name);
        section.sort_order = txn.ledger().sections.len() as i32;

        txn.record(AuditEntry::create(EntityType::Section, section.id, &section).named(name));
        txn.ledger_mut().sections.push(section.clone());
        txn.commit()?;

        info!(household = %household_id, section = %section.id, section_name = name, "section added");
        Ok(section)
    }

    /// Add a category inside a section
    ///
    /// Category names are unique within a household so they can be used as
    /// lookup keys.
    pub fn add_category(
        &self,
        household_id: HouseholdId,
        section_id: SectionId,
        name: &str,
    ) -> EnvelopeResult<Category> {
        let name = name.trim();
        validate_name(name).map_err(|e| EnvelopeError::Validation(e.to_string()))?;

        let mut txn = self.storage.begin(household_id, &self.actor)?;
        if txn.ledger().section(section_id).is_none() {
            return Err(EnvelopeError::NotFound {
                entity_type: "Section",
                identifier: section_id.to_string(),
            });
        }
        if txn.ledger().category_by_name(name).is_some() {
            return Err(EnvelopeError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        let mut category = Category::new(household_id, section_id, name);
        category.sort_order = txn
            .ledger()
            .categories
            .iter()
            .filter(|c| c.section_id == section_id)
            .count() as i32;

        txn.record(AuditEntry::create(EntityType::Category, category.id, &category).named(name));
        txn.ledger_mut().categories.push(category.clone());
        txn.commit()?;

        info!(household = %household_id, category = %category.id, category_name = name, "category added");
        Ok(category)
    }

    /// Sections in display order
    pub fn list_sections(&self, household_id: HouseholdId) -> EnvelopeResult<Vec<Section>> {
        self.storage.read(household_id, |ledger| {
            let mut sections = ledger.sections.clone();
            sections.sort_by_key(|s| s.sort_order);
            sections
        })
    }

    /// Categories grouped by section, in display order
    pub fn list_categories(&self, household_id: HouseholdId) -> EnvelopeResult<Vec<Category>> {
        self.storage.read(household_id, |ledger| {
            let section_order = |id: SectionId| ledger.section(id).map(|s| s.sort_order);
            let mut categories = ledger.categories.clone();
            categories.sort_by_key(|c| (section_order(c.section_id), c.sort_order));
            categories
        })
    }

    /// Find a section by name or id
    pub fn find_section(&self, household_id: HouseholdId, identifier: &str) -> EnvelopeResult<Section> {
        self.storage
            .read(household_id, |ledger| {
                SectionId::parse(identifier)
                    .ok()
                    .and_then(|id| ledger.section(id))
                    .or_else(|| ledger.section_by_name(identifier))
                    .cloned()
            })?
            .ok_or_else(|| EnvelopeError::NotFound {
                entity_type: "Section",
                identifier: identifier.to_string(),
            })
    }

    /// Find a category by name or id
    pub fn find_category(&self, household_id: HouseholdId, identifier: &str) -> EnvelopeResult<Category> {
        self.storage
            .read(household_id, |ledger| {
                CategoryId::parse(identifier)
                    .ok()
                    .and_then(|id| ledger.category(id))
                    .or_else(|| ledger.category_by_name(identifier))
                    .cloned()
            })?
            .ok_or_else(|| EnvelopeError::NotFound {
                entity_type: "Category",
                identifier: identifier.to_string(),
            })
    }

    /// Resolve a name or id to a target, preferring categories over sections
    pub fn resolve_target(&self, household_id: HouseholdId, identifier: &str) -> EnvelopeResult<Target> {
        self.storage
            .read(household_id, |ledger| {
                if let Some(category) = CategoryId::parse(identifier)
                    .ok()
                    .and_then(|id| ledger.category(id))
                    .or_else(|| ledger.category_by_name(identifier))
                {
                    return Some(Target::Category(category.id));
                }
                SectionId::parse(identifier)
                    .ok()
                    .and_then(|id| ledger.section(id))
                    .or_else(|| ledger.section_by_name(identifier))
                    .map(|section| Target::Section(section.id))
            })?
            .ok_or_else(|| EnvelopeError::target_not_found(identifier))
    }

    /// Open a budget month; opening an existing month returns it unchanged
    pub fn open_month(
        &self,
        household_id: HouseholdId,
        month: BudgetMonth,
    ) -> EnvelopeResult<BudgetMonthRecord> {
        let mut txn = self.storage.begin(household_id, &self.actor)?;
        if let Some(existing) = txn.ledger().month(month) {
            return Ok(existing.clone());
        }

        let record = BudgetMonthRecord::new(household_id, month);
        txn.record(AuditEntry::create(EntityType::BudgetMonth, month, &record));
        txn.ledger_mut().months.push(record.clone());
        txn.commit()?;

        info!(household = %household_id, %month, "budget month opened");
        Ok(record)
    }

    /// Finalize a month; assignments, unassignments and transfers touching it
    /// are rejected afterwards
    pub fn close_month(
        &self,
        household_id: HouseholdId,
        month: BudgetMonth,
    ) -> EnvelopeResult<BudgetMonthRecord> {
        self.set_closed(household_id, month, true)
    }

    pub fn reopen_month(
        &self,
        household_id: HouseholdId,
        month: BudgetMonth,
    ) -> EnvelopeResult<BudgetMonthRecord> {
        self.set_closed(household_id, month, false)
    }

    fn set_closed(
        &self,
        household_id: HouseholdId,
        month: BudgetMonth,
        closed: bool,
    ) -> EnvelopeResult<BudgetMonthRecord> {
        let mut txn = self.storage.begin(household_id, &self.actor)?;
        let before = txn
            .ledger()
            .month(month)
            .cloned()
            .ok_or_else(|| EnvelopeError::month_not_found(month.to_string()))?;

        if before.closed == closed {
            return Ok(before);
        }

        let record = txn
            .ledger_mut()
            .month_mut(month)
            .ok_or_else(|| EnvelopeError::month_not_found(month.to_string()))?;
        if closed {
            record.close();
        } else {
            record.reopen();
        }
        let after = record.clone();

        txn.record(AuditEntry::update(EntityType::BudgetMonth, month, &before, &after));
        txn.commit()?;

        info!(household = %household_id, %month, closed, "budget month status changed");
        Ok(after)
    }

    /// Budget months, oldest first
    pub fn list_months(&self, household_id: HouseholdId) -> EnvelopeResult<Vec<BudgetMonthRecord>> {
        self.storage.read(household_id, |ledger| {
            let mut months = ledger.months.clone();
            months.sort_by_key(|m| m.month);
            months
        })
    }
}

//! Households and their envelopes
//!
//! A household owns sections (groups of envelopes) and categories. Both are
//! valid assignment targets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, HouseholdId, SectionId};

/// A budgeting household
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    pub id: HouseholdId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Household {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: HouseholdId::new(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A group of categories, itself assignable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub household_id: HouseholdId,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl Section {
    pub fn new(household_id: HouseholdId, name: impl Into<String>) -> Self {
        Self {
            id: SectionId::new(),
            household_id,
            name: name.into(),
            sort_order: 0,
            created_at: Utc::now(),
        }
    }
}

/// A single envelope inside a section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub household_id: HouseholdId,
    pub section_id: SectionId,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(household_id: HouseholdId, section_id: SectionId, name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            household_id,
            section_id,
            name: name.into(),
            sort_order: 0,
            created_at: Utc::now(),
        }
    }
}

/// Validate a household, section or category name
pub fn validate_name(name: &str) -> Result<(), NameValidationError> {
    if name.trim().is_empty() {
        return Err(NameValidationError::Empty);
    }
    if name.len() > 50 {
        return Err(NameValidationError::TooLong(name.len()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameValidationError {
    #[error("Name cannot be empty")]
    Empty,
    #[error("Name too long ({0} chars, max 50)")]
    TooLong(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_belongs_to_section() {
        let household = Household::new("Home");
        let section = Section::new(household.id, "Bills");
        let category = Category::new(household.id, section.id, "Rent");
        assert_eq!(category.section_id, section.id);
        assert_eq!(category.household_id, household.id);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Rent").is_ok());
        assert_eq!(validate_name("   "), Err(NameValidationError::Empty));
        assert_eq!(
            validate_name(&"x".repeat(51)),
            Err(NameValidationError::TooLong(51))
        );
    }
}

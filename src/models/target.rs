//! Envelope targets
//!
//! Money is assigned into exactly one category or exactly one section. The
//! enum makes the rule structural; `TargetRef` is the raw two-column form that
//! arrives from callers and must be checked before it becomes a `Target`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, SectionId};

/// An envelope that money can be assigned into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "TargetRef", into = "TargetRef")]
pub enum Target {
    Category(CategoryId),
    Section(SectionId),
}

impl Target {
    /// Build a target from optional category/section columns
    ///
    /// Exactly one of the two must be set.
    pub fn from_parts(
        category_id: Option<CategoryId>,
        section_id: Option<SectionId>,
    ) -> Result<Self, TargetError> {
        match (category_id, section_id) {
            (Some(category_id), None) => Ok(Self::Category(category_id)),
            (None, Some(section_id)) => Ok(Self::Section(section_id)),
            (Some(_), Some(_)) => Err(TargetError::Both),
            (None, None) => Err(TargetError::Neither),
        }
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        match self {
            Self::Category(id) => Some(*id),
            Self::Section(_) => None,
        }
    }

    pub fn section_id(&self) -> Option<SectionId> {
        match self {
            Self::Category(_) => None,
            Self::Section(id) => Some(*id),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(id) => write!(f, "{}", id),
            Self::Section(id) => write!(f, "{}", id),
        }
    }
}

impl From<CategoryId> for Target {
    fn from(id: CategoryId) -> Self {
        Self::Category(id)
    }
}

impl From<SectionId> for Target {
    fn from(id: SectionId) -> Self {
        Self::Section(id)
    }
}

/// Row form of a target: two nullable columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<SectionId>,
}

impl TryFrom<TargetRef> for Target {
    type Error = TargetError;

    fn try_from(value: TargetRef) -> Result<Self, Self::Error> {
        Target::from_parts(value.category_id, value.section_id)
    }
}

impl From<Target> for TargetRef {
    fn from(target: Target) -> Self {
        Self {
            category_id: target.category_id(),
            section_id: target.section_id(),
        }
    }
}

/// Why a raw target was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("target sets both a category and a section")]
    Both,
    #[error("target sets neither a category nor a section")]
    Neither,
}

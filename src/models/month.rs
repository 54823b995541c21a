//! Budget month representation
//!
//! A budget month is a calendar month written as `YYYY-MM`. Households open
//! months before money can be assigned into them and may close them later.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::HouseholdId;

/// A calendar month used as the budgeting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BudgetMonth {
    year: i32,
    month: u32,
}

impl BudgetMonth {
    /// Create a month, validating the month number
    pub fn new(year: i32, month: u32) -> Result<Self, MonthParseError> {
        if !(1..=12).contains(&month) {
            return Err(MonthParseError::OutOfRange(format!("{}-{}", year, month)));
        }
        if !(1..=9999).contains(&year) {
            return Err(MonthParseError::OutOfRange(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// The month containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month in local time
    pub fn current() -> Self {
        Self::containing(chrono::Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding month
    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for BudgetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BudgetMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| MonthParseError::InvalidFormat(s.to_string()))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(MonthParseError::InvalidFormat(s.to_string()));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| MonthParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| MonthParseError::InvalidFormat(s.to_string()))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for BudgetMonth {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BudgetMonth> for String {
    fn from(month: BudgetMonth) -> Self {
        month.to_string()
    }
}

/// Error type for month parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonthParseError {
    #[error("Invalid month format (expected YYYY-MM): {0}")]
    InvalidFormat(String),
    #[error("Month out of range: {0}")]
    OutOfRange(String),
}

/// A budget month opened by a household
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetMonthRecord {
    pub household_id: HouseholdId,
    pub month: BudgetMonth,
    #[serde(default)]
    pub closed: bool,
    pub opened_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl BudgetMonthRecord {
    pub fn new(household_id: HouseholdId, month: BudgetMonth) -> Self {
        Self {
            household_id,
            month,
            closed: false,
            opened_at: Utc::now(),
            closed_at: None,
        }
    }

    /// Mark the month as finalized
    pub fn close(&mut self) {
        self.closed = true;
        self.closed_at = Some(Utc::now());
    }

    pub fn reopen(&mut self) {
        self.closed = false;
        self.closed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> BudgetMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let m = month("2026-01");
        assert_eq!(m.year(), 2026);
        assert_eq!(m.month(), 1);
        assert_eq!(m.to_string(), "2026-01");
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!("2026-13".parse::<BudgetMonth>().is_err());
        assert!("2026-1".parse::<BudgetMonth>().is_err());
        assert!("January".parse::<BudgetMonth>().is_err());
        assert!("2026-00".parse::<BudgetMonth>().is_err());
    }

    #[test]
    fn test_next_and_prev_wrap_years() {
        assert_eq!(month("2025-12").next(), month("2026-01"));
        assert_eq!(month("2026-01").prev(), month("2025-12"));
        assert_eq!(month("2026-05").next().prev(), month("2026-05"));
    }

    #[test]
    fn test_ordering() {
        assert!(month("2025-12") < month("2026-01"));
        assert!(month("2026-02") > month("2026-01"));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&month("2026-01")).unwrap();
        assert_eq!(json, "\"2026-01\"");
        let back: BudgetMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month("2026-01"));
        assert!(serde_json::from_str::<BudgetMonth>("\"2026-13\"").is_err());
    }

    #[test]
    fn test_containing_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 17).unwrap();
        assert_eq!(BudgetMonth::containing(date), month("2026-01"));
    }

    #[test]
    fn test_close_and_reopen() {
        let mut record = BudgetMonthRecord::new(HouseholdId::new(), month("2026-01"));
        assert!(!record.closed);
        record.close();
        assert!(record.closed);
        assert!(record.closed_at.is_some());
        record.reopen();
        assert!(!record.closed);
    }
}

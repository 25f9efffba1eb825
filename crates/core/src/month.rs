//! Calendar month arithmetic.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A calendar month, serialized as `"YYYY-MM"`.
///
/// Ordering is chronological. Every month maps to a linear index
/// (`year * 12 + month - 1`) so schedule math is plain integer math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Earliest representable month.
    pub const MIN: YearMonth = YearMonth { year: i32::MIN, month: 1 };

    /// Latest representable month.
    pub const MAX: YearMonth = YearMonth { year: i32::MAX, month: 12 };

    /// Create a month. Returns `None` unless `month` is in 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing a date.
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse `YYYY-MM` or `YYYY-MM-DD` (the day is dropped).
    ///
    /// Anything else yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        match (s.len(), s.matches('-').count()) {
            (7, 1) => {
                let (y, m) = s.split_once('-')?;
                if y.len() != 4 || !y.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                if m.len() != 2 || !m.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                Self::new(y.parse().ok()?, m.parse().ok()?)
            }
            (10, 2) => {
                let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
                Some(Self::of(&date))
            }
            _ => None,
        }
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month of the year, 1..=12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Linear month index.
    pub fn index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    /// Inverse of [`YearMonth::index`]. Indices past the representable
    /// years saturate at the first or last month.
    pub fn from_index(index: i64) -> Self {
        let index = index.clamp(Self::MIN.index(), Self::MAX.index());
        Self {
            year: i32::try_from(index.div_euclid(12)).unwrap_or(i32::MAX),
            month: u32::try_from(index.rem_euclid(12)).unwrap_or(0) + 1,
        }
    }

    /// Shift by a number of months (negative goes back), saturating.
    pub fn add_months(&self, months: i64) -> Self {
        Self::from_index(self.index().saturating_add(months))
    }

    /// Months from `earlier` to `self`; negative when `self` is before.
    pub fn months_since(&self, earlier: YearMonth) -> i64 {
        self.index() - earlier.index()
    }

    /// Every month from `from` to `to`, inclusive. Empty when `from > to`.
    pub fn range_inclusive(from: YearMonth, to: YearMonth) -> impl Iterator<Item = YearMonth> {
        (from.index()..=to.index()).map(YearMonth::from_index)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ValidationError::InvalidMonth(s.to_string()))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

//! Fill model - one month's reported value for an indicator.

use serde::{Deserialize, Serialize};
use crate::error::ValidationError;
use crate::id::{FillId, IndicatorId, UserId};
use crate::month::YearMonth;
use crate::Time;

/// A monthly fill.
///
/// Several fills may exist for the same indicator and month; the one with
/// the latest `entered_at` is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Unique identifier
    pub id: FillId,

    /// Indicator being reported
    pub indicator_id: IndicatorId,

    /// Reference year
    pub year: i32,

    /// Reference month (1-12)
    pub month: u32,

    /// Realized value, `None` while pending
    pub value: Option<f64>,

    /// Free-text comment
    #[serde(default)]
    pub comment: String,

    /// Evidence file reference
    #[serde(default)]
    pub evidence: Option<String>,

    /// Where the value came from
    #[serde(default)]
    pub origin: Option<String>,

    /// Who entered it
    pub author: UserId,

    /// When it was entered
    pub entered_at: Time,
}

impl Fill {
    /// Create a fill entered now.
    pub fn new(
        indicator_id: IndicatorId,
        period: YearMonth,
        value: Option<f64>,
        author: UserId,
    ) -> Self {
        Self {
            id: FillId::new(),
            indicator_id,
            year: period.year(),
            month: period.month(),
            value,
            comment: String::new(),
            evidence: None,
            origin: None,
            author,
            entered_at: chrono::Utc::now(),
        }
    }

    /// Attach a comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Attach an evidence reference.
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    /// Reference month, `None` if the stored month is out of range.
    pub fn period(&self) -> Option<YearMonth> {
        YearMonth::new(self.year, self.month)
    }

    /// Realized value, ignoring non-finite numbers.
    pub fn realized(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }

    /// Entry-time checks on year and month.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=12).contains(&self.month) {
            return Err(ValidationError::MonthOutOfRange(self.month));
        }
        if !(1900..=2100).contains(&self.year) {
            return Err(ValidationError::YearOutOfRange(self.year));
        }
        Ok(())
    }
}

/// Filter for listing fills.
#[derive(Debug, Clone, Default)]
pub struct FillFilter {
    /// Only this indicator
    pub indicator: Option<IndicatorId>,

    /// Only this year
    pub year: Option<i32>,

    /// Only this month number
    pub month: Option<u32>,

    /// Only fills by this author
    pub author: Option<UserId>,

    /// Skip pending fills (no value)
    pub only_filled: bool,
}

impl FillFilter {
    /// Fills of one indicator.
    pub fn for_indicator(id: IndicatorId) -> Self {
        Self {
            indicator: Some(id),
            ..Default::default()
        }
    }

    /// Whether a fill passes the filter.
    pub fn matches(&self, fill: &Fill) -> bool {
        self.indicator.map_or(true, |id| fill.indicator_id == id)
            && self.year.map_or(true, |y| fill.year == y)
            && self.month.map_or(true, |m| fill.month == m)
            && self.author.map_or(true, |a| fill.author == a)
            && (!self.only_filled || fill.value.is_some())
    }
}

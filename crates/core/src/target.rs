//! Monthly target overrides.

use serde::{Deserialize, Serialize};
use crate::id::IndicatorId;
use crate::month::YearMonth;

/// Target for one indicator in one month, overriding the default target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTarget {
    /// Indicator
    pub indicator_id: IndicatorId,

    /// Month the override applies to
    pub month: YearMonth,

    /// Target value
    pub value: f64,
}

impl MonthlyTarget {
    /// Create an override.
    pub fn new(indicator_id: IndicatorId, month: YearMonth, value: f64) -> Self {
        Self {
            indicator_id,
            month,
            value,
        }
    }
}

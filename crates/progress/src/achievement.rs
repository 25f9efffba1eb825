//! Goal achievement and variance.

use kpiboard_core::ComparisonMode;
use serde::Serialize;

/// Result of comparing a realized value against its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Target met
    Achieved,
    /// Target missed
    NotAchieved,
    /// Monitoring indicator: no pass/fail, only a display flag
    Monitoring {
        /// `|realized - target|` is inside the tolerance band
        within_tolerance: bool,
    },
    /// Realized value or target missing
    NoData,
}

impl Outcome {
    /// `Some(true/false)` for pass/fail outcomes, `None` otherwise.
    pub fn achieved(&self) -> Option<bool> {
        match self {
            Outcome::Achieved => Some(true),
            Outcome::NotAchieved => Some(false),
            Outcome::Monitoring { .. } | Outcome::NoData => None,
        }
    }

    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Achieved => "achieved",
            Outcome::NotAchieved => "not achieved",
            Outcome::Monitoring { within_tolerance: true } => "monitoring (in band)",
            Outcome::Monitoring { within_tolerance: false } => "monitoring (out of band)",
            Outcome::NoData => "no data",
        }
    }
}

/// Pass/fail check. `None` for monitoring, which is never pass/fail.
pub fn achieved(mode: ComparisonMode, realized: f64, target: f64) -> Option<bool> {
    match mode {
        ComparisonMode::Increasing => Some(realized >= target),
        ComparisonMode::Decreasing => Some(realized <= target),
        ComparisonMode::Monitoring => None,
    }
}

/// Whether a value sits inside the tolerance band around the target.
pub fn within_tolerance(realized: f64, target: f64, tolerance: f64) -> bool {
    (realized - target).abs() <= tolerance
}

/// Evaluate a realized value against a target.
///
/// Missing or non-finite inputs give [`Outcome::NoData`].
pub fn evaluate(
    mode: ComparisonMode,
    realized: Option<f64>,
    target: Option<f64>,
    tolerance: f64,
) -> Outcome {
    let (Some(realized), Some(target)) = (finite(realized), finite(target)) else {
        return Outcome::NoData;
    };
    match achieved(mode, realized, target) {
        Some(true) => Outcome::Achieved,
        Some(false) => Outcome::NotAchieved,
        None => Outcome::Monitoring {
            within_tolerance: within_tolerance(realized, target, tolerance),
        },
    }
}

/// Deviation from target in percent; `0` for a zero target.
pub fn variance_percent(realized: Option<f64>, target: Option<f64>) -> Option<f64> {
    let (realized, target) = (finite(realized)?, finite(target)?);
    if target == 0.0 {
        return Some(0.0);
    }
    Some((realized - target) / target * 100.0)
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

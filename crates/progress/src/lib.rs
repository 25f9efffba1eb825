//! KPI evaluation (Layer 3)
//!
//! Reporting calendars, goal achievement, number formatting, and the
//! services built on them: progress summaries, the history grid and target
//! planning.

#![warn(missing_docs)]

pub mod access;
pub mod achievement;
pub mod error;
pub mod evaluator;
pub mod format;
pub mod history;
pub mod ledger;
pub mod schedule;
pub mod targets;
pub mod tracker;

pub use access::{can_view, visible_to};
pub use achievement::{achieved, evaluate, variance_percent, within_tolerance, Outcome};
pub use error::{ProgressError, Result};
pub use evaluator::Evaluator;
pub use format::{
    canonicalize, format_amount, format_number, format_value, parse_number, require_number,
};
pub use history::{build_history, HistoryCell, HistoryGrid, HistoryQuery, HistoryRow, StatusFilter};
pub use ledger::Ledger;
pub use schedule::{is_due, normalize_step, Schedule};
pub use targets::{plan_targets, plan_targets_through, sync_targets, TargetPlan};
pub use tracker::{
    summarize, BasicProgressTracker, CurrentStatus, HistoryEntry, IndicatorSummary,
    ProgressSnapshot, ProgressTracker,
};

//! Progress tracking service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kpiboard_core::{
    ComparisonMode, Indicator, IndicatorId, User, UserId, ValueClass, YearMonth,
};
use kpiboard_storage::Storage;
use serde::Serialize;

use crate::access::visible_to;
use crate::achievement::Outcome;
use crate::error::{ProgressError, Result};
use crate::evaluator::Evaluator;
use crate::ledger::Ledger;
use crate::schedule::Schedule;

/// Progress tracking service.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    /// Consolidated view of one indicator.
    async fn summary(&self, id: IndicatorId) -> Result<IndicatorSummary>;

    /// Summaries of every active indicator the viewer may see.
    async fn snapshot(&self, viewer: Option<&User>) -> Result<ProgressSnapshot>;
}

/// One reported month of an indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Reported month
    pub month: YearMonth,

    /// Realized value, if any
    pub value: Option<f64>,

    /// Resolved target of the month
    pub target: Option<f64>,

    /// Achievement outcome
    pub outcome: Outcome,

    /// Deviation from target in percent
    pub variance: Option<f64>,
}

/// The most recent reported month, with who reported it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentStatus {
    /// Values of the month
    #[serde(flatten)]
    pub entry: HistoryEntry,

    /// Author of the authoritative fill
    pub author: UserId,

    /// Comment of the authoritative fill
    pub comment: String,

    /// When it was entered
    pub entered_at: DateTime<Utc>,
}

/// Dashboard card data for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSummary {
    /// Indicator ID
    pub indicator_id: IndicatorId,

    /// Indicator name
    pub name: String,

    /// Comparison mode
    pub mode: ComparisonMode,

    /// Value class
    pub value_class: ValueClass,

    /// Due months with a fill, ascending
    pub history: Vec<HistoryEntry>,

    /// Latest history entry
    pub current: Option<CurrentStatus>,

    /// Due months up to the reference month without a value
    pub missing: Vec<YearMonth>,

    /// First due month after the reference month
    pub next_due: Option<YearMonth>,
}

impl IndicatorSummary {
    /// Outcome of the current month, `NoData` when nothing was reported.
    pub fn outcome(&self) -> Outcome {
        self.current
            .as_ref()
            .map(|c| c.entry.outcome)
            .unwrap_or(Outcome::NoData)
    }
}

/// Summarize an indicator from a ledger.
///
/// `reference` is the last month expected to be reported; due months up to it
/// without a value are listed as missing.
pub fn summarize(
    indicator: &Indicator,
    ledger: &Ledger,
    evaluator: &Evaluator,
    reference: YearMonth,
) -> IndicatorSummary {
    let schedule = Schedule::for_indicator(indicator);
    let by_month = ledger.fills_by_month(indicator.id);

    let history: Vec<HistoryEntry> = by_month
        .iter()
        .filter(|(month, _)| schedule.is_due(**month))
        .map(|(&month, fill)| {
            let value = fill.realized();
            let target = ledger.target_for(indicator, month);
            HistoryEntry {
                month,
                value,
                target,
                outcome: evaluator.evaluate(indicator.mode, value, target),
                variance: evaluator.variance(value, target),
            }
        })
        .collect();

    let current = history.last().and_then(|entry| {
        by_month.get(&entry.month).map(|fill| CurrentStatus {
            entry: entry.clone(),
            author: fill.author,
            comment: fill.comment.clone(),
            entered_at: fill.entered_at,
        })
    });

    let missing = schedule
        .due_months(schedule.anchor(), reference)
        .into_iter()
        .filter(|month| by_month.get(month).and_then(|f| f.realized()).is_none())
        .collect();

    IndicatorSummary {
        indicator_id: indicator.id,
        name: indicator.name.clone(),
        mode: indicator.mode,
        value_class: indicator.value_class,
        history,
        current,
        missing,
        next_due: schedule.next_due(reference),
    }
}

/// A snapshot of progress at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    /// When snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Reference month used for missing months
    pub reference: YearMonth,

    /// One summary per indicator, ordered by name
    pub summaries: Vec<IndicatorSummary>,

    /// Indicators whose current month is achieved
    pub achieved: usize,

    /// Indicators whose current month is not achieved
    pub not_achieved: usize,

    /// Monitoring indicators with a current value
    pub monitoring: usize,

    /// Indicators with nothing to evaluate
    pub no_data: usize,
}

impl ProgressSnapshot {
    fn from_summaries(reference: YearMonth, summaries: Vec<IndicatorSummary>) -> Self {
        let mut snapshot = Self {
            timestamp: Utc::now(),
            reference,
            summaries: Vec::new(),
            achieved: 0,
            not_achieved: 0,
            monitoring: 0,
            no_data: 0,
        };
        for summary in &summaries {
            match summary.outcome() {
                Outcome::Achieved => snapshot.achieved += 1,
                Outcome::NotAchieved => snapshot.not_achieved += 1,
                Outcome::Monitoring { .. } => snapshot.monitoring += 1,
                Outcome::NoData => snapshot.no_data += 1,
            }
        }
        snapshot.summaries = summaries;
        snapshot
    }
}

/// Basic progress tracker implementation.
pub struct BasicProgressTracker<S: Storage> {
    storage: Arc<S>,
    evaluator: Evaluator,
    reference: YearMonth,
}

impl<S: Storage> BasicProgressTracker<S> {
    /// Create a tracker. The reference month defaults to the previous
    /// calendar month.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            evaluator: Evaluator::default(),
            reference: YearMonth::of(&Utc::now()).add_months(-1),
        }
    }

    /// Use a configured evaluator.
    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Set the last month expected to be reported.
    pub fn with_reference(mut self, reference: YearMonth) -> Self {
        self.reference = reference;
        self
    }

    async fn ledger(&self) -> Result<Ledger> {
        Ok(Ledger::load(self.storage.as_ref()).await?)
    }
}

#[async_trait]
impl<S: Storage + 'static> ProgressTracker for BasicProgressTracker<S> {
    async fn summary(&self, id: IndicatorId) -> Result<IndicatorSummary> {
        let ledger = self.ledger().await?;
        let indicator = ledger
            .indicator(id)
            .ok_or(ProgressError::IndicatorNotFound(id))?;
        Ok(summarize(indicator, &ledger, &self.evaluator, self.reference))
    }

    async fn snapshot(&self, viewer: Option<&User>) -> Result<ProgressSnapshot> {
        let ledger = self.ledger().await?;
        let summaries: Vec<_> = ledger
            .indicators()
            .into_iter()
            .filter(|i| i.active && visible_to(viewer, i))
            .map(|i| summarize(i, &ledger, &self.evaluator, self.reference))
            .collect();

        let snapshot = ProgressSnapshot::from_summaries(self.reference, summaries);
        tracing::info!(
            indicators = snapshot.summaries.len(),
            achieved = snapshot.achieved,
            not_achieved = snapshot.not_achieved,
            no_data = snapshot.no_data,
            "progress snapshot"
        );
        Ok(snapshot)
    }
}

//! In-memory view of indicators, fills and target overrides.

use std::collections::{BTreeMap, HashMap};

use kpiboard_core::{Fill, FillFilter, Indicator, IndicatorId, MonthlyTarget, YearMonth};
use kpiboard_storage::Storage;

/// Indicators, fills and target overrides, indexed for evaluation.
///
/// Built once per request and handed to the code that needs it.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    indicators: HashMap<IndicatorId, Indicator>,
    fills: HashMap<IndicatorId, Vec<Fill>>,
    targets: HashMap<(IndicatorId, YearMonth), f64>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from plain records.
    pub fn from_parts(
        indicators: impl IntoIterator<Item = Indicator>,
        fills: impl IntoIterator<Item = Fill>,
        targets: impl IntoIterator<Item = MonthlyTarget>,
    ) -> Self {
        let mut ledger = Self::new();
        for indicator in indicators {
            ledger.insert_indicator(indicator);
        }
        for fill in fills {
            ledger.insert_fill(fill);
        }
        for target in targets {
            ledger.insert_target(target);
        }
        ledger
    }

    /// Load everything from storage.
    pub async fn load<S: Storage + ?Sized>(storage: &S) -> kpiboard_storage::Result<Self> {
        let indicators = storage.list_indicators().await?;
        let fills = storage.list_fills(&FillFilter::default()).await?;
        let targets = storage.list_targets(None).await?;
        tracing::debug!(
            indicators = indicators.len(),
            fills = fills.len(),
            targets = targets.len(),
            "loaded ledger"
        );
        Ok(Self::from_parts(indicators, fills, targets))
    }

    /// Add or replace an indicator.
    pub fn insert_indicator(&mut self, indicator: Indicator) {
        self.indicators.insert(indicator.id, indicator);
    }

    /// Add a fill.
    pub fn insert_fill(&mut self, fill: Fill) {
        self.fills.entry(fill.indicator_id).or_default().push(fill);
    }

    /// Add or replace a target override.
    pub fn insert_target(&mut self, target: MonthlyTarget) {
        self.targets.insert((target.indicator_id, target.month), target.value);
    }

    /// Look up an indicator.
    pub fn indicator(&self, id: IndicatorId) -> Option<&Indicator> {
        self.indicators.get(&id)
    }

    /// All indicators, ordered by name.
    pub fn indicators(&self) -> Vec<&Indicator> {
        let mut all: Vec<_> = self.indicators.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        all
    }

    /// Every fill of an indicator, in insertion order.
    pub fn fills(&self, id: IndicatorId) -> &[Fill] {
        self.fills.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Target for a month: the override if present, else the default.
    pub fn target_for(&self, indicator: &Indicator, month: YearMonth) -> Option<f64> {
        self.targets
            .get(&(indicator.id, month))
            .copied()
            .or(Some(indicator.target))
            .filter(|v| v.is_finite())
    }

    /// Override for a month, if any.
    pub fn override_for(&self, id: IndicatorId, month: YearMonth) -> Option<f64> {
        self.targets.get(&(id, month)).copied()
    }

    /// The authoritative fill of a month: the latest entered one.
    pub fn latest_fill(&self, id: IndicatorId, month: YearMonth) -> Option<&Fill> {
        self.fills(id)
            .iter()
            .filter(|f| f.period() == Some(month))
            .fold(None, |best: Option<&Fill>, f| match best {
                Some(b) if b.entered_at > f.entered_at => Some(b),
                _ => Some(f),
            })
    }

    /// One authoritative fill per month, ascending. Fills with an invalid
    /// month are skipped.
    pub fn fills_by_month(&self, id: IndicatorId) -> BTreeMap<YearMonth, &Fill> {
        let mut by_month: BTreeMap<YearMonth, &Fill> = BTreeMap::new();
        for fill in self.fills(id) {
            let Some(month) = fill.period() else {
                continue;
            };
            match by_month.get(&month) {
                Some(current) if current.entered_at > fill.entered_at => {}
                _ => {
                    by_month.insert(month, fill);
                }
            }
        }
        by_month
    }
}

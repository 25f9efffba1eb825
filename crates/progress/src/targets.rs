//! Keeps monthly target overrides in step with an indicator's calendar.

use std::collections::BTreeSet;

use kpiboard_core::{Indicator, MonthlyTarget, YearMonth};
use kpiboard_storage::Storage;

use crate::error::Result;
use crate::schedule::Schedule;

/// Changes needed to align overrides with a calendar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetPlan {
    /// Overrides to create, seeded with the default target
    pub create: Vec<MonthlyTarget>,
    /// Months whose override should be removed
    pub remove: Vec<YearMonth>,
}

impl TargetPlan {
    /// Nothing to do.
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.remove.is_empty()
    }
}

/// Plan overrides for an indicator as of `today`'s month.
///
/// Open calendars are covered through `today` and nothing is removed. Closed
/// calendars are covered through the final month and overrides after it are
/// removed. Without an explicit anchor there is nothing to plan.
pub fn plan_targets(indicator: &Indicator, existing: &[MonthlyTarget], today: YearMonth) -> TargetPlan {
    match indicator.end {
        Some(end) => plan_targets_through(indicator, existing, end, true),
        None => plan_targets_through(indicator, existing, today, false),
    }
}

/// Plan overrides through an arbitrary month. With `hard_cap`, overrides
/// after `through` are removed.
pub fn plan_targets_through(
    indicator: &Indicator,
    existing: &[MonthlyTarget],
    through: YearMonth,
    hard_cap: bool,
) -> TargetPlan {
    let Some(anchor) = indicator.anchor else {
        return TargetPlan::default();
    };
    let schedule = Schedule::new(anchor, i64::from(indicator.step), None);
    let have: BTreeSet<YearMonth> = existing
        .iter()
        .filter(|t| t.indicator_id == indicator.id)
        .map(|t| t.month)
        .collect();

    let create = schedule
        .due_months(anchor, through)
        .into_iter()
        .filter(|month| !have.contains(month))
        .map(|month| MonthlyTarget::new(indicator.id, month, indicator.target))
        .collect();

    let remove = if hard_cap {
        have.into_iter().filter(|month| *month > through).collect()
    } else {
        Vec::new()
    };

    TargetPlan { create, remove }
}

/// Apply [`plan_targets`] to a store.
pub async fn sync_targets<S: Storage + ?Sized>(
    storage: &mut S,
    indicator: &Indicator,
    today: YearMonth,
) -> Result<TargetPlan> {
    let existing = storage.list_targets(Some(indicator.id)).await?;
    let plan = plan_targets(indicator, &existing, today);

    for target in &plan.create {
        storage.save_target(target).await?;
    }
    for month in &plan.remove {
        storage.delete_target(indicator.id, *month).await?;
    }

    if plan.is_empty() {
        tracing::debug!(indicator = %indicator.id, "targets already in sync");
    } else {
        tracing::info!(
            indicator = %indicator.id,
            created = plan.create.len(),
            removed = plan.remove.len(),
            "synced monthly targets"
        );
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpiboard_core::{ComparisonMode, SectorId};
    use kpiboard_storage::JsonStorage;
    use tempfile::TempDir;

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn months(targets: &[MonthlyTarget]) -> Vec<YearMonth> {
        targets.iter().map(|t| t.month).collect()
    }

    #[test]
    fn test_open_calendar_fills_through_today() {
        let ind = Indicator::new("NPS", SectorId::new(), 70.0, ComparisonMode::Increasing)
            .with_schedule(ym(2024, 1), 2, None);
        let existing = vec![
            MonthlyTarget::new(ind.id, ym(2024, 3), 80.0),
            MonthlyTarget::new(ind.id, ym(2025, 1), 90.0),
        ];

        let plan = plan_targets(&ind, &existing, ym(2024, 8));

        assert_eq!(months(&plan.create), vec![ym(2024, 1), ym(2024, 5), ym(2024, 7)]);
        assert!(plan.create.iter().all(|t| t.value == 70.0));
        assert!(plan.remove.is_empty());
    }

    #[test]
    fn test_closed_calendar_caps_at_end() {
        let ind = Indicator::new("NPS", SectorId::new(), 70.0, ComparisonMode::Increasing)
            .with_schedule(ym(2024, 1), 1, Some(ym(2024, 3)));
        let existing = vec![
            MonthlyTarget::new(ind.id, ym(2024, 2), 75.0),
            MonthlyTarget::new(ind.id, ym(2024, 4), 75.0),
            MonthlyTarget::new(ind.id, ym(2024, 6), 75.0),
        ];

        let plan = plan_targets(&ind, &existing, ym(2030, 1));

        assert_eq!(months(&plan.create), vec![ym(2024, 1), ym(2024, 3)]);
        assert_eq!(plan.remove, vec![ym(2024, 4), ym(2024, 6)]);
    }

    #[test]
    fn test_no_anchor_plans_nothing() {
        let ind = Indicator::new("NPS", SectorId::new(), 70.0, ComparisonMode::Increasing);
        assert!(plan_targets(&ind, &[], ym(2024, 5)).is_empty());
    }

    #[tokio::test]
    async fn test_sync_targets_keeps_existing_values() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let ind = Indicator::new("NPS", SectorId::new(), 70.0, ComparisonMode::Increasing)
            .with_schedule(ym(2024, 1), 1, Some(ym(2024, 2)));
        storage.save_indicator(&ind).await.unwrap();
        storage
            .save_target(&MonthlyTarget::new(ind.id, ym(2024, 2), 99.0))
            .await
            .unwrap();
        storage
            .save_target(&MonthlyTarget::new(ind.id, ym(2024, 5), 99.0))
            .await
            .unwrap();

        let plan = sync_targets(&mut storage, &ind, ym(2024, 6)).await.unwrap();
        assert_eq!(months(&plan.create), vec![ym(2024, 1)]);

        let stored = storage.list_targets(Some(ind.id)).await.unwrap();
        assert_eq!(months(&stored), vec![ym(2024, 1), ym(2024, 2)]);
        assert_eq!(stored[1].value, 99.0);

        let again = sync_targets(&mut storage, &ind, ym(2024, 6)).await.unwrap();
        assert!(again.is_empty());
    }
}

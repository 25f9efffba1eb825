//! Month-by-month history grid across indicators.

use std::collections::HashMap;
use std::str::FromStr;

use kpiboard_core::{
    ComparisonMode, IndicatorId, Sector, SectorId, User, ValidationError, ValueClass, YearMonth,
};
use serde::Serialize;

use crate::access::visible_to;
use crate::achievement::Outcome;
use crate::evaluator::Evaluator;
use crate::ledger::Ledger;
use crate::schedule::Schedule;

/// Which fills select a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    /// Any fill
    #[default]
    All,
    /// Fills that met their target
    Achieved,
    /// Fills that missed their target
    NotAchieved,
}

impl StatusFilter {
    /// Whether an outcome passes the filter.
    pub fn accepts(&self, outcome: Outcome) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Achieved => outcome == Outcome::Achieved,
            StatusFilter::NotAchieved => outcome == Outcome::NotAchieved,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "todos" => Ok(StatusFilter::All),
            "achieved" | "atingidos" => Ok(StatusFilter::Achieved),
            "not-achieved" | "not_achieved" | "nao-atingidos" => Ok(StatusFilter::NotAchieved),
            _ => Err(ValidationError::UnknownVariant {
                kind: "status filter",
                value: s.to_string(),
            }),
        }
    }
}

/// Parameters of a history report.
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    /// First month of the window
    pub from: YearMonth,
    /// Last month of the window
    pub to: YearMonth,
    /// Restrict to one sector
    pub sector: Option<SectorId>,
    /// Restrict to one indicator
    pub indicator: Option<IndicatorId>,
    /// Row selection by outcome
    pub status: StatusFilter,
}

impl HistoryQuery {
    /// All indicators over a window.
    pub fn window(from: YearMonth, to: YearMonth) -> Self {
        Self {
            from,
            to,
            sector: None,
            indicator: None,
            status: StatusFilter::All,
        }
    }
}

/// One month of one indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryCell {
    /// Month
    pub month: YearMonth,
    /// Realized value of the authoritative fill
    pub value: Option<f64>,
    /// Resolved target
    pub target: Option<f64>,
    /// Achievement outcome
    pub outcome: Outcome,
    /// Whether the month is due on the indicator's calendar
    pub due: bool,
    /// Whether any fill exists for the month
    pub filled: bool,
}

/// One indicator across the window.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    /// Indicator ID
    pub indicator_id: IndicatorId,
    /// Indicator name
    pub name: String,
    /// Sector name
    pub sector: String,
    /// Comparison mode
    pub mode: ComparisonMode,
    /// Value class
    pub value_class: ValueClass,
    /// One cell per window month
    pub cells: Vec<HistoryCell>,
}

/// The report: a column per month and a row per indicator.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryGrid {
    /// Window months, ascending
    pub months: Vec<YearMonth>,
    /// Rows ordered by indicator name
    pub rows: Vec<HistoryRow>,
}

/// Build the history grid.
///
/// Only active indicators of active sectors are considered. An indicator gets
/// a row when at least one of its fills inside the window passes the status
/// filter; its cells then show every month of the window.
pub fn build_history(
    ledger: &Ledger,
    sectors: &[Sector],
    viewer: Option<&User>,
    query: &HistoryQuery,
    evaluator: &Evaluator,
) -> HistoryGrid {
    let months: Vec<YearMonth> = YearMonth::range_inclusive(query.from, query.to).collect();
    let sectors: HashMap<SectorId, &Sector> = sectors.iter().map(|s| (s.id, s)).collect();

    let mut rows = Vec::new();
    for indicator in ledger.indicators() {
        let Some(sector) = sectors.get(&indicator.sector_id).filter(|s| s.active) else {
            continue;
        };
        if !indicator.active
            || query.sector.is_some_and(|id| id != indicator.sector_id)
            || query.indicator.is_some_and(|id| id != indicator.id)
            || !visible_to(viewer, indicator)
        {
            continue;
        }

        let schedule = Schedule::for_indicator(indicator);
        let by_month = ledger.fills_by_month(indicator.id);

        let cells: Vec<HistoryCell> = months
            .iter()
            .map(|&month| {
                let fill = by_month.get(&month);
                let value = fill.and_then(|f| f.realized());
                let target = ledger.target_for(indicator, month);
                HistoryCell {
                    month,
                    value,
                    target,
                    outcome: evaluator.evaluate(indicator.mode, value, target),
                    due: schedule.is_due(month),
                    filled: fill.is_some(),
                }
            })
            .collect();

        let selected = cells
            .iter()
            .any(|cell| cell.filled && query.status.accepts(cell.outcome));
        if !selected {
            continue;
        }

        rows.push(HistoryRow {
            indicator_id: indicator.id,
            name: indicator.name.clone(),
            sector: sector.name.clone(),
            mode: indicator.mode,
            value_class: indicator.value_class,
            cells,
        });
    }

    tracing::debug!(
        months = months.len(),
        rows = rows.len(),
        status = ?query.status,
        "built history grid"
    );
    HistoryGrid { months, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpiboard_core::{Fill, Indicator, MonthlyTarget, Role, UserId, Visibility};

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    struct Fixture {
        sectors: Vec<Sector>,
        ledger: Ledger,
        sales: Indicator,
        costs: Indicator,
    }

    fn fixture() -> Fixture {
        let ops = Sector::new("Operations");
        let mut closed = Sector::new("Legacy");
        closed.active = false;

        let sales = Indicator::new("Sales", ops.id, 100.0, ComparisonMode::Increasing)
            .with_schedule(ym(2024, 1), 1, None);
        let costs = Indicator::new("Costs", ops.id, 50.0, ComparisonMode::Decreasing)
            .with_schedule(ym(2024, 1), 2, None);
        let legacy = Indicator::new("Legacy", closed.id, 1.0, ComparisonMode::Increasing)
            .with_schedule(ym(2024, 1), 1, None);

        let author = UserId::new();
        let ledger = Ledger::from_parts(
            vec![sales.clone(), costs.clone(), legacy.clone()],
            vec![
                Fill::new(sales.id, ym(2024, 1), Some(120.0), author),
                Fill::new(sales.id, ym(2024, 2), Some(90.0), author),
                Fill::new(costs.id, ym(2024, 1), Some(40.0), author),
                Fill::new(legacy.id, ym(2024, 1), Some(5.0), author),
            ],
            vec![MonthlyTarget::new(sales.id, ym(2024, 3), 130.0)],
        );

        Fixture {
            sectors: vec![ops, closed],
            ledger,
            sales,
            costs,
        }
    }

    #[test]
    fn test_grid_shape() {
        let f = fixture();
        let query = HistoryQuery::window(ym(2024, 1), ym(2024, 3));
        let grid = build_history(&f.ledger, &f.sectors, None, &query, &Evaluator::default());

        assert_eq!(grid.months, vec![ym(2024, 1), ym(2024, 2), ym(2024, 3)]);
        let names: Vec<_> = grid.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Costs", "Sales"]);

        let sales = &grid.rows[1];
        assert_eq!(sales.sector, "Operations");
        assert_eq!(sales.cells[0].outcome, Outcome::Achieved);
        assert_eq!(sales.cells[1].outcome, Outcome::NotAchieved);
        // Missing month still shows its target.
        assert_eq!(sales.cells[2].outcome, Outcome::NoData);
        assert_eq!(sales.cells[2].target, Some(130.0));
        assert!(!sales.cells[2].filled);

        let costs = &grid.rows[0];
        assert!(costs.cells[0].due);
        assert!(!costs.cells[1].due);
    }

    #[test]
    fn test_status_filter_selects_rows() {
        let f = fixture();
        let mut query = HistoryQuery::window(ym(2024, 1), ym(2024, 3));
        query.status = StatusFilter::NotAchieved;
        let grid = build_history(&f.ledger, &f.sectors, None, &query, &Evaluator::default());

        assert_eq!(grid.rows.len(), 1);
        assert_eq!(grid.rows[0].indicator_id, f.sales.id);
        // The row keeps its achieved month too.
        assert_eq!(grid.rows[0].cells[0].outcome, Outcome::Achieved);

        query.status = StatusFilter::Achieved;
        query.from = ym(2024, 2);
        let grid = build_history(&f.ledger, &f.sectors, None, &query, &Evaluator::default());
        assert!(grid.rows.is_empty());
    }

    #[test]
    fn test_indicator_and_viewer_filters() {
        let mut f = fixture();
        let mut query = HistoryQuery::window(ym(2024, 1), ym(2024, 1));
        query.indicator = Some(f.costs.id);
        let grid = build_history(&f.ledger, &f.sectors, None, &query, &Evaluator::default());
        assert_eq!(grid.rows.len(), 1);
        assert_eq!(grid.rows[0].name, "Costs");

        f.ledger
            .insert_indicator(f.sales.clone().with_visibility(Visibility::SectorRestricted));
        let outsider = User::new("Caio", "caio@example.com", Role::Manager);
        let query = HistoryQuery::window(ym(2024, 1), ym(2024, 1));
        let grid = build_history(&f.ledger, &f.sectors, Some(&outsider), &query, &Evaluator::default());
        let names: Vec<_> = grid.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Costs"]);
    }

    #[test]
    fn test_parse_status_filter() {
        assert_eq!("atingidos".parse::<StatusFilter>().unwrap(), StatusFilter::Achieved);
        assert_eq!("nao-atingidos".parse::<StatusFilter>().unwrap(), StatusFilter::NotAchieved);
        assert_eq!("ALL".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert!("maybe".parse::<StatusFilter>().is_err());
    }
}

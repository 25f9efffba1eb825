//! Reporting calendars: which months are due for an indicator.

use kpiboard_core::{Indicator, YearMonth};

/// Normalize a raw step: absent or non-positive means monthly.
pub fn normalize_step(raw: Option<i64>) -> u32 {
    match raw {
        Some(step) if step >= 1 => u32::try_from(step).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// A reporting calendar anchored at a month, advancing `step` months at a
/// time, optionally closed at a final month.
///
/// A month is due iff it is on or after the anchor, on or before the final
/// month (when set), and a whole number of steps from the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    anchor: YearMonth,
    step: u32,
    end: Option<YearMonth>,
}

impl Schedule {
    /// Build a schedule; `step` is normalized with [`normalize_step`].
    pub fn new(anchor: YearMonth, step: i64, end: Option<YearMonth>) -> Self {
        Self {
            anchor,
            step: normalize_step(Some(step)),
            end,
        }
    }

    /// Calendar of an indicator. Without an anchor month the creation month
    /// is used.
    pub fn for_indicator(indicator: &Indicator) -> Self {
        Self::new(
            indicator.effective_anchor(),
            i64::from(indicator.step),
            indicator.end,
        )
    }

    /// Build from `YYYY-MM` strings. `None` if the anchor or a present final
    /// month is malformed.
    pub fn parse(anchor: &str, step: Option<i64>, end: Option<&str>) -> Option<Self> {
        let anchor = YearMonth::parse(anchor)?;
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(YearMonth::parse(s)?),
            None => None,
        };
        Some(Self {
            anchor,
            step: normalize_step(step),
            end,
        })
    }

    /// First due month.
    pub fn anchor(&self) -> YearMonth {
        self.anchor
    }

    /// Months between due periods.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Final month, if closed.
    pub fn end(&self) -> Option<YearMonth> {
        self.end
    }

    /// Whether `candidate` is due.
    pub fn is_due(&self, candidate: YearMonth) -> bool {
        if candidate < self.anchor {
            return false;
        }
        if self.end.is_some_and(|end| candidate > end) {
            return false;
        }
        candidate.months_since(self.anchor) % i64::from(self.step) == 0
    }

    /// Whether `(year, month)` is due. Months outside 1..=12 never are.
    pub fn is_due_at(&self, year: i32, month: u32) -> bool {
        YearMonth::new(year, month).is_some_and(|m| self.is_due(m))
    }

    /// Due months inside the inclusive window, ascending.
    pub fn due_months(&self, from: YearMonth, to: YearMonth) -> Vec<YearMonth> {
        let step = i64::from(self.step);
        let to = match self.end {
            Some(end) if end < to => end,
            _ => to,
        };
        let start = from.max(self.anchor);
        if start > to {
            return Vec::new();
        }

        // Round the window start up to the next whole step from the anchor.
        let offset = start.months_since(self.anchor);
        let first = self.anchor.index() + (offset + step - 1) / step * step;

        (first..=to.index())
            .step_by(self.step as usize)
            .map(YearMonth::from_index)
            .collect()
    }

    /// Every due month from the anchor: through the final month when the
    /// calendar is closed, otherwise through `through`.
    pub fn due_through(&self, through: YearMonth) -> Vec<YearMonth> {
        self.due_months(self.anchor, self.end.unwrap_or(through))
    }

    /// First due month strictly after `after`.
    pub fn next_due(&self, after: YearMonth) -> Option<YearMonth> {
        let candidate = if after < self.anchor {
            self.anchor
        } else {
            let step = i64::from(self.step);
            let offset = after.months_since(self.anchor);
            self.anchor.add_months((offset / step + 1) * step)
        };
        match self.end {
            Some(end) if candidate > end => None,
            // Saturated at the last representable month.
            _ if candidate <= after || !self.is_due(candidate) => None,
            _ => Some(candidate),
        }
    }
}

/// Whether `(year, month)` is due for a calendar given as `YYYY-MM` strings.
///
/// Malformed months resolve to "not due".
pub fn is_due(anchor: &str, step: Option<i64>, end: Option<&str>, year: i32, month: u32) -> bool {
    Schedule::parse(anchor, step, end).is_some_and(|s| s.is_due_at(year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpiboard_core::{ComparisonMode, SectorId};

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn test_quarterly_from_january() {
        let s = Schedule::new(ym(2024, 1), 3, None);
        let due = s.due_months(ym(2024, 1), ym(2025, 1));
        assert_eq!(due, vec![ym(2024, 1), ym(2024, 4), ym(2024, 7), ym(2024, 10), ym(2025, 1)]);
        assert!(!s.is_due(ym(2024, 2)));
        assert!(!s.is_due(ym(2023, 10)));
    }

    #[test]
    fn test_step_defaults_to_monthly() {
        assert_eq!(normalize_step(None), 1);
        assert_eq!(normalize_step(Some(0)), 1);
        assert_eq!(normalize_step(Some(-4)), 1);
        assert_eq!(normalize_step(Some(6)), 6);

        let s = Schedule::new(ym(2024, 5), 0, None);
        assert_eq!(s.step(), 1);
        assert!(s.is_due(ym(2024, 6)));
    }

    #[test]
    fn test_final_month_closes_calendar() {
        let s = Schedule::new(ym(2024, 1), 2, Some(ym(2024, 7)));
        assert!(s.is_due(ym(2024, 7)));
        assert!(!s.is_due(ym(2024, 9)));
        assert_eq!(s.due_months(ym(2024, 1), ym(2025, 12)).last(), Some(&ym(2024, 7)));
        assert_eq!(s.next_due(ym(2024, 7)), None);
    }

    #[test]
    fn test_due_months_matches_brute_force() {
        let anchors = [ym(2023, 11), ym(2024, 1), ym(2024, 6)];
        let windows = [(ym(2023, 1), ym(2026, 12)), (ym(2024, 2), ym(2024, 3)), (ym(2024, 8), ym(2025, 9))];
        for anchor in anchors {
            for step in 1..=13 {
                let s = Schedule::new(anchor, step, None);
                for (from, to) in windows {
                    let expected: Vec<_> = YearMonth::range_inclusive(from, to)
                        .filter(|m| {
                            let d = m.months_since(anchor);
                            d >= 0 && d % step == 0
                        })
                        .collect();
                    assert_eq!(s.due_months(from, to), expected, "anchor {anchor} step {step}");
                    for m in YearMonth::range_inclusive(from, to) {
                        assert_eq!(s.is_due(m), expected.contains(&m));
                    }
                }
            }
        }
    }

    #[test]
    fn test_due_through() {
        let open = Schedule::new(ym(2024, 1), 4, None);
        assert_eq!(open.due_through(ym(2024, 10)), vec![ym(2024, 1), ym(2024, 5), ym(2024, 9)]);

        let closed = Schedule::new(ym(2024, 1), 4, Some(ym(2025, 1)));
        assert_eq!(closed.due_through(ym(2024, 2)).len(), 4);
    }

    #[test]
    fn test_next_due() {
        let s = Schedule::new(ym(2024, 1), 3, None);
        assert_eq!(s.next_due(ym(2023, 6)), Some(ym(2024, 1)));
        assert_eq!(s.next_due(ym(2024, 1)), Some(ym(2024, 4)));
        assert_eq!(s.next_due(ym(2024, 2)), Some(ym(2024, 4)));
        assert_eq!(s.next_due(ym(2024, 12)), Some(ym(2025, 1)));
    }

    #[test]
    fn test_next_due_at_last_representable_year() {
        let monthly = Schedule::new(ym(i32::MAX, 1), 1, None);
        assert_eq!(monthly.next_due(ym(i32::MAX, 11)), Some(YearMonth::MAX));
        assert_eq!(monthly.next_due(YearMonth::MAX), None);

        let quarterly = Schedule::new(ym(i32::MAX, 1), 3, None);
        assert_eq!(quarterly.next_due(ym(i32::MAX, 10)), None);
    }

    #[test]
    fn test_string_calendar_never_panics() {
        assert!(is_due("2024-01", Some(3), None, 2024, 4));
        assert!(!is_due("2024-01", Some(3), None, 2024, 2));
        assert!(!is_due("2024-01", Some(3), None, 2024, 13));
        assert!(!is_due("garbage", Some(1), None, 2024, 4));
        assert!(!is_due("2024-01", Some(1), Some("2024-99"), 2024, 4));
        assert!(is_due("2024-01-15", None, Some(""), 2024, 4));
    }

    #[test]
    fn test_indicator_without_anchor_uses_creation_month() {
        let mut ind = Indicator::new("Visits", SectorId::new(), 10.0, ComparisonMode::Increasing);
        ind.created_at = "2024-03-20T10:00:00Z".parse().unwrap();
        ind.step = 2;
        let s = Schedule::for_indicator(&ind);
        assert_eq!(s.anchor(), ym(2024, 3));
        assert!(s.is_due(ym(2024, 5)));
        assert!(!s.is_due(ym(2024, 4)));
    }
}

//! Evaluator: achievement and formatting bound to one configuration.

use kpiboard_core::{ComparisonMode, EvaluationConfig, ValueClass};

use crate::achievement::{self, Outcome};
use crate::format;

/// Applies an [`EvaluationConfig`] to achievement checks and display.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluationConfig,
}

impl Evaluator {
    /// Create an evaluator.
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluate with the configured tolerance band.
    pub fn evaluate(&self, mode: ComparisonMode, realized: Option<f64>, target: Option<f64>) -> Outcome {
        achievement::evaluate(mode, realized, target, self.config.tolerance)
    }

    /// Deviation from target in percent.
    pub fn variance(&self, realized: Option<f64>, target: Option<f64>) -> Option<f64> {
        achievement::variance_percent(realized, target)
    }

    /// Format a raw number string.
    pub fn format_value(&self, raw: &str, class: ValueClass) -> String {
        format::format_value(raw, class, &self.config.format)
    }

    /// Format a number.
    pub fn format_amount(&self, value: Option<f64>, class: ValueClass) -> String {
        format::format_amount(value, class, &self.config.format)
    }

    /// Format a variance as a signed percentage, e.g. `+12,50%`.
    pub fn format_variance(&self, variance: Option<f64>) -> String {
        match variance.filter(|v| v.is_finite()) {
            Some(v) if v > 0.0 => format!("+{}", self.format_amount(Some(v), ValueClass::Percentage)),
            Some(v) => self.format_amount(Some(v), ValueClass::Percentage),
            None => self.config.format.placeholder.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_tolerance() {
        let narrow = Evaluator::new(EvaluationConfig {
            tolerance: 1.0,
            ..Default::default()
        });
        assert_eq!(
            narrow.evaluate(ComparisonMode::Monitoring, Some(53.0), Some(50.0)),
            Outcome::Monitoring { within_tolerance: false }
        );
        assert_eq!(
            Evaluator::default().evaluate(ComparisonMode::Monitoring, Some(53.0), Some(50.0)),
            Outcome::Monitoring { within_tolerance: true }
        );
    }

    #[test]
    fn test_format_variance() {
        let ev = Evaluator::default();
        assert_eq!(ev.format_variance(Some(12.5)), "+12,50%");
        assert_eq!(ev.format_variance(Some(-3.0)), "-3,00%");
        assert_eq!(ev.format_variance(None), "—");
    }
}

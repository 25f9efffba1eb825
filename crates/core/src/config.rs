//! Evaluation and display settings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use crate::error::ConfigError;

/// Settings handed to the evaluator and formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Half-width of the monitoring tolerance band
    pub tolerance: f64,

    /// Number display settings
    pub format: FormatConfig,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            tolerance: 5.0,
            format: FormatConfig::default(),
        }
    }
}

impl EvaluationConfig {
    /// Load from a JSON file. A missing file yields the defaults; fields
    /// absent from the file keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(json) => {
                let config: Self = serde_json::from_str(&json)?;
                config.validate()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        self.format.validate()
    }
}

/// Currency prefixes recognized when reading numbers back.
pub const CURRENCY_SYMBOLS: &[&str] = &["R$", "US$", "$", "€", "£", "¥"];

/// Number display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Digits after the decimal separator
    pub decimal_places: usize,

    /// Prefix for monetary values
    pub currency_symbol: String,

    /// Digit grouping separator
    pub thousands_separator: char,

    /// Decimal separator
    pub decimal_separator: char,

    /// Shown for missing or non-numeric values
    pub placeholder: String,
}

impl FormatConfig {
    /// Formatted numbers must read back as the same value: the decimal
    /// separator is `.` or `,`, grouping uses the other one or whitespace,
    /// and the currency symbol is one the parser strips.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.decimal_separator, '.' | ',') {
            return Err(ConfigError::Invalid(format!(
                "decimal separator must be '.' or ',', got {:?}",
                self.decimal_separator
            )));
        }
        let grouping_ok = self.thousands_separator != self.decimal_separator
            && (matches!(self.thousands_separator, '.' | ',')
                || self.thousands_separator.is_whitespace());
        if !grouping_ok {
            return Err(ConfigError::Invalid(format!(
                "thousands separator {:?} conflicts with decimal separator {:?}",
                self.thousands_separator, self.decimal_separator
            )));
        }
        if !CURRENCY_SYMBOLS.contains(&self.currency_symbol.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unsupported currency symbol {:?}",
                self.currency_symbol
            )));
        }
        Ok(())
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            currency_symbol: "R$".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
            placeholder: "—".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EvaluationConfig::load(dir.path().join("config.json")).unwrap();
        assert_eq!(cfg, EvaluationConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"tolerance": 2.5, "format": {"currency_symbol": "$"}}"#).unwrap();

        let cfg = EvaluationConfig::load(&path).unwrap();
        assert_eq!(cfg.tolerance, 2.5);
        assert_eq!(cfg.format.currency_symbol, "$");
        assert_eq!(cfg.format.decimal_places, 2);
        assert_eq!(cfg.format.decimal_separator, ',');
    }

    #[test]
    fn test_conflicting_separators_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"format": {"thousands_separator": ",", "decimal_separator": ","}}"#,
        )
        .unwrap();
        assert!(matches!(EvaluationConfig::load(&path), Err(ConfigError::Invalid(_))));

        let odd_decimal = FormatConfig { decimal_separator: ';', ..Default::default() };
        assert!(odd_decimal.validate().is_err());

        let spaced = FormatConfig { thousands_separator: ' ', ..Default::default() };
        assert!(spaced.validate().is_ok());
    }

    #[test]
    fn test_unknown_currency_and_bad_tolerance_rejected() {
        let brl = FormatConfig { currency_symbol: "BRL".to_string(), ..Default::default() };
        assert!(matches!(brl.validate(), Err(ConfigError::Invalid(_))));

        let negative = EvaluationConfig { tolerance: -1.0, ..Default::default() };
        assert!(negative.validate().is_err());
        assert!(EvaluationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(EvaluationConfig::load(&path), Err(ConfigError::Json(_))));
    }
}

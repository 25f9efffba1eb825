//! Validation and configuration errors.

/// A record failed validation on entry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Month string is not `YYYY-MM` or `YYYY-MM-DD`
    #[error("invalid month: {0:?} (expected YYYY-MM)")]
    InvalidMonth(String),

    /// Month number outside 1..=12
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),

    /// Year outside the accepted range
    #[error("year {0} is outside 1900..=2100")]
    YearOutOfRange(i32),

    /// Value is not a number
    #[error("{field} must be numeric, got {value:?}")]
    NotNumeric {
        /// Field being validated
        field: String,
        /// Offending input
        value: String,
    },

    /// Unknown enumeration value
    #[error("unknown {kind}: {value:?}")]
    UnknownVariant {
        /// What was being parsed
        kind: &'static str,
        /// Offending input
        value: String,
    },

    /// Final month precedes the anchor month
    #[error("final month {end} is before anchor month {anchor}")]
    EndBeforeAnchor {
        /// Anchor month
        anchor: String,
        /// Final month
        end: String,
    },
}

/// Loading configuration failed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings that cannot work together
    #[error("invalid config: {0}")]
    Invalid(String),
}

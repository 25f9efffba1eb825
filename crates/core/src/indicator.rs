//! Indicator model - a tracked KPI definition.

use serde::{Deserialize, Serialize};
use crate::error::ValidationError;
use crate::id::{IndicatorId, SectorId};
use crate::month::YearMonth;
use crate::Time;

/// An indicator is a KPI a sector reports on a monthly calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// Unique identifier
    pub id: IndicatorId,

    /// Display name
    pub name: String,

    /// Owning sector
    pub sector_id: SectorId,

    /// Default target value
    pub target: f64,

    /// How realized values are compared against the target
    pub mode: ComparisonMode,

    /// How values are displayed
    #[serde(default)]
    pub value_class: ValueClass,

    /// Months between due reporting periods
    #[serde(default = "default_step")]
    pub step: u32,

    /// First reportable month
    #[serde(default)]
    pub anchor: Option<YearMonth>,

    /// Last reportable month, if the indicator is closed
    #[serde(default)]
    pub end: Option<YearMonth>,

    /// Whether the indicator is active
    #[serde(default = "default_true")]
    pub active: bool,

    /// Who may see the indicator
    #[serde(default)]
    pub visibility: Visibility,

    /// Instructions on how to extract the value
    #[serde(default)]
    pub extraction_notes: String,

    /// When created
    pub created_at: Time,
}

fn default_step() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Indicator {
    /// Create a monthly, active, all-sectors indicator.
    pub fn new(
        name: impl Into<String>,
        sector_id: SectorId,
        target: f64,
        mode: ComparisonMode,
    ) -> Self {
        Self {
            id: IndicatorId::new(),
            name: name.into(),
            sector_id,
            target,
            mode,
            value_class: ValueClass::default(),
            step: 1,
            anchor: None,
            end: None,
            active: true,
            visibility: Visibility::default(),
            extraction_notes: String::new(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Set the value class.
    pub fn with_value_class(mut self, value_class: ValueClass) -> Self {
        self.value_class = value_class;
        self
    }

    /// Set the reporting calendar.
    pub fn with_schedule(mut self, anchor: YearMonth, step: u32, end: Option<YearMonth>) -> Self {
        self.anchor = Some(anchor);
        self.step = step;
        self.end = end;
        self
    }

    /// Set visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Anchor month, falling back to the creation month.
    pub fn effective_anchor(&self) -> YearMonth {
        self.anchor.unwrap_or_else(|| YearMonth::of(&self.created_at))
    }

    /// Check the calendar is coherent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let (Some(anchor), Some(end)) = (self.anchor, self.end) {
            if end < anchor {
                return Err(ValidationError::EndBeforeAnchor {
                    anchor: anchor.to_string(),
                    end: end.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Comparison mode between realized value and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// Higher is better: achieved when realized >= target
    #[serde(alias = "crescente")]
    Increasing,
    /// Lower is better: achieved when realized <= target
    #[serde(alias = "decrescente")]
    Decreasing,
    /// Informational only
    #[serde(alias = "monitoramento")]
    Monitoring,
}

impl ComparisonMode {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMode::Increasing => "increasing",
            ComparisonMode::Decreasing => "decreasing",
            ComparisonMode::Monitoring => "monitoring",
        }
    }
}

impl std::fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComparisonMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "increasing" | "up" | "crescente" => Ok(ComparisonMode::Increasing),
            "decreasing" | "down" | "decrescente" => Ok(ComparisonMode::Decreasing),
            "monitoring" | "monitoramento" => Ok(ComparisonMode::Monitoring),
            _ => Err(ValidationError::UnknownVariant {
                kind: "comparison mode",
                value: s.to_string(),
            }),
        }
    }
}

/// How a value is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueClass {
    /// Plain grouped decimal
    #[default]
    #[serde(alias = "numeral")]
    Numeric,
    /// Currency
    #[serde(alias = "monetario")]
    Monetary,
    /// Percentage
    #[serde(alias = "percentual")]
    Percentage,
}

impl ValueClass {
    /// Lenient resolution: unknown names fall back to `Numeric`.
    pub fn resolve(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "monetary" | "monetario" | "monetário" | "currency" | "money" => ValueClass::Monetary,
            "percentage" | "percentual" | "percent" | "%" => ValueClass::Percentage,
            _ => ValueClass::Numeric,
        }
    }

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueClass::Numeric => "numeric",
            ValueClass::Monetary => "monetary",
            ValueClass::Percentage => "percentage",
        }
    }
}

/// Indicator visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Every sector can see it
    #[default]
    AllSectors,
    /// Only the owning sector (and explicit grants)
    SectorRestricted,
}

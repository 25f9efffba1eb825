//! Indicator board core data models.
//!
//! This crate defines the records every other crate passes around:
//! indicators, monthly fills, target overrides, sectors, users and the
//! audit trail, plus the month arithmetic type they share.

#![warn(missing_docs)]

// Core identities
mod id;

// Calendar
mod month;

// Indicators and their data
mod indicator;
mod fill;
mod target;

// Organization
mod sector;
mod user;
mod audit;

// Settings and validation
mod config;
mod error;

// Re-exports
pub use id::*;

pub use month::YearMonth;

// Indicator & data
pub use indicator::{Indicator, ComparisonMode, ValueClass, Visibility};
pub use fill::{Fill, FillFilter};
pub use target::MonthlyTarget;

// Organization
pub use sector::Sector;
pub use user::{User, Role};
pub use audit::AuditEntry;

// Settings
pub use config::{EvaluationConfig, FormatConfig, CURRENCY_SYMBOLS};
pub use error::{ValidationError, ConfigError};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

//! Storage trait abstraction.

use async_trait::async_trait;
use kpiboard_core::{
    AuditEntry, Fill, FillFilter, Indicator, IndicatorId, MonthlyTarget, Sector, SectorId, User,
    UserId, YearMonth,
};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage abstraction for board data.
///
/// This trait allows different storage backends to be plugged in.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Indicator operations ===

    /// Save an indicator (create or update).
    async fn save_indicator(&mut self, indicator: &Indicator) -> Result<()>;

    /// Load an indicator by ID.
    async fn load_indicator(&self, id: IndicatorId) -> Result<Option<Indicator>>;

    /// List all indicators, ordered by name.
    async fn list_indicators(&self) -> Result<Vec<Indicator>>;

    /// Delete an indicator together with its fills and target overrides.
    async fn delete_indicator(&mut self, id: IndicatorId) -> Result<()>;

    // === Fill operations ===

    /// Save a fill.
    async fn save_fill(&mut self, fill: &Fill) -> Result<()>;

    /// List fills matching the filter, ordered by entry time.
    async fn list_fills(&self, filter: &FillFilter) -> Result<Vec<Fill>>;

    // === Target override operations ===

    /// Save a monthly target override, replacing any for the same month.
    async fn save_target(&mut self, target: &MonthlyTarget) -> Result<()>;

    /// List overrides, optionally for a single indicator, ordered by month.
    async fn list_targets(&self, indicator: Option<IndicatorId>) -> Result<Vec<MonthlyTarget>>;

    /// Delete the override of one indicator and month.
    async fn delete_target(&mut self, indicator: IndicatorId, month: YearMonth) -> Result<()>;

    // === Sector operations ===

    /// Save a sector.
    async fn save_sector(&mut self, sector: &Sector) -> Result<()>;

    /// Load a sector by ID.
    async fn load_sector(&self, id: SectorId) -> Result<Option<Sector>>;

    /// List all sectors, ordered by name.
    async fn list_sectors(&self) -> Result<Vec<Sector>>;

    // === User operations ===

    /// Save a user.
    async fn save_user(&mut self, user: &User) -> Result<()>;

    /// Load a user by ID.
    async fn load_user(&self, id: UserId) -> Result<Option<User>>;

    /// List all users.
    async fn list_users(&self) -> Result<Vec<User>>;

    // === Audit trail ===

    /// Append an audit entry.
    async fn append_audit(&mut self, entry: &AuditEntry) -> Result<()>;

    /// List audit entries, oldest first.
    async fn list_audit(&self) -> Result<Vec<AuditEntry>>;
}

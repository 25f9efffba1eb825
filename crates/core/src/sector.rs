//! Sector model - the organizational unit that owns indicators.

use serde::{Deserialize, Serialize};
use crate::id::SectorId;

/// A sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    /// Unique identifier
    pub id: SectorId,

    /// Sector name
    pub name: String,

    /// Inactive sectors are left out of reports
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Sector {
    /// Create an active sector.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SectorId::new(),
            name: name.into(),
            active: true,
        }
    }
}

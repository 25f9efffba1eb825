//! Audit entries - who did what, and when.

use crate::id::AuditEntryId;
use crate::Time;
use serde::{Deserialize, Serialize};

/// An action recorded in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier
    pub id: AuditEntryId,

    /// When it happened
    pub timestamp: Time,

    /// Who performed the action
    pub actor: String,

    /// What was done
    pub action: String,
}

impl AuditEntry {
    /// Record an action happening now.
    pub fn new(actor: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: AuditEntryId::new(),
            timestamp: chrono::Utc::now(),
            actor: actor.into(),
            action: action.into(),
        }
    }

    /// Action performed by the system itself.
    pub fn system(action: impl Into<String>) -> Self {
        Self::new("system", action)
    }
}

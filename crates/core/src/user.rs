//! User model and roles.

use serde::{Deserialize, Serialize};
use crate::error::ValidationError;
use crate::id::{IndicatorId, SectorId, UserId};

/// A board user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Login e-mail
    pub email: String,

    /// Role
    pub role: Role,

    /// Sectors the user manages
    #[serde(default)]
    pub sectors: Vec<SectorId>,

    /// Indicators granted to the user individually
    #[serde(default)]
    pub granted: Vec<IndicatorId>,
}

impl User {
    /// Create a user with no sectors.
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            role,
            sectors: Vec::new(),
            granted: Vec::new(),
        }
    }

    /// Add a managed sector.
    pub fn with_sector(mut self, sector: SectorId) -> Self {
        self.sectors.push(sector);
        self
    }

    /// Name to show as the author of a fill.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access
    Master,
    /// Sector manager
    #[serde(alias = "gestor")]
    Manager,
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "master" => Ok(Role::Master),
            "manager" | "gestor" => Ok(Role::Manager),
            _ => Err(ValidationError::UnknownVariant {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Represents a work area (e.g., "Producción", "Almacén").
///
/// Areas are compared by name. Surrounding whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Area {
    name: String,
}

impl Area {
    /// Creates a new `Area`.
    ///
    /// # Arguments
    ///
    /// * `name` - The area name (surrounding whitespace is trimmed)
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
        }
    }

    /// Returns the area name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Joins areas into a comma-separated display string.
    #[must_use]
    pub fn join_list(areas: &[Self]) -> String {
        areas
            .iter()
            .map(Self::name)
            .collect::<Vec<&str>>()
            .join(", ")
    }
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Roles a system user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// System administrator.
    #[serde(rename = "admin")]
    Admin,
    /// Occupational safety and health officer.
    #[serde(rename = "sst")]
    SafetyOfficer,
    /// Area supervisor.
    #[serde(rename = "supervisor")]
    Supervisor,
    /// Plant or company manager.
    #[serde(rename = "gerente")]
    Manager,
    /// Regular worker.
    #[serde(rename = "trabajador")]
    Worker,
}

impl Role {
    /// Returns the persisted string representation of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SafetyOfficer => "sst",
            Self::Supervisor => "supervisor",
            Self::Manager => "gerente",
            Self::Worker => "trabajador",
        }
    }

    /// Returns whether this role may view any attendee's data.
    #[must_use]
    pub const fn is_supervisor(&self) -> bool {
        !matches!(self, Self::Worker)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "sst" => Ok(Self::SafetyOfficer),
            "supervisor" => Ok(Self::Supervisor),
            "gerente" => Ok(Self::Manager),
            "trabajador" => Ok(Self::Worker),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A snapshot of a system user as seen by the domain rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// The user's identifier.
    pub user_id: i64,
    /// The user's full name.
    pub full_name: String,
    /// The user's area, if assigned.
    pub area: Option<Area>,
    /// The user's role.
    pub role: Role,
    /// Whether the user account is active.
    pub is_active: bool,
}

impl Worker {
    /// Creates a new worker snapshot.
    #[must_use]
    pub const fn new(
        user_id: i64,
        full_name: String,
        area: Option<Area>,
        role: Role,
        is_active: bool,
    ) -> Self {
        Self {
            user_id,
            full_name,
            area,
            role,
            is_active,
        }
    }
}

/// The identity on whose behalf a domain operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    /// The caller's user id.
    pub user_id: i64,
    /// The caller's role.
    pub role: Role,
}

impl Viewer {
    /// Creates a new viewer.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }
}

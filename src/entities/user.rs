//! User entity - enforcers and admins.
//!
//! Consulted read-only by the engine for enrichment and rollups; never
//! mutated here. Account management lives with the excluded admin layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Field enforcer issuing violations.
    #[default]
    Enforcer,
    /// Admin-console operator.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enforcer => "enforcer",
            Self::Admin => "admin",
        })
    }
}

/// User record as stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    /// Store-assigned identifier.
    pub id: String,
    /// Display name.
    pub full_name: String,
    /// Badge number shown on reports.
    pub badge_number: String,
    /// Account role.
    pub role: Role,
    /// Inactive accounts are excluded from rollups; missing means active.
    pub is_active: bool,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: String::new(),
            full_name: String::new(),
            badge_number: String::new(),
            role: Role::default(),
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_is_active_defaults_to_active() {
        let user: User = serde_json::from_value(json!({
            "id": "u-1",
            "fullName": "Maria Santos",
            "badgeNumber": "E-104",
            "role": "enforcer"
        }))
        .unwrap();
        assert!(user.is_active);
        assert_eq!(user.role, Role::Enforcer);
    }
}

//! # Identity and Roles
//!
//! The authenticated principal behind a connection or request.
//!
//! Privilege is an explicit [`Role`] value rather than a loose "is staff"
//! flag, so endpoints can check [`Role::can_attend`] before calling into the
//! session coordinator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Shipper or recipient using the support widget
    Customer,
    /// Courier account, no support privileges
    Courier,
    /// Customer-care agent
    Agent,
    /// Administrator, may attend chats like an agent
    Admin,
}

impl Role {
    /// Whether this role may join, answer and monitor support chats.
    pub fn can_attend(self) -> bool {
        matches!(self, Role::Agent | Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Courier => "courier",
            Role::Agent => "agent",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "courier" => Ok(Role::Courier),
            "agent" => Ok(Role::Agent),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: i64, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    /// Shorthand for `self.role.can_attend()`.
    pub fn can_attend(&self) -> bool {
        self.role.can_attend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_agents_and_admins_attend() {
        assert!(Role::Agent.can_attend());
        assert!(Role::Admin.can_attend());
        assert!(!Role::Customer.can_attend());
        assert!(!Role::Courier.can_attend());
    }

    #[test]
    fn test_role_round_trips_through_strings() {
        for role in [Role::Customer, Role::Courier, Role::Agent, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(Role::try_from(" AGENT ".to_string()).unwrap(), Role::Agent);
        assert!("staff".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_snake_case() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
    }
}

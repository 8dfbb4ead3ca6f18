//! # Actor Context
//!
//! The identity and permission class of whoever invokes a lifecycle
//! operation. Passed explicitly to every eligibility predicate and mutating
//! call so the lifecycle logic stays pure and testable.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identity::UserId;

/// Permission class of a marketplace user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Owns contracts: drafts, submits and completes them.
    Client,
    /// Counter-party: signs, rejects or proposes changes.
    Freelancer,
    /// Back-office operator with status override and delete rights.
    Admin,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "CLIENT",
            Self::Freelancer => "FREELANCER",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    /// Case-insensitive, matching the store's role handling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLIENT" => Ok(Self::Client),
            "FREELANCER" => Ok(Self::Freelancer),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(CoreError::UnknownRole(s.to_string())),
        }
    }
}

/// Who is performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorContext {
    /// The acting user.
    pub id: UserId,
    /// The acting user's role.
    pub role: Role,
}

impl ActorContext {
    /// Build an actor context.
    pub fn new(id: impl Into<UserId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Shorthand for a client actor.
    pub fn client(id: impl Into<UserId>) -> Self {
        Self::new(id, Role::Client)
    }

    /// Shorthand for a freelancer actor.
    pub fn freelancer(id: impl Into<UserId>) -> Self {
        Self::new(id, Role::Freelancer)
    }

    /// Shorthand for an admin actor.
    pub fn admin(id: impl Into<UserId>) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn is_client(&self) -> bool {
        self.role == Role::Client
    }

    pub fn is_freelancer(&self) -> bool {
        self.role == Role::Freelancer
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl std::fmt::Display for ActorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.role, self.id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("client".parse::<Role>().unwrap(), Role::Client);
        assert_eq!("Freelancer".parse::<Role>().unwrap(), Role::Freelancer);
        assert_eq!(" ADMIN ".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Freelancer).unwrap(), "\"FREELANCER\"");
    }

    #[test]
    fn actor_shorthands() {
        let a = ActorContext::client(1);
        assert!(a.is_client());
        assert!(!a.is_freelancer());
        assert_eq!(a.to_string(), "CLIENT(1)");
        assert!(ActorContext::admin(9).is_admin());
    }
}

//! # Identifier Newtypes
//!
//! The Contract Store assigns numeric identifiers to contracts, conflicts
//! and users. Each namespace gets its own newtype so that a `UserId` can
//! never be handed to an operation expecting a `ContractId`.
//!
//! All identifiers serialize transparently as JSON numbers, matching the
//! store's wire format.

use serde::{Deserialize, Serialize};

/// Identifier of a contract, assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub u64);

/// Identifier of a conflict (dispute) record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConflictId(pub u64);

/// Identifier of a marketplace user (client, freelancer or admin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl ContractId {
    /// Access the raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl ConflictId {
    /// Access the raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl UserId {
    /// Access the raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Whether this id refers to a resolved user.
    ///
    /// The store and the web forms use `0` as the "not yet looked up"
    /// placeholder for a party.
    pub fn is_resolved(self) -> bool {
        self.0 > 0
    }
}

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "contract:{}", self.0)
    }
}

impl std::fmt::Display for ConflictId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conflict:{}", self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

impl From<u64> for ContractId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u64> for ConflictId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

//! Partition of a contract's conflicts by the party that raised them.
//!
//! Every conflict lands in exactly one bucket. A conflict whose `raisedById`
//! matches neither party, or is missing, is an attribution inconsistency and
//! is never guessed into a party bucket.

use sfl_core::UserId;
use sfl_state::{Contract, Party};

use crate::conflict::{ConflictStatus, ContractConflict};

/// A conflict that cannot be attributed to either party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionInconsistency {
    pub conflict: ContractConflict,
    pub raised_by: Option<UserId>,
}

impl std::fmt::Display for AttributionInconsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.raised_by {
            Some(user) => write!(f, "{} raised by non-party {user}", self.conflict.id),
            None => write!(f, "{} has no raisedById", self.conflict.id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictGroups {
    pub by_client: Vec<ContractConflict>,
    pub by_freelancer: Vec<ContractConflict>,
    pub inconsistencies: Vec<AttributionInconsistency>,
}

impl ConflictGroups {
    pub fn raised_by(&self, party: Party) -> &[ContractConflict] {
        match party {
            Party::Client => &self.by_client,
            Party::Freelancer => &self.by_freelancer,
        }
    }

    pub fn len(&self) -> usize {
        self.by_client.len() + self.by_freelancer.len() + self.inconsistencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_consistent(&self) -> bool {
        self.inconsistencies.is_empty()
    }

    /// Attributed conflicts not yet resolved.
    pub fn unresolved(&self) -> usize {
        self.by_client
            .iter()
            .chain(&self.by_freelancer)
            .filter(|c| c.status != ConflictStatus::Resolved)
            .count()
    }
}

/// Partition `conflicts` by `raisedById` against the contract's parties.
///
/// Order within each bucket follows the input order.
pub fn group_conflicts(contract: &Contract, conflicts: Vec<ContractConflict>) -> ConflictGroups {
    let mut groups = ConflictGroups::default();
    for conflict in conflicts {
        let raised_by = conflict.raised_by_id;
        match raised_by.and_then(|user| contract.party_for_user(user)) {
            Some(Party::Client) => groups.by_client.push(conflict),
            Some(Party::Freelancer) => groups.by_freelancer.push(conflict),
            None => groups
                .inconsistencies
                .push(AttributionInconsistency { conflict, raised_by }),
        }
    }
    groups
}

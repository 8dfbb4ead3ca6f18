//! Status filters and counts for contract list views.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sfl_core::ActorContext;

use crate::contract::{Contract, ContractStatus};

/// Which contracts a list view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ContractStatus),
}

impl StatusFilter {
    pub fn matches(&self, contract: &Contract) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => contract.status == *status,
        }
    }

    /// Keep the contracts matching this filter, preserving order.
    pub fn apply<'a>(&self, contracts: &'a [Contract]) -> Vec<&'a Contract> {
        contracts.iter().filter(|c| self.matches(c)).collect()
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Only(status) => write!(f, "{status}"),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// `filter(contracts, filter)`.
pub fn filter<'a>(contracts: &'a [Contract], filter: StatusFilter) -> Vec<&'a Contract> {
    filter.apply(contracts)
}

/// Per-status counts plus total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    by_status: BTreeMap<String, usize>,
    total: usize,
}

impl StatusCounts {
    pub fn tally<'a>(contracts: impl IntoIterator<Item = &'a Contract>) -> Self {
        let mut counts = Self::default();
        for contract in contracts {
            *counts
                .by_status
                .entry(contract.status.as_str().to_string())
                .or_default() += 1;
            counts.total += 1;
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn of(&self, status: ContractStatus) -> usize {
        self.by_status.get(status.as_str()).copied().unwrap_or(0)
    }

    /// Number of contracts a filter would show.
    pub fn count(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.total,
            StatusFilter::Only(status) => self.of(status),
        }
    }
}

/// Which list a given actor is entitled to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    ByClient(sfl_core::UserId),
    ByFreelancer(sfl_core::UserId),
}

impl ListScope {
    /// Clients list by `clientId`, freelancers by `freelancerId`, admins list
    /// everything.
    pub fn for_actor(actor: &ActorContext) -> Self {
        match actor.role {
            sfl_core::Role::Client => Self::ByClient(actor.id),
            sfl_core::Role::Freelancer => Self::ByFreelancer(actor.id),
            sfl_core::Role::Admin => Self::All,
        }
    }

    pub fn includes(&self, contract: &Contract) -> bool {
        match self {
            Self::All => true,
            Self::ByClient(id) => contract.client_id == *id,
            Self::ByFreelancer(id) => contract.freelancer_id == *id,
        }
    }
}

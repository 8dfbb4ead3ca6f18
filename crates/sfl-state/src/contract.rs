//! # Contract Data Model
//!
//! The contract as the Contract Store exchanges it (camelCase JSON), the
//! creation payload, the partial-update payload, and the status enum.
//!
//! ## Invariants
//!
//! - `ACTIVE` implies both signature slots are filled.
//! - `COMPLETED` is only reachable from `ACTIVE`.
//!
//! The first is checkable on any snapshot via [`Contract::check_invariants`];
//! the second is enforced by the transition rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sfl_core::{ActorContext, Amount, ContractId, Role, Timestamp, UserId};

// ─── Status ──────────────────────────────────────────────────────────

/// The lifecycle status of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    /// Being drafted by the client. Initial state.
    #[default]
    Draft,
    /// Sent to the freelancer; collecting signatures.
    PendingSignature,
    /// Both parties signed.
    Active,
    /// At least one party reported a dispute.
    InConflict,
    /// Work delivered and accepted (terminal).
    Completed,
    /// Cancelled by an administrator (terminal).
    Cancelled,
}

impl ContractStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [ContractStatus; 6] = [
        Self::Draft,
        Self::PendingSignature,
        Self::Active,
        Self::InConflict,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Wire name (`PENDING_SIGNATURE`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::PendingSignature => "PENDING_SIGNATURE",
            Self::Active => "ACTIVE",
            Self::InConflict => "IN_CONFLICT",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable label (`Pending Signature`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::PendingSignature => "Pending Signature",
            Self::Active => "Active",
            Self::InConflict => "In Conflict",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("unknown contract status {s:?}"))
    }
}

// ─── Party ───────────────────────────────────────────────────────────

/// One of the two signatories of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Party {
    Client,
    Freelancer,
}

impl Party {
    /// The party a role signs as, if any. Admins are never a party.
    pub fn from_role(role: Role) -> Option<Party> {
        match role {
            Role::Client => Some(Party::Client),
            Role::Freelancer => Some(Party::Freelancer),
            Role::Admin => None,
        }
    }

    /// The other signatory.
    pub fn counterpart(&self) -> Party {
        match self {
            Party::Client => Party::Freelancer,
            Party::Freelancer => Party::Client,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Party::Client => "CLIENT",
            Party::Freelancer => "FREELANCER",
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Contract ────────────────────────────────────────────────────────

/// A contract as persisted by the Contract Store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: ContractId,
    pub client_id: UserId,
    pub freelancer_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_application_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_application_id: Option<u64>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub terms: String,
    pub amount: Amount,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: ContractStatus,
    /// Client signature image as a data URL. `None` until the client signs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_signature_url: Option<String>,
    /// Freelancer signature image as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freelancer_signature_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Contract {
    /// Materialize a draft into a stored contract in `DRAFT`.
    pub fn from_draft(id: ContractId, draft: ContractDraft, created_at: Timestamp) -> Self {
        Self {
            id,
            client_id: draft.client_id,
            freelancer_id: draft.freelancer_id,
            project_application_id: draft.project_application_id,
            offer_application_id: draft.offer_application_id,
            title: draft.title,
            description: draft.description,
            terms: draft.terms,
            amount: draft.amount,
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: ContractStatus::Draft,
            client_signature_url: None,
            freelancer_signature_url: None,
            signed_at: None,
            created_at: Some(created_at),
        }
    }

    /// The signature stored for a party, ignoring blank values.
    pub fn signature(&self, party: Party) -> Option<&str> {
        let slot = match party {
            Party::Client => self.client_signature_url.as_deref(),
            Party::Freelancer => self.freelancer_signature_url.as_deref(),
        };
        slot.filter(|s| !s.trim().is_empty())
    }

    /// Whether the party's signature slot is filled.
    pub fn has_signed(&self, party: Party) -> bool {
        self.signature(party).is_some()
    }

    /// Both signature slots are filled. Independent of status.
    pub fn is_fully_signed(&self) -> bool {
        self.has_signed(Party::Client) && self.has_signed(Party::Freelancer)
    }

    pub(crate) fn set_signature(&mut self, party: Party, data: String) {
        match party {
            Party::Client => self.client_signature_url = Some(data),
            Party::Freelancer => self.freelancer_signature_url = Some(data),
        }
    }

    pub(crate) fn clear_signatures(&mut self) {
        self.client_signature_url = None;
        self.freelancer_signature_url = None;
        self.signed_at = None;
    }

    /// Drop the signature slots of a contract that is back in DRAFT.
    ///
    /// A DRAFT has to be signed again from scratch. Stores that leave the
    /// old slots in place on the way back are read as if they had cleared
    /// them. Returns whether anything was dropped.
    pub fn drop_stale_signatures(&mut self) -> bool {
        let stale = self.status == ContractStatus::Draft
            && (self.client_signature_url.is_some()
                || self.freelancer_signature_url.is_some()
                || self.signed_at.is_some());
        if stale {
            self.clear_signatures();
        }
        stale
    }

    /// The user id holding a party slot.
    pub fn party_id(&self, party: Party) -> UserId {
        match party {
            Party::Client => self.client_id,
            Party::Freelancer => self.freelancer_id,
        }
    }

    /// The party an actor acts as on this contract.
    ///
    /// Requires both the role and the id to match the contract's slot, so a
    /// freelancer on some other contract is not a party here.
    pub fn party_of(&self, actor: &ActorContext) -> Option<Party> {
        let party = Party::from_role(actor.role)?;
        (self.party_id(party) == actor.id).then_some(party)
    }

    /// The party a user id refers to on this contract, by id alone.
    pub fn party_for_user(&self, user: UserId) -> Option<Party> {
        if user == self.client_id {
            Some(Party::Client)
        } else if user == self.freelancer_id {
            Some(Party::Freelancer)
        } else {
            None
        }
    }

    /// Check the snapshot-level invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.status == ContractStatus::Active && !self.is_fully_signed() {
            return Err(InvariantViolation::ActiveWithoutSignatures { id: self.id });
        }
        if self.end_date <= self.start_date {
            return Err(InvariantViolation::DatesOutOfOrder { id: self.id });
        }
        Ok(())
    }

    /// Overlay a partial update onto this contract.
    ///
    /// Party ids and signature slots are not part of the patch and never
    /// change here.
    pub fn merged_with(&self, patch: &ContractPatch) -> Contract {
        let mut merged = self.clone();
        if let Some(title) = &patch.title {
            merged.title = title.clone();
        }
        if let Some(description) = &patch.description {
            merged.description = Some(description.clone());
        }
        if let Some(terms) = &patch.terms {
            merged.terms = terms.clone();
        }
        if let Some(amount) = patch.amount {
            merged.amount = amount;
        }
        if let Some(start) = patch.start_date {
            merged.start_date = start;
        }
        if let Some(end) = patch.end_date {
            merged.end_date = end;
        }
        merged
    }

    /// Project the editable commercial terms back into a patch.
    pub fn to_patch(&self) -> ContractPatch {
        ContractPatch {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            terms: Some(self.terms.clone()),
            amount: Some(self.amount),
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
            status: None,
        }
    }
}

/// A snapshot that violates a contract invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// `ACTIVE` with fewer than two signatures.
    #[error("{id} is ACTIVE but is missing a signature")]
    ActiveWithoutSignatures { id: ContractId },

    /// `endDate` is not strictly after `startDate`.
    #[error("{id} ends on or before its start date")]
    DatesOutOfOrder { id: ContractId },
}

// ─── Payloads ────────────────────────────────────────────────────────

/// Creation payload. Excludes id, status, signatures and timestamps, which
/// the store assigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDraft {
    pub client_id: UserId,
    pub freelancer_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_application_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_application_id: Option<u64>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub terms: String,
    pub amount: Amount,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Partial update payload (`PUT /contracts/{id}`).
///
/// `status` is set to `DRAFT` by propose-changes flows so the edit and the
/// reset travel in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContractStatus>,
}

impl ContractPatch {
    /// Whether the patch carries no field changes (status aside).
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.terms.is_none()
            && self.amount.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

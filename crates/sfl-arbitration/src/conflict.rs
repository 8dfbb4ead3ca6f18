//! # Conflict Records
//!
//! ## States
//!
//! OPEN → IN_REVIEW → RESOLVED, or OPEN → RESOLVED directly. RESOLVED is
//! terminal and stamps `resolvedAt`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sfl_core::{ActorContext, ConflictId, ContractId, Timestamp, UserId};
use sfl_state::{Contract, FieldErrors};

/// Minimum description length after trimming, in characters.
pub const MIN_DESCRIPTION_LEN: usize = 20;

// ─── Status ──────────────────────────────────────────────────────────

/// Review status of a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictStatus {
    #[default]
    Open,
    InReview,
    Resolved,
}

impl ConflictStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InReview => "IN_REVIEW",
            Self::Resolved => "RESOLVED",
        }
    }
}

impl std::fmt::Display for ConflictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConflictStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "OPEN" => Ok(Self::Open),
            "IN_REVIEW" => Ok(Self::InReview),
            "RESOLVED" => Ok(Self::Resolved),
            _ => Err(format!("unknown conflict status {s:?}")),
        }
    }
}

// ─── Reason ──────────────────────────────────────────────────────────

/// Why a party raised a conflict. Travels as its label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConflictReason {
    PaymentDispute,
    DeliverableNotMet,
    MissedDeadline,
    ScopeChangeDisagreement,
    QualityIssue,
    CommunicationBreakdown,
    ContractViolation,
    Other,
    /// A label the store holds that is not in the list. Displayed as-is,
    /// never accepted for a new report.
    Unlisted(String),
}

impl ConflictReason {
    /// The selectable reasons, in form order.
    pub const LISTED: [ConflictReason; 8] = [
        Self::PaymentDispute,
        Self::DeliverableNotMet,
        Self::MissedDeadline,
        Self::ScopeChangeDisagreement,
        Self::QualityIssue,
        Self::CommunicationBreakdown,
        Self::ContractViolation,
        Self::Other,
    ];

    pub fn label(&self) -> &str {
        match self {
            Self::PaymentDispute => "Payment Dispute",
            Self::DeliverableNotMet => "Deliverable Not Met",
            Self::MissedDeadline => "Missed Deadline",
            Self::ScopeChangeDisagreement => "Scope Change Disagreement",
            Self::QualityIssue => "Quality Issue",
            Self::CommunicationBreakdown => "Communication Breakdown",
            Self::ContractViolation => "Contract Violation",
            Self::Other => "Other",
            Self::Unlisted(label) => label,
        }
    }

    pub fn is_listed(&self) -> bool {
        !matches!(self, Self::Unlisted(_))
    }
}

impl From<String> for ConflictReason {
    fn from(label: String) -> Self {
        let wanted = label.trim().replace('_', " ");
        Self::LISTED
            .into_iter()
            .find(|reason| reason.label().eq_ignore_ascii_case(&wanted))
            .unwrap_or(Self::Unlisted(label))
    }
}

impl From<ConflictReason> for String {
    fn from(reason: ConflictReason) -> Self {
        match reason {
            ConflictReason::Unlisted(label) => label,
            listed => listed.label().to_string(),
        }
    }
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ConflictReason {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

// ─── Record ──────────────────────────────────────────────────────────

/// A conflict as persisted by the Contract Store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractConflict {
    pub id: ConflictId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<ContractId>,
    #[serde(default)]
    pub raised_by_id: Option<UserId>,
    pub reason: ConflictReason,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
    #[serde(default)]
    pub status: ConflictStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

impl ContractConflict {
    /// Materialize a validated report as a new `OPEN` conflict.
    pub fn open(
        id: ConflictId,
        contract_id: ContractId,
        report: ConflictReport,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            contract_id: Some(contract_id),
            raised_by_id: Some(report.raised_by_id),
            reason: report.reason,
            description: report.description,
            evidence_url: report.evidence_url,
            status: ConflictStatus::Open,
            created_at: Some(created_at),
            resolved_at: None,
            resolution: None,
        }
    }

    /// Move the conflict to `to`, as `PUT /conflicts/{id}/status` does.
    ///
    /// Setting the current status again is a no-op. `RESOLVED` is final and
    /// stamps `resolvedAt` with `now`.
    pub fn apply_status(
        &mut self,
        to: ConflictStatus,
        now: Timestamp,
    ) -> Result<(), ConflictStatusError> {
        if self.status == to {
            return Ok(());
        }
        if self.status.is_terminal() {
            return Err(ConflictStatusError::AlreadyResolved { id: self.id });
        }
        if to == ConflictStatus::Open {
            return Err(ConflictStatusError::Reopen {
                id: self.id,
                from: self.status,
            });
        }
        self.status = to;
        if to == ConflictStatus::Resolved {
            self.resolved_at = Some(now);
        }
        Ok(())
    }
}

/// A refused conflict status change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictStatusError {
    #[error("{id} is already RESOLVED")]
    AlreadyResolved { id: ConflictId },

    #[error("{id} cannot go back to OPEN from {from}")]
    Reopen { id: ConflictId, from: ConflictStatus },
}

// ─── Report ──────────────────────────────────────────────────────────

/// Payload of `POST /conflicts/contract/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub raised_by_id: UserId,
    pub reason: ConflictReason,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
}

impl ConflictReport {
    pub fn new(
        raised_by_id: impl Into<UserId>,
        reason: ConflictReason,
        description: impl Into<String>,
        evidence_url: Option<String>,
    ) -> Self {
        Self {
            raised_by_id: raised_by_id.into(),
            reason,
            description: description.into(),
            evidence_url,
        }
    }
}

/// Why a conflict report was refused before sending.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("invalid conflict report: {0}")]
    Fields(FieldErrors),

    #[error("{actor} is not a party to {contract}")]
    NotAParty {
        contract: ContractId,
        actor: ActorContext,
    },

    #[error("report raised by {raised_by} but submitted by {actor}")]
    RaisedByMismatch { raised_by: UserId, actor: ActorContext },
}

/// Pre-flight check of a conflict report.
///
/// Returns the normalized report: description trimmed, evidence URL trimmed
/// and dropped when empty.
pub fn validate_report(
    contract: &Contract,
    actor: &ActorContext,
    report: &ConflictReport,
) -> Result<ConflictReport, ReportError> {
    if contract.party_of(actor).is_none() {
        return Err(ReportError::NotAParty {
            contract: contract.id,
            actor: *actor,
        });
    }
    if report.raised_by_id != actor.id {
        return Err(ReportError::RaisedByMismatch {
            raised_by: report.raised_by_id,
            actor: *actor,
        });
    }

    let mut errors = FieldErrors::new();
    if !report.reason.is_listed() {
        errors.add("reason", "Please select a reason.");
    }
    let description = report.description.trim();
    if description.chars().count() < MIN_DESCRIPTION_LEN {
        errors.add(
            "description",
            format!("Please provide at least {MIN_DESCRIPTION_LEN} characters of detail."),
        );
    }
    errors.into_result().map_err(ReportError::Fields)?;

    let evidence_url = report
        .evidence_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    Ok(ConflictReport {
        raised_by_id: report.raised_by_id,
        reason: report.reason.clone(),
        description: description.to_string(),
        evidence_url,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn conflict(id: u64, raised_by: Option<u64>) -> ContractConflict {
        ContractConflict {
            id: ConflictId(id),
            contract_id: Some(ContractId(10)),
            raised_by_id: raised_by.map(UserId),
            reason: ConflictReason::MissedDeadline,
            description: "Second milestone is two weeks overdue.".to_string(),
            evidence_url: None,
            status: ConflictStatus::Open,
            created_at: None,
            resolved_at: None,
            resolution: None,
        }
    }
}

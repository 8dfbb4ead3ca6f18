//! # Transitions
//!
//! Two sides of the same state machine:
//!
//! - [`authorize`] is the caller-side guard. Given a snapshot, an actor and
//!   a trigger it either names the status the store is expected to return or
//!   explains why the actor may not fire that trigger.
//! - [`apply_status`] and [`apply_signature`] are the store-side
//!   read-modify-write steps. They are used by the in-memory store and the
//!   stub server, which act as the single arbiter of contract state.
//!
//! ## Transition Table
//!
//! | Trigger | From | To | Actor |
//! |---|---|---|---|
//! | `SubmitForSignature` | DRAFT | PENDING_SIGNATURE | client party |
//! | `Edit` | DRAFT | DRAFT | client party |
//! | `Reject` | PENDING_SIGNATURE | DRAFT | freelancer party |
//! | `ProposeChanges` | PENDING_SIGNATURE | DRAFT | freelancer party |
//! | `Withdraw` | PENDING_SIGNATURE | DRAFT | client party |
//! | `Sign` | PENDING_SIGNATURE | PENDING_SIGNATURE or ACTIVE | the party whose slot is empty |
//! | `Complete` | ACTIVE | COMPLETED | client party |
//! | `ReportConflict` | ACTIVE, IN_CONFLICT | IN_CONFLICT | either party |
//! | `Override(s)` | any non-terminal | `s` | admin |
//!
//! Every transition into DRAFT clears both signatures and `signedAt`.

use thiserror::Error;

use sfl_core::{ActorContext, ContractId, Timestamp};

use crate::contract::{Contract, ContractStatus, Party};
use crate::eligibility;

// ─── Triggers ────────────────────────────────────────────────────────

/// A lifecycle trigger fired by an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    SubmitForSignature,
    Edit,
    Reject,
    ProposeChanges,
    Withdraw,
    Sign,
    Complete,
    ReportConflict,
    Override(ContractStatus),
}

impl Transition {
    /// Stable name used in logs, metrics and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitForSignature => "submit_for_signature",
            Self::Edit => "edit",
            Self::Reject => "reject",
            Self::ProposeChanges => "propose_changes",
            Self::Withdraw => "withdraw",
            Self::Sign => "sign",
            Self::Complete => "complete",
            Self::ReportConflict => "report_conflict",
            Self::Override(_) => "override_status",
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Override(to) => write!(f, "override_status({to})"),
            other => f.write_str(other.name()),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Why a transition was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The trigger is not valid from the current status.
    #[error("{trigger} is not allowed while {contract} is {from}")]
    InvalidTransition {
        contract: ContractId,
        from: ContractStatus,
        trigger: String,
    },

    /// The contract is in a terminal status.
    #[error("{contract} is in terminal state {state}")]
    TerminalState {
        contract: ContractId,
        state: ContractStatus,
    },

    /// The actor is not the party this trigger belongs to.
    #[error("{actor} may not {trigger} {contract}")]
    NotPermitted {
        contract: ContractId,
        actor: ActorContext,
        trigger: String,
    },

    /// The party's signature slot is already filled.
    #[error("{party} has already signed {contract}")]
    AlreadySigned { contract: ContractId, party: Party },

    /// `ACTIVE` requested without both signatures.
    #[error("{contract} cannot become ACTIVE without both signatures")]
    MissingSignatures { contract: ContractId },

    /// `COMPLETED` requested from a status other than `ACTIVE`.
    #[error("{contract} can only be completed from ACTIVE, not {from}")]
    CompletionRequiresActive {
        contract: ContractId,
        from: ContractStatus,
    },

    /// Empty signature payload.
    #[error("signature payload for {contract} is empty")]
    EmptySignature { contract: ContractId },
}

// ─── Caller-side guard ───────────────────────────────────────────────

/// Check that `actor` may fire `trigger` on `contract`.
///
/// Returns the status the store is expected to report afterwards. For
/// [`Transition::Sign`] that is `PENDING_SIGNATURE`; the store alone decides
/// whether the signature completes the pair.
pub fn authorize(
    contract: &Contract,
    actor: &ActorContext,
    trigger: Transition,
) -> Result<ContractStatus, TransitionError> {
    if contract.status.is_terminal() {
        return Err(TransitionError::TerminalState {
            contract: contract.id,
            state: contract.status,
        });
    }

    let (allowed_from, target, permitted): (&[ContractStatus], ContractStatus, bool) = match trigger
    {
        Transition::SubmitForSignature => (
            &[ContractStatus::Draft],
            ContractStatus::PendingSignature,
            eligibility::can_submit_for_signature(contract, actor),
        ),
        Transition::Edit => (
            &[ContractStatus::Draft],
            ContractStatus::Draft,
            eligibility::can_edit(contract, actor),
        ),
        Transition::Reject => (
            &[ContractStatus::PendingSignature],
            ContractStatus::Draft,
            eligibility::can_reject(contract, actor),
        ),
        Transition::ProposeChanges => (
            &[ContractStatus::PendingSignature],
            ContractStatus::Draft,
            eligibility::can_propose_changes(contract, actor),
        ),
        Transition::Withdraw => (
            &[ContractStatus::PendingSignature],
            ContractStatus::Draft,
            eligibility::can_withdraw(contract, actor),
        ),
        Transition::Sign => {
            if contract.status == ContractStatus::PendingSignature {
                if let Some(party) = contract.party_of(actor) {
                    if contract.has_signed(party) {
                        return Err(TransitionError::AlreadySigned {
                            contract: contract.id,
                            party,
                        });
                    }
                }
            }
            (
                &[ContractStatus::PendingSignature],
                ContractStatus::PendingSignature,
                eligibility::can_sign(contract, actor),
            )
        }
        Transition::Complete => (
            &[ContractStatus::Active],
            ContractStatus::Completed,
            eligibility::can_complete(contract, actor),
        ),
        Transition::ReportConflict => (
            &[ContractStatus::Active, ContractStatus::InConflict],
            ContractStatus::InConflict,
            eligibility::can_report_conflict(contract, actor),
        ),
        Transition::Override(to) => {
            if !actor.is_admin() {
                return Err(not_permitted(contract, actor, trigger));
            }
            check_status_invariants(contract, to)?;
            return Ok(to);
        }
    };

    if !allowed_from.contains(&contract.status) {
        return Err(TransitionError::InvalidTransition {
            contract: contract.id,
            from: contract.status,
            trigger: trigger.to_string(),
        });
    }
    if !permitted {
        return Err(not_permitted(contract, actor, trigger));
    }
    Ok(target)
}

fn not_permitted(contract: &Contract, actor: &ActorContext, trigger: Transition) -> TransitionError {
    TransitionError::NotPermitted {
        contract: contract.id,
        actor: *actor,
        trigger: trigger.to_string(),
    }
}

/// The invariant checks any status change must pass, whoever requests it.
fn check_status_invariants(contract: &Contract, to: ContractStatus) -> Result<(), TransitionError> {
    if contract.status.is_terminal() {
        return Err(TransitionError::TerminalState {
            contract: contract.id,
            state: contract.status,
        });
    }
    if to == ContractStatus::Active && contract.status != ContractStatus::Active && !contract.is_fully_signed() {
        return Err(TransitionError::MissingSignatures {
            contract: contract.id,
        });
    }
    if to == ContractStatus::Completed && contract.status != ContractStatus::Active {
        return Err(TransitionError::CompletionRequiresActive {
            contract: contract.id,
            from: contract.status,
        });
    }
    Ok(())
}

// ─── Store-side read-modify-write ────────────────────────────────────

/// Apply a status change as the store does on `PATCH /contracts/{id}/status`.
///
/// The store does not know who is asking, so it only enforces the
/// invariants: no change out of a terminal state, no `ACTIVE` without both
/// signatures, no `COMPLETED` except from `ACTIVE`. Moving to `DRAFT` clears
/// the signatures.
pub fn apply_status(contract: &mut Contract, to: ContractStatus) -> Result<(), TransitionError> {
    if contract.status == to && !to.is_terminal() {
        return Ok(());
    }
    check_status_invariants(contract, to)?;
    if to == ContractStatus::Draft {
        contract.clear_signatures();
    }
    contract.status = to;
    Ok(())
}

/// What a signature submission did to the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureEffect {
    /// The slot was filled; the counterpart has not signed yet.
    Recorded,
    /// The slot was filled and completed the pair; the contract is `ACTIVE`.
    Activated,
    /// The same payload was already stored for this party; nothing changed.
    Unchanged,
}

/// Apply a signature as the store does on `PATCH /contracts/{id}/sign`.
///
/// Must run under the store's per-contract exclusive access: the check that
/// both slots are filled and the flip to `ACTIVE` with `signedAt = now`
/// happen in the same step as the write.
///
/// Resubmitting the identical payload for a party is a no-op so a retried
/// request does not fail.
pub fn apply_signature(
    contract: &mut Contract,
    party: Party,
    signature: &str,
    now: Timestamp,
) -> Result<SignatureEffect, TransitionError> {
    if signature.trim().is_empty() {
        return Err(TransitionError::EmptySignature {
            contract: contract.id,
        });
    }
    if let Some(existing) = contract.signature(party) {
        if existing == signature {
            return Ok(SignatureEffect::Unchanged);
        }
        return Err(TransitionError::AlreadySigned {
            contract: contract.id,
            party,
        });
    }
    if contract.status != ContractStatus::PendingSignature {
        if contract.status.is_terminal() {
            return Err(TransitionError::TerminalState {
                contract: contract.id,
                state: contract.status,
            });
        }
        return Err(TransitionError::InvalidTransition {
            contract: contract.id,
            from: contract.status,
            trigger: Transition::Sign.to_string(),
        });
    }

    contract.set_signature(party, signature.to_string());
    if contract.is_fully_signed() {
        contract.status = ContractStatus::Active;
        contract.signed_at = Some(now);
        Ok(SignatureEffect::Activated)
    } else {
        Ok(SignatureEffect::Recorded)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

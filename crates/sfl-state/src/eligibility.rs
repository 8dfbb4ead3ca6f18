//! # Eligibility Predicates
//!
//! Pure functions of `(contract, actor)` deciding which controls a view
//! offers. They mirror the guards in [`crate::transition::authorize`] so a
//! control is enabled exactly when the trigger would pass pre-flight.
//!
//! Party predicates require the actor to be the party referenced by the
//! contract: a client predicate needs `actor.id == clientId`, a freelancer
//! predicate needs `actor.id == freelancerId`. Admins hold none of the
//! party predicates.

use sfl_core::ActorContext;

use crate::contract::{Contract, ContractStatus, Party};

fn acts_as(contract: &Contract, actor: &ActorContext, party: Party) -> bool {
    contract.party_of(actor) == Some(party)
}

/// The client may change the commercial terms of a draft.
pub fn can_edit(contract: &Contract, actor: &ActorContext) -> bool {
    contract.status == ContractStatus::Draft && acts_as(contract, actor, Party::Client)
}

/// `DRAFT ∧ client`.
pub fn can_submit_for_signature(contract: &Contract, actor: &ActorContext) -> bool {
    contract.status == ContractStatus::Draft && acts_as(contract, actor, Party::Client)
}

/// The freelancer may send a pending contract back with edits.
pub fn can_propose_changes(contract: &Contract, actor: &ActorContext) -> bool {
    contract.status == ContractStatus::PendingSignature
        && acts_as(contract, actor, Party::Freelancer)
}

/// `PENDING_SIGNATURE ∧ freelancer`.
pub fn can_reject(contract: &Contract, actor: &ActorContext) -> bool {
    contract.status == ContractStatus::PendingSignature
        && acts_as(contract, actor, Party::Freelancer)
}

/// The client may pull a pending contract back to edit and resubmit it.
pub fn can_withdraw(contract: &Contract, actor: &ActorContext) -> bool {
    contract.status == ContractStatus::PendingSignature && acts_as(contract, actor, Party::Client)
}

/// `PENDING_SIGNATURE ∧ own slot empty`.
pub fn can_sign(contract: &Contract, actor: &ActorContext) -> bool {
    if contract.status != ContractStatus::PendingSignature {
        return false;
    }
    match contract.party_of(actor) {
        Some(party) => !contract.has_signed(party),
        None => false,
    }
}

/// `ACTIVE ∧ client`.
pub fn can_complete(contract: &Contract, actor: &ActorContext) -> bool {
    contract.status == ContractStatus::Active && acts_as(contract, actor, Party::Client)
}

/// `(ACTIVE ∨ IN_CONFLICT) ∧ either party`.
pub fn can_report_conflict(contract: &Contract, actor: &ActorContext) -> bool {
    matches!(
        contract.status,
        ContractStatus::Active | ContractStatus::InConflict
    ) && contract.party_of(actor).is_some()
}

/// Admins may override the status of any non-terminal contract.
pub fn can_override_status(contract: &Contract, actor: &ActorContext) -> bool {
    actor.is_admin() && !contract.status.is_terminal()
}

/// Admins may delete any contract; the owning client only while it is a
/// draft.
pub fn can_delete(contract: &Contract, actor: &ActorContext) -> bool {
    actor.is_admin()
        || (contract.status == ContractStatus::Draft && acts_as(contract, actor, Party::Client))
}

/// Both signature slots are filled.
pub fn is_fully_signed(contract: &Contract) -> bool {
    contract.is_fully_signed()
}

/// Every predicate evaluated once, for rendering a control bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Eligibility {
    pub can_edit: bool,
    pub can_submit_for_signature: bool,
    pub can_propose_changes: bool,
    pub can_reject: bool,
    pub can_withdraw: bool,
    pub can_sign: bool,
    pub can_complete: bool,
    pub can_report_conflict: bool,
    pub can_override_status: bool,
    pub can_delete: bool,
    pub is_fully_signed: bool,
}

impl Eligibility {
    pub fn evaluate(contract: &Contract, actor: &ActorContext) -> Self {
        Self {
            can_edit: can_edit(contract, actor),
            can_submit_for_signature: can_submit_for_signature(contract, actor),
            can_propose_changes: can_propose_changes(contract, actor),
            can_reject: can_reject(contract, actor),
            can_withdraw: can_withdraw(contract, actor),
            can_sign: can_sign(contract, actor),
            can_complete: can_complete(contract, actor),
            can_report_conflict: can_report_conflict(contract, actor),
            can_override_status: can_override_status(contract, actor),
            can_delete: can_delete(contract, actor),
            is_fully_signed: is_fully_signed(contract),
        }
    }

    /// Names of the predicates that hold, in declaration order.
    pub fn granted(&self) -> Vec<&'static str> {
        [
            ("edit", self.can_edit),
            ("submit", self.can_submit_for_signature),
            ("propose_changes", self.can_propose_changes),
            ("reject", self.can_reject),
            ("withdraw", self.can_withdraw),
            ("sign", self.can_sign),
            ("complete", self.can_complete),
            ("report_conflict", self.can_report_conflict),
            ("override_status", self.can_override_status),
            ("delete", self.can_delete),
        ]
        .into_iter()
        .filter_map(|(name, held)| held.then_some(name))
        .collect()
    }
}

//! # Lifecycle Manager
//!
//! Stateless-per-call orchestrator. Every action follows the same path:
//!
//! 1. Pre-flight: the trigger is authorized against the caller's snapshot
//!    and its payload validated. Nothing is sent when this fails.
//! 2. One store operation, bounded by the configured request timeout.
//! 3. The response is checked against the contract invariants and the
//!    status the trigger should produce.
//! 4. The outcome is logged, counted and sent to the notification sink.
//!
//! Reporting a conflict is the one two-step action: the conflict is
//! recorded, then the contract is flagged `IN_CONFLICT` unless it already
//! is.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;

use sfl_arbitration::{
    group_conflicts, validate_report, ConflictGroups, ConflictReport, ConflictStatus,
    ContractConflict,
};
use sfl_core::{ActorContext, ConflictId, ContractId};
use sfl_state::{
    authorize, eligibility, validate_draft, validate_merged, Contract, ContractDraft,
    ContractPatch, ContractStatus, FieldErrors, ListScope, StatusFilter, Transition,
};

use crate::config::LifecycleConfig;
use crate::directory::{resolve_party_names, PartyNames, UserDirectory};
use crate::error::LifecycleError;
use crate::notify::{NotificationSink, Severity};
use crate::store::{ContractStore, StoreError};

/// Result of a signature submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome {
    /// Recorded; the counterpart has not signed yet.
    AwaitingOtherParty(Contract),
    /// This signature completed the pair; the contract is `ACTIVE`.
    Activated(Contract),
}

impl SignOutcome {
    pub fn contract(&self) -> &Contract {
        match self {
            Self::AwaitingOtherParty(c) | Self::Activated(c) => c,
        }
    }

    pub fn into_contract(self) -> Contract {
        match self {
            Self::AwaitingOtherParty(c) | Self::Activated(c) => c,
        }
    }

    pub fn is_activated(&self) -> bool {
        matches!(self, Self::Activated(_))
    }
}

/// Result of reporting a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictReported {
    pub conflict: ContractConflict,
    /// The contract after the report. When `flagged` is false the status
    /// update failed and this is the snapshot the report was made from.
    pub contract: Contract,
    pub flagged: bool,
}

pub struct LifecycleManager {
    store: Arc<dyn ContractStore>,
    directory: Arc<dyn UserDirectory>,
    notifier: Arc<dyn NotificationSink>,
    config: LifecycleConfig,
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LifecycleManager {
    pub fn new(
        store: Arc<dyn ContractStore>,
        directory: Arc<dyn UserDirectory>,
        notifier: Arc<dyn NotificationSink>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub(crate) fn notify(&self, message: &str, severity: Severity) {
        self.notifier.notify(message, severity);
    }

    // ── Plumbing ─────────────────────────────────────────────────────

    /// Run one store operation under the request timeout.
    async fn call<T>(
        &self,
        action: &'static str,
        op: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, LifecycleError> {
        match tokio::time::timeout(self.config.request_timeout, op).await {
            Ok(result) => result.map_err(LifecycleError::from),
            Err(_) => Err(LifecycleError::transient(format!(
                "{action} timed out after {:?}",
                self.config.request_timeout
            ))),
        }
    }

    /// Record the outcome of an action: log, metric, notification.
    fn finish<T>(
        &self,
        action: &'static str,
        contract: Option<ContractId>,
        result: Result<T, LifecycleError>,
        success: impl FnOnce(&T) -> String,
    ) -> Result<T, LifecycleError> {
        self.finish_with(action, contract, result, |value| (success(value), Severity::Success))
    }

    /// [`Self::finish`] for actions whose success can be partial.
    fn finish_with<T>(
        &self,
        action: &'static str,
        contract: Option<ContractId>,
        result: Result<T, LifecycleError>,
        success: impl FnOnce(&T) -> (String, Severity),
    ) -> Result<T, LifecycleError> {
        let contract_id = contract.map(|id| id.get());
        match &result {
            Ok(value) => {
                metrics::counter!("sfl_lifecycle_actions_total", "action" => action, "outcome" => "success")
                    .increment(1);
                tracing::info!(action, contract_id, "lifecycle action succeeded");
                let (message, severity) = success(value);
                self.notifier.notify(&message, severity);
            }
            Err(e) => {
                metrics::counter!("sfl_lifecycle_actions_total", "action" => action, "outcome" => e.kind())
                    .increment(1);
                tracing::warn!(action, contract_id, kind = e.kind(), error = %e, "lifecycle action failed");
                self.notifier.notify(&e.user_message(), e.severity());
            }
        }
        result
    }

    /// Check a contract returned by the store.
    fn verify(
        &self,
        expected_id: Option<ContractId>,
        expected_status: Option<ContractStatus>,
        mut returned: Contract,
    ) -> Result<Contract, LifecycleError> {
        if let Some(id) = expected_id {
            if returned.id != id {
                return Err(LifecycleError::inconsistent(format!(
                    "asked for {id}, store returned {}",
                    returned.id
                )));
            }
        }
        returned.check_invariants()?;
        if let Some(status) = expected_status {
            if returned.status != status {
                return Err(LifecycleError::inconsistent(format!(
                    "{} should be {status} but store returned {}",
                    returned.id, returned.status
                )));
            }
        }
        if returned.drop_stale_signatures() {
            tracing::debug!(contract_id = returned.id.get(), "ignoring signatures left on a DRAFT");
        }
        Ok(returned)
    }

    /// Authorize a status-only trigger, send it, verify the result.
    async fn transition(
        &self,
        actor: &ActorContext,
        contract: &Contract,
        trigger: Transition,
    ) -> Result<Contract, LifecycleError> {
        let target = authorize(contract, actor, trigger)?;
        tracing::debug!(contract_id = contract.id.get(), %actor, %trigger, to = %target, "sending status change");
        let returned = self
            .call(trigger.name(), self.store.set_status(contract.id, target))
            .await?;
        self.verify(Some(contract.id), Some(target), returned)
    }

    /// Validate an edit against the snapshot it applies to.
    fn validate_edit(contract: &Contract, patch: &ContractPatch) -> Result<ContractPatch, LifecycleError> {
        if patch.is_empty() {
            let mut errors = FieldErrors::new();
            errors.add("patch", "No changes to save.");
            return Err(errors.into());
        }
        validate_merged(&contract.merged_with(patch))?;
        Ok(ContractPatch {
            status: None,
            ..patch.clone()
        })
    }

    async fn send_edit(
        &self,
        action: &'static str,
        contract: &Contract,
        patch: ContractPatch,
    ) -> Result<Contract, LifecycleError> {
        let returned = self
            .call(action, self.store.update_contract(contract.id, &patch))
            .await?;
        self.verify(Some(contract.id), Some(ContractStatus::Draft), returned)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Contracts visible to the actor, narrowed by `filter`.
    ///
    /// A listed contract that breaks an invariant is left out and reported
    /// as a warning.
    pub async fn list_contracts(
        &self,
        actor: &ActorContext,
        filter: StatusFilter,
    ) -> Result<Vec<Contract>, LifecycleError> {
        let contracts = match ListScope::for_actor(actor) {
            ListScope::All => self.call("list", self.store.list_contracts()).await,
            ListScope::ByClient(id) => {
                self.call("list", self.store.list_contracts_by_client(id)).await
            }
            ListScope::ByFreelancer(id) => {
                self.call("list", self.store.list_contracts_by_freelancer(id))
                    .await
            }
        };
        let contracts = match contracts {
            Ok(contracts) => contracts,
            Err(e) => return self.finish("list", None, Err(e), |_: &Vec<Contract>| String::new()),
        };

        let mut visible = Vec::with_capacity(contracts.len());
        for mut contract in contracts {
            contract.drop_stale_signatures();
            match contract.check_invariants() {
                Ok(()) if filter.matches(&contract) => visible.push(contract),
                Ok(()) => {}
                Err(violation) => {
                    tracing::warn!(contract_id = contract.id.get(), %violation, "skipping inconsistent contract");
                    self.notifier.notify(
                        &format!("{} was hidden because its data is inconsistent.", contract.id),
                        Severity::Warning,
                    );
                }
            }
        }
        Ok(visible)
    }

    /// Fetch one contract the actor is a party to (admins see all).
    pub async fn load(&self, actor: &ActorContext, id: ContractId) -> Result<Contract, LifecycleError> {
        let result = async {
            let returned = self.call("load", self.store.get_contract(id)).await?;
            let contract = self.verify(Some(id), None, returned)?;
            if !actor.is_admin() && contract.party_of(actor).is_none() {
                return Err(LifecycleError::authorization(format!(
                    "{actor} is not a party to {id}"
                )));
            }
            Ok(contract)
        }
        .await;
        match result {
            Ok(contract) => Ok(contract),
            Err(e) => self.finish("load", Some(id), Err(e), |_| String::new()),
        }
    }

    /// A contract's conflicts, grouped by the party that raised them.
    ///
    /// Attribution inconsistencies are logged and surfaced as a warning, not
    /// dropped.
    pub async fn conflicts(&self, contract: &Contract) -> Result<ConflictGroups, LifecycleError> {
        let conflicts = match self
            .call("list_conflicts", self.store.list_conflicts(contract.id))
            .await
        {
            Ok(conflicts) => conflicts,
            Err(e) => {
                return self.finish("list_conflicts", Some(contract.id), Err(e), |_: &ConflictGroups| {
                    String::new()
                })
            }
        };
        let groups = group_conflicts(contract, conflicts);
        for inconsistency in &groups.inconsistencies {
            tracing::warn!(contract_id = contract.id.get(), %inconsistency, "conflict attribution mismatch");
        }
        if !groups.is_consistent() {
            self.notifier.notify(
                &format!(
                    "{} conflict(s) on {} could not be attributed to either party.",
                    groups.inconsistencies.len(),
                    contract.id
                ),
                Severity::Warning,
            );
        }
        Ok(groups)
    }

    /// Display names of both parties. Never fails.
    pub async fn party_names(&self, contract: &Contract) -> PartyNames {
        resolve_party_names(self.directory.as_ref(), contract).await
    }

    // ── Drafting ─────────────────────────────────────────────────────

    /// Create a contract in `DRAFT`. `today` anchors the start-date rule.
    pub async fn create_contract(
        &self,
        actor: &ActorContext,
        draft: &ContractDraft,
        today: NaiveDate,
    ) -> Result<Contract, LifecycleError> {
        let result = async {
            if !actor.is_client() || draft.client_id != actor.id {
                return Err(LifecycleError::authorization(format!(
                    "{actor} may only create contracts as their own client"
                )));
            }
            validate_draft(draft, today)?;
            let returned = self.call("create", self.store.create_contract(draft)).await?;
            self.verify(None, Some(ContractStatus::Draft), returned)
        }
        .await;
        self.finish("create", result.as_ref().ok().map(|c| c.id), result, |c| {
            format!("Contract {} created.", c.id)
        })
    }

    /// Edit the terms of a draft (client).
    pub async fn update_contract(
        &self,
        actor: &ActorContext,
        contract: &Contract,
        patch: &ContractPatch,
    ) -> Result<Contract, LifecycleError> {
        let result = async {
            authorize(contract, actor, Transition::Edit)?;
            let patch = Self::validate_edit(contract, patch)?;
            self.send_edit("edit", contract, patch).await
        }
        .await;
        self.finish("edit", Some(contract.id), result, |_| "Changes saved.".to_string())
    }

    /// DRAFT → PENDING_SIGNATURE (client).
    pub async fn submit_for_signature(
        &self,
        actor: &ActorContext,
        contract: &Contract,
    ) -> Result<Contract, LifecycleError> {
        let result = async {
            // The draft may predate the current rules; re-check it before it
            // goes out for signature.
            authorize(contract, actor, Transition::SubmitForSignature)?;
            validate_merged(contract)?;
            self.transition(actor, contract, Transition::SubmitForSignature).await
        }
        .await;
        self.finish("submit_for_signature", Some(contract.id), result, |_| {
            "Sent for signature!".to_string()
        })
    }

    /// PENDING_SIGNATURE → DRAFT (freelancer). Signatures are cleared.
    pub async fn reject(&self, actor: &ActorContext, contract: &Contract) -> Result<Contract, LifecycleError> {
        let result = self.transition(actor, contract, Transition::Reject).await;
        self.finish("reject", Some(contract.id), result, |_| {
            "Contract sent back for revision.".to_string()
        })
    }

    /// PENDING_SIGNATURE → DRAFT with edits, in one request (freelancer).
    pub async fn propose_changes(
        &self,
        actor: &ActorContext,
        contract: &Contract,
        patch: &ContractPatch,
    ) -> Result<Contract, LifecycleError> {
        let result = async {
            authorize(contract, actor, Transition::ProposeChanges)?;
            let mut patch = Self::validate_edit(contract, patch)?;
            patch.status = Some(ContractStatus::Draft);
            self.send_edit("propose_changes", contract, patch).await
        }
        .await;
        self.finish("propose_changes", Some(contract.id), result, |_| {
            "Changes saved. Contract is back in Draft.".to_string()
        })
    }

    /// PENDING_SIGNATURE → DRAFT (client), optionally with edits.
    pub async fn withdraw(
        &self,
        actor: &ActorContext,
        contract: &Contract,
        patch: Option<&ContractPatch>,
    ) -> Result<Contract, LifecycleError> {
        let result = async {
            match patch {
                None => self.transition(actor, contract, Transition::Withdraw).await,
                Some(patch) => {
                    authorize(contract, actor, Transition::Withdraw)?;
                    let mut patch = Self::validate_edit(contract, patch)?;
                    patch.status = Some(ContractStatus::Draft);
                    self.send_edit("withdraw", contract, patch).await
                }
            }
        }
        .await;
        self.finish("withdraw", Some(contract.id), result, |_| {
            "Contract withdrawn to Draft.".to_string()
        })
    }

    // ── Signing and completion ───────────────────────────────────────

    /// Submit the actor's signature.
    ///
    /// The store decides whether this is the first or the second
    /// signature; the outcome is read off the returned status.
    pub async fn sign(
        &self,
        actor: &ActorContext,
        contract: &Contract,
        signature_data: &str,
    ) -> Result<SignOutcome, LifecycleError> {
        let result = async {
            authorize(contract, actor, Transition::Sign)?;
            let party = contract
                .party_of(actor)
                .ok_or_else(|| LifecycleError::authorization(format!("{actor} is not a party to {}", contract.id)))?;
            let signature = signature_data.trim();
            if !signature.starts_with("data:image/") {
                let mut errors = FieldErrors::new();
                errors.add("signature", "Signature must be an image data URL.");
                return Err(errors.into());
            }

            let returned = self
                .call("sign", self.store.sign(contract.id, party, signature))
                .await?;
            let returned = self.verify(Some(contract.id), None, returned)?;
            if !returned.has_signed(party) {
                return Err(LifecycleError::inconsistent(format!(
                    "store accepted the {party} signature on {} but did not record it",
                    contract.id
                )));
            }
            match returned.status {
                ContractStatus::Active => Ok(SignOutcome::Activated(returned)),
                ContractStatus::PendingSignature if !returned.is_fully_signed() => {
                    Ok(SignOutcome::AwaitingOtherParty(returned))
                }
                other => Err(LifecycleError::inconsistent(format!(
                    "{} is {other} after signing with {} signature(s)",
                    contract.id,
                    if returned.is_fully_signed() { 2 } else { 1 }
                ))),
            }
        }
        .await;
        self.finish("sign", Some(contract.id), result, |outcome| match outcome {
            SignOutcome::Activated(_) => {
                "Both signatures collected. The contract is now Active!".to_string()
            }
            SignOutcome::AwaitingOtherParty(_) => {
                "Signature submitted! Waiting for the other party.".to_string()
            }
        })
    }

    /// ACTIVE → COMPLETED (client).
    pub async fn complete(&self, actor: &ActorContext, contract: &Contract) -> Result<Contract, LifecycleError> {
        let result = self.transition(actor, contract, Transition::Complete).await;
        self.finish("complete", Some(contract.id), result, |_| {
            "Contract marked as completed!".to_string()
        })
    }

    // ── Conflicts ────────────────────────────────────────────────────

    /// Record a conflict and flag the contract `IN_CONFLICT`.
    ///
    /// A failure of the flagging step does not undo the report: the result
    /// carries `flagged: false` and the pre-report snapshot, and the outcome
    /// is reported as a warning. On a contract already `IN_CONFLICT` the
    /// contract is re-read instead of flagged again.
    pub async fn report_conflict(
        &self,
        actor: &ActorContext,
        contract: &Contract,
        report: &ConflictReport,
    ) -> Result<ConflictReported, LifecycleError> {
        let result = async {
            authorize(contract, actor, Transition::ReportConflict)?;
            let report = validate_report(contract, actor, report)?;
            let conflict = self
                .call("report_conflict", self.store.report_conflict(contract.id, &report))
                .await?;

            if contract.status == ContractStatus::InConflict {
                let refreshed = self
                    .call("report_conflict", self.store.get_contract(contract.id))
                    .await
                    .and_then(|c| self.verify(Some(contract.id), None, c));
                let contract = match refreshed {
                    Ok(current) => current,
                    Err(e) => {
                        tracing::warn!(contract_id = contract.id.get(), error = %e, "conflict recorded, re-read failed");
                        contract.clone()
                    }
                };
                return Ok(ConflictReported {
                    conflict,
                    flagged: contract.status == ContractStatus::InConflict,
                    contract,
                });
            }
            let flagged = match self
                .call(
                    "report_conflict",
                    self.store.set_status(contract.id, ContractStatus::InConflict),
                )
                .await
                .and_then(|c| self.verify(Some(contract.id), Some(ContractStatus::InConflict), c))
            {
                Ok(updated) => Some(updated),
                Err(e) => {
                    tracing::warn!(contract_id = contract.id.get(), error = %e, "conflict recorded but contract not flagged");
                    None
                }
            };
            Ok(ConflictReported {
                conflict,
                flagged: flagged.is_some(),
                contract: flagged.unwrap_or_else(|| contract.clone()),
            })
        }
        .await;
        self.finish_with("report_conflict", Some(contract.id), result, |reported| {
            if reported.flagged {
                ("Conflict reported successfully.".to_string(), Severity::Success)
            } else {
                (
                    "Conflict recorded, but the contract status could not be updated.".to_string(),
                    Severity::Warning,
                )
            }
        })
    }

    /// Move a conflict through review (admin).
    pub async fn update_conflict_status(
        &self,
        actor: &ActorContext,
        conflict: ConflictId,
        status: ConflictStatus,
    ) -> Result<ContractConflict, LifecycleError> {
        let result = async {
            if !actor.is_admin() {
                return Err(LifecycleError::authorization(format!(
                    "{actor} may not change the status of {conflict}"
                )));
            }
            self.call(
                "update_conflict_status",
                self.store.update_conflict_status(conflict, status),
            )
            .await
        }
        .await;
        self.finish("update_conflict_status", None, result, |c| {
            format!("{} is now {}.", c.id, c.status)
        })
    }

    // ── Administration ───────────────────────────────────────────────

    /// Set any status on a non-terminal contract (admin), subject to the
    /// contract invariants.
    pub async fn override_status(
        &self,
        actor: &ActorContext,
        contract: &Contract,
        to: ContractStatus,
    ) -> Result<Contract, LifecycleError> {
        let result = self.transition(actor, contract, Transition::Override(to)).await;
        self.finish("override_status", Some(contract.id), result, |c| {
            format!("{} is now {}.", c.id, c.status.label())
        })
    }

    /// Delete a contract. `Ok(false)` when the store had nothing to delete.
    pub async fn delete_contract(&self, actor: &ActorContext, contract: &Contract) -> Result<bool, LifecycleError> {
        let result = async {
            if !eligibility::can_delete(contract, actor) {
                return Err(LifecycleError::authorization(format!(
                    "{actor} may not delete {} while it is {}",
                    contract.id, contract.status
                )));
            }
            self.call("delete", self.store.delete_contract(contract.id)).await
        }
        .await;
        self.finish("delete", Some(contract.id), result, |deleted| {
            if *deleted {
                format!("{} deleted.", contract.id)
            } else {
                format!("{} was already gone.", contract.id)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryContractStore, InMemoryUserDirectory};
    use crate::notify::RecordingSink;
    use sfl_core::{Amount, UserId};
    use std::time::Duration;

    struct Fixture {
        store: Arc<InMemoryContractStore>,
        sink: Arc<RecordingSink>,
        manager: LifecycleManager,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryContractStore::new());
        let sink = Arc::new(RecordingSink::new());
        let manager = LifecycleManager::new(
            store.clone(),
            Arc::new(InMemoryUserDirectory::new()),
            sink.clone(),
            LifecycleConfig::with_timeout(Duration::from_millis(200)),
        );
        Fixture { store, sink, manager }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()
    }

    fn draft() -> ContractDraft {
        ContractDraft {
            client_id: UserId(1),
            freelancer_id: UserId(2),
            project_application_id: None,
            offer_application_id: None,
            title: "Website Redesign".into(),
            description: None,
            terms: "Deliverables in three milestones, net 15.".into(),
            amount: Amount::from_major_units(500),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
        }
    }

    #[tokio::test]
    async fn freelancer_cannot_create() {
        let f = fixture();
        let err = f
            .manager
            .create_contract(&ActorContext::freelancer(2), &draft(), today())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "authorization");
        assert_eq!(f.store.calls(), 0);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_store() {
        let f = fixture();
        let mut d = draft();
        d.title = "web".into();
        let err = f
            .manager
            .create_contract(&ActorContext::client(1), &d, today())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
        assert_eq!(f.store.calls(), 0);
        assert_eq!(f.sink.last().map(|(_, s)| s), Some(Severity::Warning));
    }

    #[tokio::test]
    async fn store_returning_active_without_signatures_is_inconsistent() {
        let f = fixture();
        let client = ActorContext::client(1);
        let created = f.manager.create_contract(&client, &draft(), today()).await.unwrap();

        let mut broken = created.clone();
        broken.status = ContractStatus::Active;
        f.store.seed_contract(broken);

        let err = f.manager.load(&client, created.id).await.unwrap_err();
        assert_eq!(err.kind(), "inconsistent");
    }

    #[tokio::test]
    async fn slow_store_times_out_as_transient() {
        let f = fixture();
        let client = ActorContext::client(1);
        let created = f.manager.create_contract(&client, &draft(), today()).await.unwrap();
        f.store.set_latency(Some(Duration::from_secs(5)));
        let err = f.manager.submit_for_signature(&client, &created).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.kind(), "transient");
    }

    #[tokio::test]
    async fn outsiders_cannot_load() {
        let f = fixture();
        let created = f
            .manager
            .create_contract(&ActorContext::client(1), &draft(), today())
            .await
            .unwrap();
        let err = f
            .manager
            .load(&ActorContext::freelancer(7), created.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "authorization");
        assert!(f.manager.load(&ActorContext::admin(99), created.id).await.is_ok());
    }

    #[tokio::test]
    async fn non_data_url_signature_is_a_validation_error() {
        let f = fixture();
        let client = ActorContext::client(1);
        let created = f.manager.create_contract(&client, &draft(), today()).await.unwrap();
        let pending = f.manager.submit_for_signature(&client, &created).await.unwrap();
        let calls = f.store.calls();
        let err = f.manager.sign(&client, &pending, "my name").await.unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
        assert_eq!(f.store.calls(), calls);
    }

    #[tokio::test]
    async fn listing_is_scoped_and_filtered() {
        let f = fixture();
        let client = ActorContext::client(1);
        let a = f.manager.create_contract(&client, &draft(), today()).await.unwrap();
        f.manager.create_contract(&client, &draft(), today()).await.unwrap();
        f.manager.submit_for_signature(&client, &a).await.unwrap();

        let mut other = draft();
        other.client_id = UserId(3);
        f.manager
            .create_contract(&ActorContext::client(3), &other, today())
            .await
            .unwrap();

        let mine = f.manager.list_contracts(&client, StatusFilter::All).await.unwrap();
        assert_eq!(mine.len(), 2);
        let pending = f
            .manager
            .list_contracts(&client, StatusFilter::Only(ContractStatus::PendingSignature))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        let all = f
            .manager
            .list_contracts(&ActorContext::admin(9), StatusFilter::All)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn only_admins_move_conflicts() {
        let f = fixture();
        let err = f
            .manager
            .update_conflict_status(&ActorContext::client(1), ConflictId(1), ConflictStatus::Resolved)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "authorization");
        let err = f
            .manager
            .update_conflict_status(&ActorContext::admin(9), ConflictId(1), ConflictStatus::Resolved)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}

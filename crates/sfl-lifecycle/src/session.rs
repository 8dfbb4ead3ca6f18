//! A single view of one contract.
//!
//! The session owns the snapshot a user is looking at and serializes the
//! actions taken from it: while one action is in flight every other action
//! fails fast with [`LifecycleError::Busy`]. The snapshot is replaced only
//! by a successful store response, and never after the view is detached.
//!
//! The view lock is held only to copy or swap the snapshot, never across
//! an await.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use sfl_arbitration::{ConflictGroups, ConflictReport};
use sfl_core::{ActorContext, ContractId};
use sfl_state::{Contract, ContractPatch, ContractStatus, Eligibility};

use crate::directory::PartyNames;
use crate::error::LifecycleError;
use crate::manager::{ConflictReported, LifecycleManager, SignOutcome};
use crate::notify::Severity;

fn keep(contract: &Contract) -> Option<Contract> {
    Some(contract.clone())
}

/// Clears the busy flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ContractSession {
    manager: Arc<LifecycleManager>,
    actor: ActorContext,
    view: RwLock<Contract>,
    busy: AtomicBool,
    detached: AtomicBool,
}

impl std::fmt::Debug for ContractSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractSession")
            .field("actor", &self.actor)
            .field("contract", &self.view.read().id)
            .field("busy", &self.is_busy())
            .field("detached", &self.is_detached())
            .finish()
    }
}

impl ContractSession {
    /// Wrap a snapshot the caller already holds.
    pub fn new(manager: Arc<LifecycleManager>, actor: ActorContext, contract: Contract) -> Self {
        Self {
            manager,
            actor,
            view: RwLock::new(contract),
            busy: AtomicBool::new(false),
            detached: AtomicBool::new(false),
        }
    }

    /// Load `id` from the store and open a view on it.
    pub async fn open(
        manager: Arc<LifecycleManager>,
        actor: ActorContext,
        id: ContractId,
    ) -> Result<Self, LifecycleError> {
        let contract = manager.load(&actor, id).await?;
        Ok(Self::new(manager, actor, contract))
    }

    pub fn actor(&self) -> ActorContext {
        self.actor
    }

    /// Copy of the current snapshot.
    pub fn contract(&self) -> Contract {
        self.view.read().clone()
    }

    pub fn status(&self) -> ContractStatus {
        self.view.read().status
    }

    /// Actions the actor may take on the current snapshot.
    pub fn eligibility(&self) -> Eligibility {
        Eligibility::evaluate(&self.view.read(), &self.actor)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Stop applying responses to this view. Actions already in flight run
    /// to completion; their results are returned but not applied.
    pub fn detach(&self) {
        if !self.detached.swap(true, Ordering::AcqRel) {
            tracing::debug!(contract_id = self.view.read().id.get(), "session detached");
        }
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    fn replace(&self, contract: Contract) {
        if self.is_detached() {
            tracing::debug!(contract_id = contract.id.get(), "dropping response for detached view");
            return;
        }
        *self.view.write() = contract;
    }

    async fn run<T, Fut>(
        &self,
        action: &'static str,
        op: impl FnOnce(Arc<LifecycleManager>, ActorContext, Contract) -> Fut,
        updated: impl FnOnce(&T) -> Option<Contract>,
    ) -> Result<T, LifecycleError>
    where
        Fut: Future<Output = Result<T, LifecycleError>>,
    {
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            tracing::debug!(action, "rejected while another action is in flight");
            self.manager.notify(&LifecycleError::Busy.user_message(), Severity::Warning);
            return Err(LifecycleError::Busy);
        };
        let snapshot = self.contract();
        let result = op(self.manager.clone(), self.actor, snapshot).await;
        if let Ok(value) = &result {
            if let Some(contract) = updated(value) {
                self.replace(contract);
            }
        }
        result
    }

    /// Reload the snapshot from the store.
    pub async fn refresh(&self) -> Result<Contract, LifecycleError> {
        self.run(
            "refresh",
            |m, actor, c| async move { m.load(&actor, c.id).await },
            keep,
        )
        .await
    }

    pub async fn update(&self, patch: ContractPatch) -> Result<Contract, LifecycleError> {
        self.run(
            "edit",
            |m, actor, c| async move { m.update_contract(&actor, &c, &patch).await },
            keep,
        )
        .await
    }

    pub async fn submit_for_signature(&self) -> Result<Contract, LifecycleError> {
        self.run(
            "submit_for_signature",
            |m, actor, c| async move { m.submit_for_signature(&actor, &c).await },
            keep,
        )
        .await
    }

    pub async fn reject(&self) -> Result<Contract, LifecycleError> {
        self.run(
            "reject",
            |m, actor, c| async move { m.reject(&actor, &c).await },
            keep,
        )
        .await
    }

    pub async fn propose_changes(&self, patch: ContractPatch) -> Result<Contract, LifecycleError> {
        self.run(
            "propose_changes",
            |m, actor, c| async move { m.propose_changes(&actor, &c, &patch).await },
            keep,
        )
        .await
    }

    pub async fn withdraw(&self, patch: Option<ContractPatch>) -> Result<Contract, LifecycleError> {
        self.run(
            "withdraw",
            |m, actor, c| async move { m.withdraw(&actor, &c, patch.as_ref()).await },
            keep,
        )
        .await
    }

    pub async fn sign(&self, signature_data: String) -> Result<SignOutcome, LifecycleError> {
        self.run(
            "sign",
            |m, actor, c| async move { m.sign(&actor, &c, &signature_data).await },
            |outcome: &SignOutcome| Some(outcome.contract().clone()),
        )
        .await
    }

    pub async fn complete(&self) -> Result<Contract, LifecycleError> {
        self.run(
            "complete",
            |m, actor, c| async move { m.complete(&actor, &c).await },
            keep,
        )
        .await
    }

    pub async fn report_conflict(&self, report: ConflictReport) -> Result<ConflictReported, LifecycleError> {
        self.run(
            "report_conflict",
            |m, actor, c| async move { m.report_conflict(&actor, &c, &report).await },
            |reported: &ConflictReported| Some(reported.contract.clone()),
        )
        .await
    }

    pub async fn override_status(&self, to: ContractStatus) -> Result<Contract, LifecycleError> {
        self.run(
            "override_status",
            |m, actor, c| async move { m.override_status(&actor, &c, to).await },
            keep,
        )
        .await
    }

    /// Delete the contract. A successful delete detaches the view.
    pub async fn delete(&self) -> Result<bool, LifecycleError> {
        let deleted = self
            .run(
                "delete",
                |m, actor, c| async move { m.delete_contract(&actor, &c).await },
                |_: &bool| None,
            )
            .await?;
        self.detach();
        Ok(deleted)
    }

    /// Conflicts on the contract, grouped by the raising party. Read-only:
    /// does not take the busy flag.
    pub async fn conflicts(&self) -> Result<ConflictGroups, LifecycleError> {
        let snapshot = self.contract();
        self.manager.conflicts(&snapshot).await
    }

    pub async fn party_names(&self) -> PartyNames {
        let snapshot = self.contract();
        self.manager.party_names(&snapshot).await
    }
}

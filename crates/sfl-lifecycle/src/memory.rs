//! In-process Contract Store and User Directory backed by `DashMap`.
//!
//! Applies the same store-side rules as the real service: status changes
//! and signatures go through [`sfl_state::apply_status`] and
//! [`sfl_state::apply_signature`] while the entry is exclusively held, so a
//! concurrent pair of signatures cannot both observe a half-signed contract.
//!
//! Failures and latency can be injected for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use sfl_arbitration::{ConflictReport, ConflictStatus, ContractConflict, MIN_DESCRIPTION_LEN};
use sfl_core::{ConflictId, ContractId, Timestamp, UserId};
use sfl_state::{
    apply_signature, apply_status, validation, Contract, ContractDraft, ContractPatch,
    ContractStatus, Party, TransitionError,
};
use sfl_store_client::{NewUser, UserProfile};

use crate::directory::UserDirectory;
use crate::store::{ContractStore, StoreError};

/// Status code for requests that conflict with the contract's state.
const CONFLICT: u16 = 409;
/// Status code for payloads that fail store-side validation.
const UNPROCESSABLE: u16 = 422;

fn rejected(e: TransitionError) -> StoreError {
    StoreError::rejected(CONFLICT, e.to_string())
}

#[derive(Debug, Default)]
pub struct InMemoryContractStore {
    contracts: DashMap<ContractId, Contract>,
    conflicts: DashMap<ConflictId, ContractConflict>,
    next_contract: AtomicU64,
    next_conflict: AtomicU64,
    failures: Mutex<VecDeque<StoreError>>,
    scheduled: Mutex<Vec<(u64, StoreError)>>,
    latency: Mutex<Option<Duration>>,
    calls: AtomicU64,
}

impl InMemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with `error` without touching any state.
    pub fn fail_next(&self, error: StoreError) {
        self.failures.lock().push_back(error);
    }

    /// Make the `nth` call from now fail (1 is the next call). Calls
    /// before it proceed normally.
    pub fn fail_nth(&self, nth: u64, error: StoreError) {
        let at = self.calls() + nth;
        self.scheduled.lock().push((at, error));
    }

    /// Delay every subsequent call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Number of store operations received so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Insert or replace a contract as-is, bypassing every rule.
    pub fn seed_contract(&self, contract: Contract) {
        self.next_contract.fetch_max(contract.id.get(), Ordering::SeqCst);
        self.contracts.insert(contract.id, contract);
    }

    /// Insert or replace a conflict as-is.
    pub fn seed_conflict(&self, conflict: ContractConflict) {
        self.next_conflict.fetch_max(conflict.id.get(), Ordering::SeqCst);
        self.conflicts.insert(conflict.id, conflict);
    }

    /// Every conflict on every contract, ordered by id.
    pub fn all_conflicts(&self) -> Vec<ContractConflict> {
        let mut out: Vec<ContractConflict> = self.conflicts.iter().map(|entry| entry.value().clone()).collect();
        out.sort_by_key(|c| c.id);
        out
    }

    pub fn conflict(&self, id: ConflictId) -> Option<ContractConflict> {
        self.conflicts.get(&id).map(|entry| entry.value().clone())
    }

    /// Snapshot of a stored contract, outside the trait.
    pub fn contract(&self, id: ContractId) -> Option<Contract> {
        self.contracts.get(&id).map(|entry| entry.value().clone())
    }

    async fn enter(&self) -> Result<(), StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let scheduled = {
            let mut scheduled = self.scheduled.lock();
            scheduled
                .iter()
                .position(|(at, _)| *at == call)
                .map(|i| scheduled.swap_remove(i).1)
        };
        if let Some(error) = scheduled {
            return Err(error);
        }
        match self.failures.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn sorted(&self, keep: impl Fn(&Contract) -> bool) -> Vec<Contract> {
        let mut out: Vec<Contract> = self
            .contracts
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        out.sort_by_key(|c| c.id);
        out
    }

    /// Run `f` on the contract while holding its entry exclusively.
    fn modify<T>(
        &self,
        id: ContractId,
        f: impl FnOnce(&mut Contract) -> Result<T, StoreError>,
    ) -> Result<Contract, StoreError> {
        let mut entry = self
            .contracts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(id))?;
        let mut working = entry.value().clone();
        f(&mut working)?;
        *entry.value_mut() = working.clone();
        Ok(working)
    }
}

fn store_validation(contract: &Contract) -> Result<(), StoreError> {
    validation::validate_merged(contract).map_err(|errors| StoreError::rejected(UNPROCESSABLE, errors.to_string()))
}

#[async_trait]
impl ContractStore for InMemoryContractStore {
    async fn list_contracts(&self) -> Result<Vec<Contract>, StoreError> {
        self.enter().await?;
        Ok(self.sorted(|_| true))
    }

    async fn list_contracts_by_client(&self, client: UserId) -> Result<Vec<Contract>, StoreError> {
        self.enter().await?;
        Ok(self.sorted(|c| c.client_id == client))
    }

    async fn list_contracts_by_freelancer(&self, freelancer: UserId) -> Result<Vec<Contract>, StoreError> {
        self.enter().await?;
        Ok(self.sorted(|c| c.freelancer_id == freelancer))
    }

    async fn get_contract(&self, id: ContractId) -> Result<Contract, StoreError> {
        self.enter().await?;
        self.contract(id).ok_or_else(|| StoreError::not_found(id))
    }

    async fn create_contract(&self, draft: &ContractDraft) -> Result<Contract, StoreError> {
        self.enter().await?;
        let id = ContractId(self.next_contract.fetch_add(1, Ordering::SeqCst) + 1);
        let contract = Contract::from_draft(id, draft.clone(), Timestamp::now());
        store_validation(&contract)?;
        self.contracts.insert(id, contract.clone());
        tracing::debug!(contract_id = %id, "contract created");
        Ok(contract)
    }

    async fn update_contract(&self, id: ContractId, patch: &ContractPatch) -> Result<Contract, StoreError> {
        self.enter().await?;
        self.modify(id, |contract| {
            if contract.status.is_terminal() {
                return Err(StoreError::rejected(
                    CONFLICT,
                    format!("{id} is {} and can no longer be edited", contract.status),
                ));
            }
            let mut merged = contract.merged_with(patch);
            if let Some(to) = patch.status {
                apply_status(&mut merged, to).map_err(rejected)?;
            }
            store_validation(&merged)?;
            *contract = merged;
            Ok(())
        })
    }

    async fn set_status(&self, id: ContractId, status: ContractStatus) -> Result<Contract, StoreError> {
        self.enter().await?;
        self.modify(id, |contract| apply_status(contract, status).map_err(rejected))
    }

    async fn sign(&self, id: ContractId, role: Party, signature_data: &str) -> Result<Contract, StoreError> {
        self.enter().await?;
        self.modify(id, |contract| {
            apply_signature(contract, role, signature_data, Timestamp::now()).map_err(rejected)
        })
    }

    async fn delete_contract(&self, id: ContractId) -> Result<bool, StoreError> {
        self.enter().await?;
        let removed = self.contracts.remove(&id).is_some();
        if removed {
            self.conflicts.retain(|_, c| c.contract_id != Some(id));
        }
        Ok(removed)
    }

    async fn list_conflicts(&self, contract: ContractId) -> Result<Vec<ContractConflict>, StoreError> {
        self.enter().await?;
        let mut out: Vec<ContractConflict> = self
            .conflicts
            .iter()
            .filter(|entry| entry.value().contract_id == Some(contract))
            .map(|entry| entry.value().clone())
            .collect();
        out.sort_by_key(|c| c.id);
        Ok(out)
    }

    async fn report_conflict(
        &self,
        contract_id: ContractId,
        report: &ConflictReport,
    ) -> Result<ContractConflict, StoreError> {
        self.enter().await?;
        let contract = self
            .contract(contract_id)
            .ok_or_else(|| StoreError::not_found(contract_id))?;
        if !matches!(
            contract.status,
            ContractStatus::Active | ContractStatus::InConflict
        ) {
            return Err(StoreError::rejected(
                CONFLICT,
                format!("conflicts cannot be raised while {contract_id} is {}", contract.status),
            ));
        }
        if contract.party_for_user(report.raised_by_id).is_none() {
            return Err(StoreError::rejected(
                UNPROCESSABLE,
                format!("{} is not a party to {contract_id}", report.raised_by_id),
            ));
        }
        if !report.reason.is_listed() {
            return Err(StoreError::rejected(UNPROCESSABLE, "Please select a reason."));
        }
        if report.description.trim().chars().count() < MIN_DESCRIPTION_LEN {
            return Err(StoreError::rejected(
                UNPROCESSABLE,
                format!("Please provide at least {MIN_DESCRIPTION_LEN} characters of detail."),
            ));
        }

        let id = ConflictId(self.next_conflict.fetch_add(1, Ordering::SeqCst) + 1);
        let conflict = ContractConflict::open(id, contract_id, report.clone(), Timestamp::now());
        self.conflicts.insert(id, conflict.clone());
        Ok(conflict)
    }

    async fn update_conflict_status(
        &self,
        id: ConflictId,
        status: ConflictStatus,
    ) -> Result<ContractConflict, StoreError> {
        self.enter().await?;
        let mut entry = self
            .conflicts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(id))?;
        entry
            .value_mut()
            .apply_status(status, Timestamp::now())
            .map_err(|e| StoreError::rejected(CONFLICT, e.to_string()))?;
        Ok(entry.value().clone())
    }
}

// ─── Users ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: DashMap<UserId, UserProfile>,
    next_user: AtomicU64,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user and return the stored profile with its new id.
    pub fn create(&self, user: NewUser) -> UserProfile {
        let id = UserId(self.next_user.fetch_add(1, Ordering::SeqCst) + 1);
        let profile = UserProfile {
            id,
            first_name: user.first_name,
            last_name: user.last_name,
            role: Some(user.role),
            email: Some(user.email),
        };
        self.users.insert(id, profile.clone());
        profile
    }

    /// Insert or replace a profile under its own id.
    pub fn insert(&self, profile: UserProfile) {
        self.next_user.fetch_max(profile.id.get(), Ordering::SeqCst);
        self.users.insert(profile.id, profile);
    }

    pub fn get(&self, id: UserId) -> Option<UserProfile> {
        self.users.get(&id).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sfl_arbitration::ConflictReason;
    use sfl_core::Amount;
    use std::sync::Arc;

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

    async fn pending(store: &InMemoryContractStore) -> Contract {
        let c = store.create_contract(&draft()).await.unwrap();
        store.set_status(c.id, ContractStatus::PendingSignature).await.unwrap()
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially() {
        let store = InMemoryContractStore::new();
        let a = store.create_contract(&draft()).await.unwrap();
        let b = store.create_contract(&draft()).await.unwrap();
        assert_eq!(a.id, ContractId(1));
        assert_eq!(b.id, ContractId(2));
        assert_eq!(a.status, ContractStatus::Draft);
        assert!(a.created_at.is_some());
    }

    #[tokio::test]
    async fn invalid_create_is_unprocessable() {
        let store = InMemoryContractStore::new();
        let mut d = draft();
        d.end_date = d.start_date;
        let err = store.create_contract(&d).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 422, .. }));
        assert!(store.list_contracts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_signatures_activate_exactly_once() {
        let store = Arc::new(InMemoryContractStore::new());
        let c = pending(&store).await;

        let (a, b) = tokio::join!(
            {
                let store = store.clone();
                async move { store.sign(c.id, Party::Client, "data:image/png;base64,QQ==").await }
            },
            {
                let store = store.clone();
                async move { store.sign(c.id, Party::Freelancer, "data:image/png;base64,Qg==").await }
            }
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        let active = [&a, &b]
            .iter()
            .filter(|c| c.status == ContractStatus::Active)
            .count();
        assert_eq!(active, 1);
        let stored = store.contract(c.id).unwrap();
        assert_eq!(stored.status, ContractStatus::Active);
        assert!(stored.signed_at.is_some());
    }

    #[tokio::test]
    async fn injected_failure_leaves_state_untouched() {
        let store = InMemoryContractStore::new();
        let c = store.create_contract(&draft()).await.unwrap();
        store.fail_next(StoreError::unavailable("boom"));
        assert!(store.set_status(c.id, ContractStatus::PendingSignature).await.is_err());
        assert_eq!(store.contract(c.id).unwrap(), c);
        assert!(store.set_status(c.id, ContractStatus::PendingSignature).await.is_ok());
    }

    #[tokio::test]
    async fn propose_changes_patch_resets_to_draft_and_clears_signatures() {
        let store = InMemoryContractStore::new();
        let c = pending(&store).await;
        store.sign(c.id, Party::Client, "data:image/png;base64,QQ==").await.unwrap();
        let patch = ContractPatch {
            amount: Some(Amount::from_major_units(650)),
            status: Some(ContractStatus::Draft),
            ..ContractPatch::default()
        };
        let updated = store.update_contract(c.id, &patch).await.unwrap();
        assert_eq!(updated.status, ContractStatus::Draft);
        assert_eq!(updated.amount, Amount::from_major_units(650));
        assert!(updated.client_signature_url.is_none());
    }

    #[tokio::test]
    async fn conflicts_require_an_active_contract_and_a_party() {
        let store = InMemoryContractStore::new();
        let c = store.create_contract(&draft()).await.unwrap();
        let report = ConflictReport::new(
            2,
            ConflictReason::PaymentDispute,
            "Invoice for milestone one is unpaid.",
            None,
        );
        let err = store.report_conflict(c.id, &report).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 409, .. }));

        let mut active = c.clone();
        active.status = ContractStatus::Active;
        active.client_signature_url = Some("data:image/png;base64,QQ==".into());
        active.freelancer_signature_url = Some("data:image/png;base64,Qg==".into());
        store.seed_contract(active);

        let conflict = store.report_conflict(c.id, &report).await.unwrap();
        assert_eq!(conflict.status, ConflictStatus::Open);
        assert_eq!(store.list_conflicts(c.id).await.unwrap().len(), 1);

        let outsider = ConflictReport::new(9, ConflictReason::Other, "x".repeat(25), None);
        assert!(matches!(
            store.report_conflict(c.id, &outsider).await,
            Err(StoreError::Rejected { status: 422, .. })
        ));
    }

    #[tokio::test]
    async fn deleting_a_contract_drops_its_conflicts() {
        let store = InMemoryContractStore::new();
        let c = store.create_contract(&draft()).await.unwrap();
        let report = ConflictReport::new(1, ConflictReason::Other, "Something substantial went wrong.", None);
        store.seed_conflict(ContractConflict::open(ConflictId(5), c.id, report, Timestamp::now()));
        assert!(store.delete_contract(c.id).await.unwrap());
        assert!(!store.delete_contract(c.id).await.unwrap());
        assert!(store.list_conflicts(c.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn directory_assigns_ids() {
        let dir = InMemoryUserDirectory::new();
        let user = dir.create(NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: "FREELANCER".into(),
            email: "ada@example.com".into(),
        });
        assert_eq!(user.id, UserId(1));
        assert_eq!(dir.get_user(UserId(1)).await.unwrap(), Some(user));
        assert_eq!(dir.get_user(UserId(2)).await.unwrap(), None);
    }
}

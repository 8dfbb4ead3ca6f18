//! The Contract Store seam.
//!
//! Implemented over HTTP by [`sfl_store_client::StoreClient`] (see
//! `http.rs`) and in process by [`crate::memory::InMemoryContractStore`].
//! The store owns contract state: status changes and signatures are atomic
//! read-modify-writes on its side.

use async_trait::async_trait;
use thiserror::Error;

use sfl_arbitration::{ConflictReport, ConflictStatus, ContractConflict};
use sfl_core::{ConflictId, ContractId, UserId};
use sfl_state::{Contract, ContractDraft, ContractPatch, ContractStatus, Party};

/// A failed store operation, independent of transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("{what} not found")]
    NotFound { what: String },

    /// The store refused the request.
    #[error("store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The store could not be reached or failed internally.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// The store answered with something that is not the expected shape.
    #[error("malformed store response: {message}")]
    Malformed { message: String },
}

impl StoreError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound {
            what: what.to_string(),
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Contract Store operations.
#[async_trait]
pub trait ContractStore: Send + Sync + 'static {
    async fn list_contracts(&self) -> Result<Vec<Contract>, StoreError>;

    async fn list_contracts_by_client(&self, client: UserId) -> Result<Vec<Contract>, StoreError>;

    async fn list_contracts_by_freelancer(
        &self,
        freelancer: UserId,
    ) -> Result<Vec<Contract>, StoreError>;

    async fn get_contract(&self, id: ContractId) -> Result<Contract, StoreError>;

    async fn create_contract(&self, draft: &ContractDraft) -> Result<Contract, StoreError>;

    async fn update_contract(
        &self,
        id: ContractId,
        patch: &ContractPatch,
    ) -> Result<Contract, StoreError>;

    async fn set_status(&self, id: ContractId, status: ContractStatus) -> Result<Contract, StoreError>;

    /// Record a signature. The store decides whether it completes the pair.
    async fn sign(&self, id: ContractId, role: Party, signature_data: &str) -> Result<Contract, StoreError>;

    /// `Ok(false)` when there was nothing to delete.
    async fn delete_contract(&self, id: ContractId) -> Result<bool, StoreError>;

    async fn list_conflicts(&self, contract: ContractId) -> Result<Vec<ContractConflict>, StoreError>;

    async fn report_conflict(
        &self,
        contract: ContractId,
        report: &ConflictReport,
    ) -> Result<ContractConflict, StoreError>;

    async fn update_conflict_status(
        &self,
        id: ConflictId,
        status: ConflictStatus,
    ) -> Result<ContractConflict, StoreError>;
}

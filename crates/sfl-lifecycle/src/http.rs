//! Store and directory seams over the HTTP gateway client.

use async_trait::async_trait;

use sfl_arbitration::{ConflictReport, ConflictStatus, ContractConflict};
use sfl_core::{ConflictId, ContractId, UserId};
use sfl_state::{Contract, ContractDraft, ContractPatch, ContractStatus, Party};
use sfl_store_client::{StoreApiError, StoreClient, UserProfile};

use crate::directory::UserDirectory;
use crate::store::{ContractStore, StoreError};

impl From<StoreApiError> for StoreError {
    fn from(e: StoreApiError) -> Self {
        match e {
            StoreApiError::NotFound { endpoint } => StoreError::NotFound { what: endpoint },
            StoreApiError::ApiError { status, body, .. } => StoreError::Rejected {
                status,
                message: extract_message(&body),
            },
            StoreApiError::Deserialization { endpoint, source } => StoreError::Malformed {
                message: format!("{endpoint}: {source}"),
            },
            e @ StoreApiError::Http { .. } => StoreError::Unavailable {
                message: e.to_string(),
            },
            e @ StoreApiError::Config(_) => StoreError::Unavailable {
                message: e.to_string(),
            },
        }
    }
}

/// Pull the human message out of an error body.
///
/// Accepts a plain string, `{"message": ...}`, `{"error": "..."}` or
/// `{"error": {"message": ...}}`. Anything else yields the raw body.
pub fn extract_message(body: &str) -> String {
    let trimmed = body.trim();
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return trimmed.to_string();
    };
    let from_object = |v: &serde_json::Value| -> Option<String> {
        if let Some(message) = v.get("message").and_then(|m| m.as_str()) {
            return Some(message.to_string());
        }
        match v.get("error") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(inner) => inner.get("message").and_then(|m| m.as_str()).map(str::to_string),
            None => None,
        }
    };
    match &value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(_) => from_object(&value).unwrap_or_else(|| trimmed.to_string()),
        _ => trimmed.to_string(),
    }
}

fn found<T>(what: String, value: Option<T>) -> Result<T, StoreError> {
    value.ok_or(StoreError::NotFound { what })
}

#[async_trait]
impl ContractStore for StoreClient {
    async fn list_contracts(&self) -> Result<Vec<Contract>, StoreError> {
        Ok(self.contracts().list().await?)
    }

    async fn list_contracts_by_client(&self, client: UserId) -> Result<Vec<Contract>, StoreError> {
        Ok(self.contracts().list_by_client(client).await?)
    }

    async fn list_contracts_by_freelancer(&self, freelancer: UserId) -> Result<Vec<Contract>, StoreError> {
        Ok(self.contracts().list_by_freelancer(freelancer).await?)
    }

    async fn get_contract(&self, id: ContractId) -> Result<Contract, StoreError> {
        found(id.to_string(), self.contracts().get(id).await?)
    }

    async fn create_contract(&self, draft: &ContractDraft) -> Result<Contract, StoreError> {
        Ok(self.contracts().create(draft).await?)
    }

    async fn update_contract(&self, id: ContractId, patch: &ContractPatch) -> Result<Contract, StoreError> {
        Ok(self.contracts().update(id, patch).await?)
    }

    async fn set_status(&self, id: ContractId, status: ContractStatus) -> Result<Contract, StoreError> {
        Ok(self.contracts().set_status(id, status).await?)
    }

    async fn sign(&self, id: ContractId, role: Party, signature_data: &str) -> Result<Contract, StoreError> {
        Ok(self.contracts().sign(id, role, signature_data).await?)
    }

    async fn delete_contract(&self, id: ContractId) -> Result<bool, StoreError> {
        Ok(self.contracts().delete(id).await?)
    }

    async fn list_conflicts(&self, contract: ContractId) -> Result<Vec<ContractConflict>, StoreError> {
        Ok(self.conflicts().list_for_contract(contract).await?)
    }

    async fn report_conflict(
        &self,
        contract: ContractId,
        report: &ConflictReport,
    ) -> Result<ContractConflict, StoreError> {
        Ok(self.conflicts().report(contract, report).await?)
    }

    async fn update_conflict_status(
        &self,
        id: ConflictId,
        status: ConflictStatus,
    ) -> Result<ContractConflict, StoreError> {
        Ok(self.conflicts().update_status(id, status).await?)
    }
}

#[async_trait]
impl UserDirectory for StoreClient {
    async fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.users().get(id).await?)
    }
}

//! Typed client for the Contract Store's contract resource.
//!
//! ## Paths (relative to the gateway)
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/contract/api/contracts` | List all |
//! | GET    | `/contract/api/contracts/client/{id}` | List by client |
//! | GET    | `/contract/api/contracts/freelancer/{id}` | List by freelancer |
//! | GET    | `/contract/api/contracts/{id}` | Get by id |
//! | POST   | `/contract/api/contracts` | Create |
//! | PUT    | `/contract/api/contracts/{id}` | Partial update |
//! | PATCH  | `/contract/api/contracts/{id}/status?status=` | Set status |
//! | PATCH  | `/contract/api/contracts/{id}/sign` | Sign |
//! | DELETE | `/contract/api/contracts/{id}` | Delete |

use sfl_core::{ContractId, UserId};
use sfl_state::{Contract, ContractDraft, ContractPatch, ContractStatus, Party};

use crate::error::StoreApiError;
use crate::response;
use crate::retry::{self, ReadRetry};
use crate::types::SignRequest;

/// Context path of the contract service.
const API_PREFIX: &str = "contract/api/contracts";

/// Client for the contract resource.
#[derive(Debug, Clone)]
pub struct ContractClient {
    http: reqwest::Client,
    base_url: String,
    reads: ReadRetry,
}

impl ContractClient {
    pub(crate) fn new(http: reqwest::Client, base_url: String, reads: ReadRetry) -> Self {
        Self {
            http,
            base_url,
            reads,
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/{API_PREFIX}{suffix}", self.base_url)
    }

    async fn list_at(&self, endpoint: &str, url: String) -> Result<Vec<Contract>, StoreApiError> {
        let resp = retry::get(&self.http, self.reads, endpoint, &url).await?;
        response::json(endpoint, resp).await
    }

    /// `GET /contracts`.
    pub async fn list(&self) -> Result<Vec<Contract>, StoreApiError> {
        self.list_at("GET /contracts", self.url("")).await
    }

    /// `GET /contracts/client/{id}`.
    pub async fn list_by_client(&self, client: UserId) -> Result<Vec<Contract>, StoreApiError> {
        let endpoint = format!("GET /contracts/client/{}", client.get());
        self.list_at(&endpoint, self.url(&format!("/client/{}", client.get()))).await
    }

    /// `GET /contracts/freelancer/{id}`.
    pub async fn list_by_freelancer(&self, freelancer: UserId) -> Result<Vec<Contract>, StoreApiError> {
        let endpoint = format!("GET /contracts/freelancer/{}", freelancer.get());
        self.list_at(&endpoint, self.url(&format!("/freelancer/{}", freelancer.get())))
            .await
    }

    /// `GET /contracts/{id}`. Returns `None` on 404.
    pub async fn get(&self, id: ContractId) -> Result<Option<Contract>, StoreApiError> {
        let endpoint = format!("GET /contracts/{}", id.get());
        let url = self.url(&format!("/{}", id.get()));
        let resp = retry::get(&self.http, self.reads, &endpoint, &url).await?;
        response::optional_json(&endpoint, resp).await
    }

    /// `POST /contracts`. Sent once.
    pub async fn create(&self, draft: &ContractDraft) -> Result<Contract, StoreApiError> {
        let endpoint = "POST /contracts";
        let resp = self
            .http
            .post(self.url(""))
            .json(draft)
            .send()
            .await
            .map_err(response::transport(endpoint))?;
        response::json(endpoint, resp).await
    }

    /// `PUT /contracts/{id}` with a partial body. Sent once.
    pub async fn update(&self, id: ContractId, patch: &ContractPatch) -> Result<Contract, StoreApiError> {
        let endpoint = format!("PUT /contracts/{}", id.get());
        let resp = self
            .http
            .put(self.url(&format!("/{}", id.get())))
            .json(patch)
            .send()
            .await
            .map_err(response::transport(&endpoint))?;
        response::json(&endpoint, resp).await
    }

    /// `PATCH /contracts/{id}/status?status=…`. Sent once.
    pub async fn set_status(&self, id: ContractId, status: ContractStatus) -> Result<Contract, StoreApiError> {
        let endpoint = format!("PATCH /contracts/{}/status", id.get());
        let resp = self
            .http
            .patch(self.url(&format!("/{}/status", id.get())))
            .query(&[("status", status.as_str())])
            .send()
            .await
            .map_err(response::transport(&endpoint))?;
        response::json(&endpoint, resp).await
    }

    /// `PATCH /contracts/{id}/sign`. Sent once; the store decides whether
    /// this signature activates the contract.
    pub async fn sign(&self, id: ContractId, role: Party, signature_data: &str) -> Result<Contract, StoreApiError> {
        let endpoint = format!("PATCH /contracts/{}/sign", id.get());
        let body = SignRequest {
            role,
            signature_data: signature_data.to_string(),
        };
        let resp = self
            .http
            .patch(self.url(&format!("/{}/sign", id.get())))
            .json(&body)
            .send()
            .await
            .map_err(response::transport(&endpoint))?;
        response::json(&endpoint, resp).await
    }

    /// `DELETE /contracts/{id}`. `Ok(false)` when the contract did not exist.
    pub async fn delete(&self, id: ContractId) -> Result<bool, StoreApiError> {
        let endpoint = format!("DELETE /contracts/{}", id.get());
        let resp = self
            .http
            .delete(self.url(&format!("/{}", id.get())))
            .send()
            .await
            .map_err(response::transport(&endpoint))?;
        match response::check(&endpoint, resp).await {
            Ok(_) => Ok(true),
            Err(StoreApiError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

//! Typed client for the Contract Store's conflict resource.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/contract/api/conflicts` | List all (admin) |
//! | GET    | `/contract/api/conflicts/{id}` | Get by id |
//! | GET    | `/contract/api/conflicts/contract/{id}` | List for a contract |
//! | POST   | `/contract/api/conflicts/contract/{id}` | Report |
//! | PUT    | `/contract/api/conflicts/{id}/status?status=` | Update status (admin) |

use sfl_arbitration::{ConflictReport, ConflictStatus, ContractConflict};
use sfl_core::{ConflictId, ContractId};

use crate::error::StoreApiError;
use crate::response;
use crate::retry::{self, ReadRetry};

const API_PREFIX: &str = "contract/api/conflicts";

/// Client for the conflict resource.
#[derive(Debug, Clone)]
pub struct ConflictClient {
    http: reqwest::Client,
    base_url: String,
    reads: ReadRetry,
}

impl ConflictClient {
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

    /// `GET /conflicts`.
    pub async fn list(&self) -> Result<Vec<ContractConflict>, StoreApiError> {
        let endpoint = "GET /conflicts";
        let url = self.url("");
        let resp = retry::get(&self.http, self.reads, endpoint, &url).await?;
        response::json(endpoint, resp).await
    }

    /// `GET /conflicts/{id}`. Returns `None` on 404.
    pub async fn get(&self, id: ConflictId) -> Result<Option<ContractConflict>, StoreApiError> {
        let endpoint = format!("GET /conflicts/{}", id.get());
        let url = self.url(&format!("/{}", id.get()));
        let resp = retry::get(&self.http, self.reads, &endpoint, &url).await?;
        response::optional_json(&endpoint, resp).await
    }

    /// `GET /conflicts/contract/{id}`.
    pub async fn list_for_contract(&self, contract: ContractId) -> Result<Vec<ContractConflict>, StoreApiError> {
        let endpoint = format!("GET /conflicts/contract/{}", contract.get());
        let url = self.url(&format!("/contract/{}", contract.get()));
        let resp = retry::get(&self.http, self.reads, &endpoint, &url).await?;
        response::json(&endpoint, resp).await
    }

    /// `POST /conflicts/contract/{id}`. Sent once.
    pub async fn report(
        &self,
        contract: ContractId,
        report: &ConflictReport,
    ) -> Result<ContractConflict, StoreApiError> {
        let endpoint = format!("POST /conflicts/contract/{}", contract.get());
        let resp = self
            .http
            .post(self.url(&format!("/contract/{}", contract.get())))
            .json(report)
            .send()
            .await
            .map_err(response::transport(&endpoint))?;
        response::json(&endpoint, resp).await
    }

    /// `PUT /conflicts/{id}/status?status=…`. Sent once.
    pub async fn update_status(
        &self,
        id: ConflictId,
        status: ConflictStatus,
    ) -> Result<ContractConflict, StoreApiError> {
        let endpoint = format!("PUT /conflicts/{}/status", id.get());
        let resp = self
            .http
            .put(self.url(&format!("/{}/status", id.get())))
            .query(&[("status", status.as_str())])
            .send()
            .await
            .map_err(response::transport(&endpoint))?;
        response::json(&endpoint, resp).await
    }
}

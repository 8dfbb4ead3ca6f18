//! # sfl-store-client: Typed client for the Contract Store
//!
//! Access to the marketplace backend through its API gateway:
//! - **Contracts** via `{gateway}/contract/api/contracts`
//! - **Conflicts** via `{gateway}/contract/api/conflicts`
//! - **Users** via `{gateway}/user/api/users`
//!
//! ## Request Policy
//!
//! Reads are retried on transport failures and gateway errors (502, 503,
//! 504) with exponential backoff, within the request timeout.
//! Mutations (create, update, status, sign, report, delete) are sent exactly
//! once; a failed mutation is surfaced to the caller, which decides whether
//! to try again.
//!
//! This crate applies no lifecycle rules. Status codes are passed through in
//! [`StoreApiError`] for the caller to classify.

pub mod config;
pub mod conflicts;
pub mod contracts;
pub mod error;
pub(crate) mod response;
pub(crate) mod retry;
pub mod types;
pub mod users;

pub use config::StoreApiConfig;
pub use error::StoreApiError;
pub use types::{NewUser, SignRequest, UserProfile};

use std::time::Duration;

/// Top-level store client. Holds one sub-client per resource.
#[derive(Debug, Clone)]
pub struct StoreClient {
    contracts: contracts::ContractClient,
    conflicts: conflicts::ConflictClient,
    users: users::UserClient,
}

impl StoreClient {
    /// Create a new client from configuration.
    pub fn new(config: StoreApiConfig) -> Result<Self, StoreApiError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| StoreApiError::Config(config::ConfigError::InvalidToken))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| StoreApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        let base = config.base();
        let reads = retry::ReadRetry::within(Duration::from_secs(config.timeout_secs));
        Ok(Self {
            contracts: contracts::ContractClient::new(http.clone(), base.clone(), reads),
            conflicts: conflicts::ConflictClient::new(http.clone(), base.clone(), reads),
            users: users::UserClient::new(http, base, reads),
        })
    }

    /// Access the contract client.
    pub fn contracts(&self) -> &contracts::ContractClient {
        &self.contracts
    }

    /// Access the conflict client.
    pub fn conflicts(&self) -> &conflicts::ConflictClient {
        &self.conflicts
    }

    /// Access the User Directory client.
    pub fn users(&self) -> &users::UserClient {
        &self.users
    }
}

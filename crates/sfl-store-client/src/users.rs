//! Typed client for the User Directory.

use sfl_core::UserId;

use crate::error::StoreApiError;
use crate::response;
use crate::retry::{self, ReadRetry};
use crate::types::{NewUser, UserProfile};

const API_PREFIX: &str = "user/api/users";

#[derive(Debug, Clone)]
pub struct UserClient {
    http: reqwest::Client,
    base_url: String,
    reads: ReadRetry,
}

impl UserClient {
    pub(crate) fn new(http: reqwest::Client, base_url: String, reads: ReadRetry) -> Self {
        Self {
            http,
            base_url,
            reads,
        }
    }

    /// `GET /user/api/users/{id}`. Returns `None` on 404.
    pub async fn get(&self, id: UserId) -> Result<Option<UserProfile>, StoreApiError> {
        let endpoint = format!("GET /users/{}", id.get());
        let url = format!("{}/{API_PREFIX}/{}", self.base_url, id.get());
        let resp = retry::get(&self.http, self.reads, &endpoint, &url).await?;
        response::optional_json(&endpoint, resp).await
    }

    /// `POST /user/api/users`.
    pub async fn create(&self, user: &NewUser) -> Result<UserProfile, StoreApiError> {
        let endpoint = "POST /users";
        let resp = self
            .http
            .post(format!("{}/{API_PREFIX}", self.base_url))
            .json(user)
            .send()
            .await
            .map_err(response::transport(endpoint))?;
        response::json(endpoint, resp).await
    }
}

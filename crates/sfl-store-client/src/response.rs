//! Shared response handling for every sub-client.

use serde::de::DeserializeOwned;

use crate::error::StoreApiError;

/// Map a transport failure onto [`StoreApiError::Http`].
pub(crate) fn transport(endpoint: &str) -> impl FnOnce(reqwest::Error) -> StoreApiError + '_ {
    move |source| StoreApiError::Http {
        endpoint: endpoint.to_string(),
        source,
    }
}

/// Turn a non-2xx response into an error, passing 2xx through.
pub(crate) async fn check(endpoint: &str, resp: reqwest::Response) -> Result<reqwest::Response, StoreApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(StoreApiError::NotFound {
            endpoint: endpoint.to_string(),
        });
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(endpoint, status = status.as_u16(), "store returned an error status");
    Err(StoreApiError::ApiError {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// Check the status, then decode the JSON body.
pub(crate) async fn json<T: DeserializeOwned>(endpoint: &str, resp: reqwest::Response) -> Result<T, StoreApiError> {
    check(endpoint, resp)
        .await?
        .json()
        .await
        .map_err(|source| StoreApiError::Deserialization {
            endpoint: endpoint.to_string(),
            source,
        })
}

/// Like [`json`] but maps 404 to `None`.
pub(crate) async fn optional_json<T: DeserializeOwned>(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<Option<T>, StoreApiError> {
    match json(endpoint, resp).await {
        Ok(value) => Ok(Some(value)),
        Err(StoreApiError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

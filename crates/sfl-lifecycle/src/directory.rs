//! User Directory seam and party-name resolution.
//!
//! Names are decoration. A lookup that fails or finds nobody degrades to
//! the raw id (`#42`) and never fails a lifecycle action.

use async_trait::async_trait;

use sfl_core::UserId;
use sfl_state::Contract;
use sfl_store_client::UserProfile;

use crate::store::StoreError;

#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// `Ok(None)` when the user does not exist.
    async fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StoreError>;
}

/// Display names for both parties of a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyNames {
    pub client: String,
    pub freelancer: String,
}

/// Fallback label for a user whose name is unknown.
pub fn fallback_name(id: UserId) -> String {
    format!("#{}", id.get())
}

/// Resolve one user's display name, degrading to [`fallback_name`].
pub async fn display_name(directory: &dyn UserDirectory, id: UserId) -> String {
    match directory.get_user(id).await {
        Ok(Some(profile)) => profile.display_name().unwrap_or_else(|| fallback_name(id)),
        Ok(None) => {
            tracing::debug!(user = %id, "user not found in directory");
            fallback_name(id)
        }
        Err(e) => {
            tracing::warn!(user = %id, error = %e, "user lookup failed, using id");
            fallback_name(id)
        }
    }
}

/// Resolve both party names concurrently.
pub async fn resolve_party_names(directory: &dyn UserDirectory, contract: &Contract) -> PartyNames {
    let (client, freelancer) = tokio::join!(
        display_name(directory, contract.client_id),
        display_name(directory, contract.freelancer_id),
    );
    PartyNames { client, freelancer }
}

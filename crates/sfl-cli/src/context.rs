//! Acting user, backend wiring and console output.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;

use sfl_core::{ActorContext, Role, UserId};
use sfl_lifecycle::{LifecycleConfig, LifecycleManager, NotificationSink, Severity};
use sfl_store_client::{StoreApiConfig, StoreClient};

/// Who the command acts as, and where the store is.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Acting user id.
    #[arg(long = "as-user", global = true, default_value_t = 1)]
    pub user: u64,

    /// Acting user role: client, freelancer or admin.
    #[arg(long = "as-role", global = true, default_value = "client")]
    pub role: Role,

    /// Gateway base URL. Overrides `SFL_GATEWAY_URL`.
    #[arg(long, global = true)]
    pub gateway: Option<String>,
}

impl GlobalArgs {
    pub fn actor(&self) -> ActorContext {
        ActorContext::new(UserId(self.user), self.role)
    }
}

/// Prints notifications to stderr, keeping stdout for command output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, message: &str, severity: Severity) {
        eprintln!("[{severity}] {message}");
    }
}

/// Everything a command needs.
pub struct Context {
    pub actor: ActorContext,
    pub client: StoreClient,
    pub manager: Arc<LifecycleManager>,
}

impl Context {
    pub fn connect(args: &GlobalArgs) -> Result<Self> {
        let mut config = StoreApiConfig::from_env().context("reading store configuration")?;
        if let Some(raw) = &args.gateway {
            config.gateway_url = StoreApiConfig::with_gateway(raw)?.gateway_url;
        }
        tracing::debug!(?config, "connecting to store");

        let client = StoreClient::new(config).context("building store client")?;
        let store = Arc::new(client.clone());
        let manager = Arc::new(LifecycleManager::new(
            store.clone(),
            store,
            Arc::new(ConsoleSink),
            LifecycleConfig::from_env(),
        ));
        Ok(Self {
            actor: args.actor(),
            client,
            manager,
        })
    }
}

//! Contract Store stub server.
//!
//! Serves the contract, conflict and user endpoints that `sfl-store-client`
//! calls, backed by the in-memory store from `sfl-lifecycle`. The store
//! applies the same status, signature and conflict rules as the real
//! service, so lifecycle flows can be exercised end to end without it.
//!
//! Data lives in memory only and is lost on restart.

mod error;
mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("SFL_STUB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8078);

    let app = routes::router(state::AppState::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("sfl-store-stub listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;
    Ok(())
}

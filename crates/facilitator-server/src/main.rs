//! Server binary for the Arctic Echo facilitator backend.
//!
//! Wires configuration, logging, storage, the broadcast hub and the HTTP
//! API together and serves until `Ctrl-C` or `SIGTERM`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`facilitator.toml`, `.env`, `FACILITATOR__*`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the store: `PostgreSQL` (with migrations) or in-memory
//! 4. Create the broadcast hub and core services
//! 5. Serve the API until a shutdown signal arrives
//! 6. Close the hub (ending every socket), then the pool

mod config;
mod error;

use std::sync::Arc;

use anyhow::Context;
use facilitator_api::{AppState, start_server};
use facilitator_core::{BroadcastHub, Services, Stores};
use facilitator_db::PostgresPool;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{DatabaseSection, FacilitatorConfig, LogSection};
use crate::error::ServerError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = FacilitatorConfig::load()
        .map_err(ServerError::from)
        .context("failed to load configuration")?;
    init_tracing(&config.log).context("failed to initialize logging")?;

    info!(
        host = %config.server.host,
        port = config.server.port,
        "facilitator-server starting"
    );

    run(config).await.context("server failed")?;

    info!("facilitator-server stopped");
    Ok(())
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence over
/// the configured filter.
fn init_tracing(log: &LogSection) -> Result<(), ServerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&log.filter).map_err(|e| ServerError::Logging {
            message: format!("invalid log filter {:?}: {e}", log.filter),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if log.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ServerError::Logging {
        message: e.to_string(),
    })
}

async fn run(config: FacilitatorConfig) -> Result<(), ServerError> {
    let (stores, pool) = open_stores(&config.database).await?;

    let hub = Arc::new(BroadcastHub::new());
    let services = Services::new(stores, Arc::clone(&hub), &config.auth.to_auth_config());
    let state = Arc::new(AppState::new(services));

    let shutdown = {
        let hub = Arc::clone(&hub);
        async move {
            shutdown_signal().await;
            hub.close().await;
        }
    };
    let served = start_server(&config.server.to_server_config(), state, shutdown).await;

    hub.close().await;
    if let Some(pool) = pool {
        pool.close().await;
    }
    served?;
    Ok(())
}

/// Open the configured store. Returns the pool as well when `PostgreSQL`
/// backs the stores, so it can be closed on shutdown.
async fn open_stores(
    database: &DatabaseSection,
) -> Result<(Stores, Option<PostgresPool>), ServerError> {
    let Some(pg_config) = database.to_postgres_config() else {
        warn!("No database URL configured, using the in-memory store");
        return Ok((Stores::in_memory(), None));
    };

    let pool = match PostgresPool::connect(&pg_config).await {
        Ok(pool) => pool,
        Err(e) if database.in_memory_fallback => {
            warn!(error = %e, "PostgreSQL unavailable, falling back to the in-memory store");
            return Ok((Stores::in_memory(), None));
        }
        Err(e) => return Err(e.into()),
    };

    if database.run_migrations {
        pool.run_migrations().await?;
    }
    Ok((facilitator_db::stores(&pool), Some(pool)))
}

/// Resolve on `Ctrl-C` or `SIGTERM`.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

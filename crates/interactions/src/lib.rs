// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interactions manager: a registry of role-scoped interactions, presence
//! tracking for connected remote-control clients, and per-application
//! concurrency quotas.

pub mod arbiter;
pub mod config;
pub mod error;
pub mod interaction;
pub mod loader;
pub mod manager;
pub mod presence;
pub mod registry;
pub mod test_support;
pub mod transport;
pub mod uri;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::config::ManagerConfig;
use crate::manager::{BridgeEndpoint, InteractionsManager};
use crate::presence::nats::{NatsDirectory, NatsStatusSource};
use crate::presence::PresenceTracker;
use crate::transport::build_router;
use crate::transport::nats::{NatsService, StatePublisher};

/// Install the global tracing subscriber.
///
/// A subscriber that is already installed is left in place.
pub fn init_tracing(config: &ManagerConfig) {
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

/// Run the manager until ctrl-c.
pub async fn run(config: ManagerConfig) -> anyhow::Result<()> {
    config.validate()?;
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    let shutdown = CancellationToken::new();

    let client = transport::nats::connect(
        &config.nats_url,
        config.nats_token.as_deref(),
        config.startup_timeout(),
    )
    .await?;
    tracing::info!(url = %config.nats_url, prefix = %config.nats_prefix, "connected to nats");

    let directory = NatsDirectory::start(
        client.clone(),
        &config.nats_prefix,
        config.announce_ttl(),
        shutdown.clone(),
    )
    .await?;
    let source = NatsStatusSource::new(client.clone(), &config.nats_prefix);
    let presence = Arc::new(PresenceTracker::new(
        Arc::new(directory),
        Arc::new(source),
        config.directory_timeout(),
    ));

    let bridge = BridgeEndpoint { address: config.bridge_address.clone(), port: config.bridge_port };
    let manager = Arc::new(InteractionsManager::new(Arc::clone(&presence), bridge));
    let loaded = manager.preload(&config.interactions, &config.resource_path).await;
    tracing::info!(loaded, roles = ?manager.roles(), "interactions preloaded");

    let presence_loop = presence.spawn(config.watch_loop_period(), shutdown.clone());
    manager.spawn_snapshot_publisher(shutdown.clone());

    {
        let service = NatsService::new(client.clone(), &config.nats_prefix);
        let manager = Arc::clone(&manager);
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = service.run(manager, shutdown).await {
                tracing::error!("nats service stopped: {e:#}");
            }
        });
    }
    tokio::spawn(
        StatePublisher::new(client.clone(), &config.nats_prefix)
            .run(Arc::clone(&manager), shutdown.clone()),
    );

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, shutting down");
            }
            shutdown.cancel();
        });
    }

    tracing::info!("interactions manager listening on {addr}");
    let router = build_router(Arc::clone(&manager));
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await;

    shutdown.cancel();
    if let Err(e) = presence_loop.await {
        tracing::warn!("presence loop join failed: {e}");
    }
    manager.shutdown().await;
    served?;
    Ok(())
}

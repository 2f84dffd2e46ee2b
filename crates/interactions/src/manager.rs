// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interactions manager: owns the registry and presence tracker, keeps the
//! latched `roles` and `interactive_clients` snapshots current, and serves
//! the request/response operations.
//!
//! Every operation answers with a structured response; registry and
//! arbitration failures never surface as errors to the caller.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::arbiter::{LaunchRequest, QuotaArbiter};
use crate::error::ErrorCode;
use crate::interaction::{Interaction, InteractionDef, InteractionHash, DEFAULT_NAMESPACE};
use crate::loader;
use crate::presence::{display_name, PresenceTracker};
use crate::registry::{InteractionRegistry, Rejected};

const BRIDGE_ADDRESS_TOKEN: &str = "%BRIDGE_ADDRESS%";
const BRIDGE_PORT_TOKEN: &str = "%BRIDGE_PORT%";

// -- Wire types ---------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GetInteractionRequest {
    pub hash: InteractionHash,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetInteractionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<Interaction>,
    pub found: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetInteractionsRequest {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetInteractionsResponse {
    pub interactions: Vec<Interaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetInteractionsRequest {
    pub interactions: Vec<InteractionDef>,
    pub load: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetInteractionsResponse {
    /// False when any definition was rejected during a load.
    pub result: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<Rejected>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestInteractionRequest {
    pub role: String,
    pub application: String,
    #[serde(default)]
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestInteractionResponse {
    pub result: bool,
    pub error_code: ErrorCode,
    pub message: String,
}

/// One connected client as published in the `interactive_clients` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: String,
    pub name: String,
    pub platform_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

/// Connected clients grouped by whether they are running an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveClients {
    pub running_clients: Vec<ClientSummary>,
    pub idle_clients: Vec<ClientSummary>,
}

/// Address of the bridge web interactions connect back through.
#[derive(Debug, Clone, Default)]
pub struct BridgeEndpoint {
    pub address: String,
    pub port: u16,
}

// -- Manager ------------------------------------------------------------------

pub struct InteractionsManager {
    registry: Arc<InteractionRegistry>,
    presence: Arc<PresenceTracker>,
    arbiter: QuotaArbiter,
    bridge: BridgeEndpoint,
    roles_tx: watch::Sender<Vec<String>>,
    clients_tx: watch::Sender<InteractiveClients>,
}

impl InteractionsManager {
    pub fn new(presence: Arc<PresenceTracker>, bridge: BridgeEndpoint) -> Self {
        let registry = Arc::new(InteractionRegistry::new());
        let arbiter = QuotaArbiter::new(Arc::clone(&registry), Arc::clone(&presence));
        let (roles_tx, _) = watch::channel(Vec::new());
        let (clients_tx, _) = watch::channel(InteractiveClients::default());
        Self { registry, presence, arbiter, bridge, roles_tx, clients_tx }
    }

    pub fn registry(&self) -> &Arc<InteractionRegistry> {
        &self.registry
    }

    pub fn presence(&self) -> &Arc<PresenceTracker> {
        &self.presence
    }

    /// Latched role list; late subscribers see the latest value.
    pub fn subscribe_roles(&self) -> watch::Receiver<Vec<String>> {
        self.roles_tx.subscribe()
    }

    /// Latched client snapshot; late subscribers see the latest value.
    pub fn subscribe_clients(&self) -> watch::Receiver<InteractiveClients> {
        self.clients_tx.subscribe()
    }

    pub fn roles(&self) -> Vec<String> {
        self.roles_tx.borrow().clone()
    }

    pub fn interactive_clients(&self) -> InteractiveClients {
        self.clients_tx.borrow().clone()
    }

    // -- Operations -----------------------------------------------------------

    pub async fn get_interaction(&self, hash: InteractionHash) -> GetInteractionResponse {
        let interaction = self.registry.find(hash).await.map(|i| self.with_bridge(i));
        let found = interaction.is_some();
        GetInteractionResponse { interaction, found }
    }

    pub async fn get_interactions(&self, req: &GetInteractionsRequest) -> GetInteractionsResponse {
        if !req.roles.is_empty() {
            let known = self.registry.roles().await;
            for role in req.roles.iter().filter(|r| !known.contains(*r)) {
                tracing::warn!(role = %role, "request for interactions of an unregistered role");
            }
        }
        let matched = if req.roles.is_empty() && req.uri.is_empty() {
            self.registry.list().await
        } else {
            self.registry.filter(&req.roles, &req.uri).await
        };
        let interactions = matched
            .into_iter()
            .map(|i| self.with_bridge(i))
            .collect();
        GetInteractionsResponse { interactions }
    }

    pub async fn set_interactions(&self, req: &SetInteractionsRequest) -> SetInteractionsResponse {
        let response = if req.load {
            let outcome = self.registry.load(&req.interactions).await;
            log_load(&outcome.accepted, &outcome.rejected);
            SetInteractionsResponse {
                result: outcome.rejected.is_empty(),
                rejected: outcome.rejected,
            }
        } else {
            let removed = self.registry.unload(&req.interactions).await;
            for i in &removed {
                tracing::info!("unloading {}", i.label());
            }
            SetInteractionsResponse { result: true, rejected: vec![] }
        };
        self.publish_roles().await;
        response
    }

    pub async fn request_interaction(
        &self,
        req: &RequestInteractionRequest,
    ) -> RequestInteractionResponse {
        let namespace = if req.namespace.trim().is_empty() {
            DEFAULT_NAMESPACE.to_owned()
        } else {
            req.namespace.clone()
        };
        let request = LaunchRequest {
            role: req.role.clone(),
            application: req.application.clone(),
            namespace,
        };
        let decision = self.arbiter.request_interaction(&request).await;
        let code = decision.error_code();
        if !decision.is_granted() {
            tracing::info!(
                role = %request.role,
                application = %request.application,
                namespace = %request.namespace,
                code = %code,
                "interaction request denied"
            );
        }
        RequestInteractionResponse {
            result: decision.is_granted(),
            error_code: code,
            message: code.message().to_owned(),
        }
    }

    /// Load every resource named in the startup configuration.
    ///
    /// Unreadable or malformed resources are logged and skipped. Returns the
    /// number of interactions loaded.
    pub async fn preload(&self, resources: &[String], search_paths: &[PathBuf]) -> usize {
        let mut loaded = 0;
        for name in resources {
            match loader::load_resource(name, search_paths, DEFAULT_NAMESPACE) {
                Ok(defs) => {
                    let outcome = self.registry.load(&defs).await;
                    log_load(&outcome.accepted, &outcome.rejected);
                    loaded += outcome.accepted.len();
                }
                Err(e) => {
                    tracing::error!(resource = %name, err = %e, "failed to load interactions resource");
                }
            }
        }
        self.publish_roles().await;
        loaded
    }

    // -- Latched state --------------------------------------------------------

    pub async fn publish_roles(&self) {
        let roles: Vec<String> = self.registry.roles().await.into_iter().collect();
        self.roles_tx.send_if_modified(|current| {
            if *current == roles {
                return false;
            }
            *current = roles;
            true
        });
    }

    /// Rebuild the client snapshot from the presence tracker.
    ///
    /// Clients that have not reported a status yet are left out.
    pub async fn publish_clients(&self) {
        let mut snapshot = InteractiveClients::default();
        let mut statuses = self.presence.statuses().await;
        statuses.sort_by(|a, b| a.0.cmp(&b.0));
        for (channel, status) in statuses {
            let mut summary = ClientSummary {
                id: status.id.clone(),
                name: display_name(&channel, &status),
                platform_info: status.platform_info.clone(),
                app_name: None,
            };
            if status.running_app {
                summary.app_name = Some(status.app_name.clone());
                snapshot.running_clients.push(summary);
            } else {
                snapshot.idle_clients.push(summary);
            }
        }
        self.clients_tx.send_replace(snapshot);
    }

    /// Republish the client snapshot on every presence notification.
    pub fn spawn_snapshot_publisher(
        self: &Arc<Self>,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let manager = Arc::clone(self);
        let mut events = self.presence.subscribe();
        tokio::spawn(async move {
            manager.publish_clients().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(_) => manager.publish_clients().await,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::debug!("snapshot publisher lagged by {n} presence events");
                            manager.publish_clients().await;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        })
    }

    /// Release every client monitor.
    pub async fn shutdown(&self) {
        self.presence.release_all().await;
        self.publish_clients().await;
    }

    fn with_bridge(&self, mut interaction: Interaction) -> Interaction {
        if interaction.parameters.contains('%') {
            interaction.parameters = interaction
                .parameters
                .replace(BRIDGE_ADDRESS_TOKEN, &self.bridge.address)
                .replace(BRIDGE_PORT_TOKEN, &self.bridge.port.to_string());
        }
        interaction
    }
}

fn log_load(accepted: &[Interaction], rejected: &[Rejected]) {
    for i in accepted {
        tracing::info!("loading {}", i.label());
    }
    for r in rejected {
        tracing::warn!(reason = ?r.reason, "failed to load {}", r.definition.label());
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;

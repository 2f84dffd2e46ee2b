// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Presence tracking: which remote clients are connected and what they run.

pub mod monitor;
pub mod nats;
pub mod tracker;

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::DirectoryError;

pub use monitor::ClientMonitor;
pub use tracker::{PresenceTracker, ReconcileOutcome};

/// Latest self-reported status of one remote client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStatus {
    /// Stable client identifier.
    #[serde(alias = "uuid")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub platform_info: String,
    #[serde(default)]
    pub running_app: bool,
    /// Only meaningful while `running_app` is set.
    #[serde(default)]
    pub app_name: String,
}

impl ClientStatus {
    /// Whether this client is currently running `application`.
    pub fn is_running(&self, application: &str) -> bool {
        self.running_app && self.app_name == application
    }
}

/// Notifications emitted by the presence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    /// The tracked channel set changed during a reconciliation.
    MembershipChanged { added: usize, removed: usize },
    /// A tracked client published a new status.
    StatusUpdated { channel: String },
}

/// Stream of status updates for one client channel.
pub type StatusStream = BoxStream<'static, ClientStatus>;

/// Source of currently advertised client channels.
///
/// Object-safe for use as `Arc<dyn Directory>`.
pub trait Directory: Send + Sync + 'static {
    fn list_channels(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, DirectoryError>> + Send + '_>>;
}

/// Opens per-channel status subscriptions.
///
/// Object-safe for use as `Arc<dyn StatusSource>`.
pub trait StatusSource: Send + Sync + 'static {
    fn subscribe(
        &self,
        channel: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<StatusStream>> + Send + '_>>;
}

/// Client name as shown in snapshots: the reported name, or the channel id
/// with its namespace stripped.
pub fn display_name(channel: &str, status: &ClientStatus) -> String {
    if !status.name.is_empty() {
        return status.name.clone();
    }
    channel.rsplit(['/', '.']).next().unwrap_or(channel).to_owned()
}

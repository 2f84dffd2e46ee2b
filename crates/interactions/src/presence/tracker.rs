// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciles monitored clients against the directory on a fixed cadence.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;

use super::{ClientMonitor, ClientStatus, Directory, PresenceEvent, StatusSource};
use crate::error::DirectoryError;

/// Channels added and removed by one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ReconcileOutcome {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Owns the set of client monitors, keyed by channel id.
pub struct PresenceTracker {
    monitors: RwLock<HashMap<String, ClientMonitor>>,
    directory: Arc<dyn Directory>,
    source: Arc<dyn StatusSource>,
    events: broadcast::Sender<PresenceEvent>,
    list_timeout: Duration,
}

impl PresenceTracker {
    pub fn new(
        directory: Arc<dyn Directory>,
        source: Arc<dyn StatusSource>,
        list_timeout: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        Self { monitors: RwLock::new(HashMap::new()), directory, source, events, list_timeout }
    }

    /// Subscribe to membership and status notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<PresenceEvent> {
        self.events.subscribe()
    }

    /// Bring the monitored set in line with the directory listing.
    ///
    /// Directory errors leave the monitored set untouched and are retried on
    /// the next call.
    pub async fn reconcile(&self) -> Result<ReconcileOutcome, DirectoryError> {
        let listed = match tokio::time::timeout(self.list_timeout, self.directory.list_channels())
            .await
        {
            Ok(res) => res?,
            Err(_) => {
                return Err(DirectoryError::Transient(format!(
                    "listing timed out after {}ms",
                    self.list_timeout.as_millis()
                )))
            }
        };
        let listed: HashSet<String> = listed.into_iter().collect();

        let mut monitors = self.monitors.write().await;
        let tracked: Vec<String> = monitors.keys().cloned().collect();

        let mut outcome = ReconcileOutcome::default();
        for channel in listed.iter().filter(|c| !monitors.contains_key(*c)) {
            outcome.added.push(channel.clone());
        }
        for channel in tracked.into_iter().filter(|c| !listed.contains(c)) {
            outcome.removed.push(channel);
        }
        outcome.added.sort();
        outcome.removed.sort();

        for channel in &outcome.added {
            let monitor =
                ClientMonitor::spawn(channel, Arc::clone(&self.source), self.events.clone());
            monitors.insert(channel.clone(), monitor);
            tracing::info!(channel = %channel, "remocon connected");
        }
        for channel in &outcome.removed {
            if let Some(monitor) = monitors.remove(channel) {
                monitor.release();
            }
            tracing::info!(channel = %channel, "remocon left");
        }
        drop(monitors);

        if !outcome.is_empty() {
            let _ = self.events.send(PresenceEvent::MembershipChanged {
                added: outcome.added.len(),
                removed: outcome.removed.len(),
            });
        }
        Ok(outcome)
    }

    /// Run [`reconcile`](Self::reconcile) every `period` until `shutdown`.
    ///
    /// Releases every monitor when the loop stops.
    pub fn spawn(
        self: &Arc<Self>,
        period: Duration,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = timer.tick() => {}
                }

                match tracker.reconcile().await {
                    Ok(_) => {}
                    Err(DirectoryError::Transient(e)) => {
                        tracing::warn!(err = %e, "directory unavailable, retrying next cycle");
                    }
                    Err(DirectoryError::Failure(e)) => {
                        tracing::error!(err = %e, "directory failure, skipping cycle");
                    }
                }
            }

            tracker.release_all().await;
            tracing::debug!("presence loop stopped");
        })
    }

    /// Release and forget every monitor.
    pub async fn release_all(&self) {
        let drained: Vec<_> = self.monitors.write().await.drain().collect();
        for (channel, monitor) in &drained {
            monitor.release();
            tracing::debug!(channel = %channel, "released monitor");
        }
    }

    /// Known statuses keyed by channel; monitors without a report are omitted.
    pub async fn statuses(&self) -> Vec<(String, ClientStatus)> {
        self.monitors
            .read()
            .await
            .iter()
            .filter_map(|(channel, m)| m.current_status().map(|s| (channel.clone(), s)))
            .collect()
    }

    /// Number of tracked clients currently running `application`.
    pub async fn running_count(&self, application: &str) -> usize {
        self.monitors
            .read()
            .await
            .values()
            .filter(|m| m.current_status().is_some_and(|s| s.is_running(application)))
            .count()
    }

    pub async fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.monitors.read().await.keys().cloned().collect();
        channels.sort();
        channels
    }

    pub async fn client_count(&self) -> usize {
        self.monitors.read().await.len()
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;

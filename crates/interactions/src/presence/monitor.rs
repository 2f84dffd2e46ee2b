// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-client status monitor.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use super::{ClientStatus, PresenceEvent, StatusSource};

/// Follows one client's status channel and keeps only the latest update.
///
/// The subscription runs on its own task, so constructing a monitor never
/// waits on the transport. Dropping the monitor releases the subscription.
pub struct ClientMonitor {
    channel: String,
    status_rx: watch::Receiver<Option<ClientStatus>>,
    cancel: CancellationToken,
}

impl ClientMonitor {
    pub fn spawn(
        channel: &str,
        source: Arc<dyn StatusSource>,
        events: broadcast::Sender<PresenceEvent>,
    ) -> Self {
        let (status_tx, status_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let task_channel = channel.to_owned();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut stream = tokio::select! {
                _ = task_cancel.cancelled() => return,
                res = source.subscribe(&task_channel) => match res {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::warn!(channel = %task_channel, err = %e, "status subscription failed");
                        return;
                    }
                },
            };

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    update = stream.next() => {
                        let Some(status) = update else { break };
                        status_tx.send_replace(Some(status));
                        let _ = events.send(PresenceEvent::StatusUpdated {
                            channel: task_channel.clone(),
                        });
                    }
                }
            }
            tracing::debug!(channel = %task_channel, "status subscription closed");
        });

        Self { channel: channel.to_owned(), status_rx, cancel }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Latest known status, or `None` before the first update.
    pub fn current_status(&self) -> Option<ClientStatus> {
        self.status_rx.borrow().clone()
    }

    /// Stop following the status channel. Safe to call more than once.
    pub fn release(&self) {
        self.cancel.cancel();
    }

    pub fn is_released(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ClientMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;

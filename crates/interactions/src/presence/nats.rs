// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NATS-backed directory and status source.
//!
//! Remote clients announce themselves on `{prefix}.remocons.{channel}.announce`
//! with `online`, `heartbeat` or `offline` events, and publish their status as
//! JSON on `{prefix}.remocons.{channel}.status`. The directory lists every
//! channel that announced within the configured TTL.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::{ClientStatus, Directory, StatusSource, StatusStream};
use crate::error::DirectoryError;

/// Announce-driven directory of connected clients.
pub struct NatsDirectory {
    client: async_nats::Client,
    last_announce: Arc<RwLock<HashMap<String, Instant>>>,
    ttl: Duration,
    listener: CancellationToken,
}

impl NatsDirectory {
    /// Subscribe to announce subjects and start tracking channels.
    pub async fn start(
        client: async_nats::Client,
        prefix: &str,
        ttl: Duration,
        shutdown: CancellationToken,
    ) -> anyhow::Result<Self> {
        let subject = format!("{prefix}.remocons.*.announce");
        let mut sub = client.subscribe(subject).await?;
        let last_announce = Arc::new(RwLock::new(HashMap::new()));
        let listener = CancellationToken::new();

        {
            let last_announce = Arc::clone(&last_announce);
            let listener = listener.clone();
            let prefix = prefix.to_owned();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        msg = sub.next() => {
                            let Some(msg) = msg else {
                                tracing::warn!("nats: announce subscription closed");
                                break;
                            };
                            let Some(channel) = channel_from_subject(&prefix, msg.subject.as_str())
                            else {
                                continue;
                            };
                            handle_announce(&last_announce, channel, &msg.payload).await;
                        }
                    }
                }
                listener.cancel();
            });
        }

        Ok(Self { client, last_announce, ttl, listener })
    }
}

impl Directory for NatsDirectory {
    fn list_channels(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, DirectoryError>> + Send + '_>> {
        Box::pin(async move {
            if self.listener.is_cancelled() {
                return Err(DirectoryError::Failure("announce listener stopped".to_owned()));
            }
            if !matches!(self.client.connection_state(), async_nats::connection::State::Connected)
            {
                return Err(DirectoryError::Transient("nats disconnected".to_owned()));
            }
            let now = Instant::now();
            let mut table = self.last_announce.write().await;
            table.retain(|_, seen| now.duration_since(*seen) <= self.ttl);
            let mut channels: Vec<String> = table.keys().cloned().collect();
            channels.sort();
            Ok(channels)
        })
    }
}

/// Extract the channel id from `{prefix}.remocons.{channel}.{kind}`.
pub(crate) fn channel_from_subject<'a>(prefix: &str, subject: &'a str) -> Option<&'a str> {
    let rest = subject.strip_prefix(prefix)?.strip_prefix(".remocons.")?;
    let (channel, _kind) = rest.rsplit_once('.')?;
    if channel.is_empty() || channel.contains('.') {
        return None;
    }
    Some(channel)
}

/// Apply one announce message to the last-seen table.
pub(crate) async fn handle_announce(
    last_announce: &RwLock<HashMap<String, Instant>>,
    channel: &str,
    payload: &[u8],
) {
    #[derive(serde::Deserialize)]
    struct AnnounceMsg {
        event: String,
    }

    let msg: AnnounceMsg = match serde_json::from_slice(payload) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(channel, "nats: invalid announce message: {e}");
            return;
        }
    };

    match msg.event.as_str() {
        "online" | "heartbeat" => {
            last_announce.write().await.insert(channel.to_owned(), Instant::now());
        }
        "offline" => {
            last_announce.write().await.remove(channel);
        }
        other => {
            tracing::debug!(channel, event = other, "nats: unknown announce event");
        }
    }
}

/// Subscribes to per-client status subjects.
pub struct NatsStatusSource {
    client: async_nats::Client,
    prefix: String,
}

impl NatsStatusSource {
    pub fn new(client: async_nats::Client, prefix: &str) -> Self {
        Self { client, prefix: prefix.to_owned() }
    }
}

impl StatusSource for NatsStatusSource {
    fn subscribe(
        &self,
        channel: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<StatusStream>> + Send + '_>> {
        let subject = format!("{}.remocons.{channel}.status", self.prefix);
        let channel = channel.to_owned();
        Box::pin(async move {
            let sub = self.client.subscribe(subject).await?;
            let stream = sub.filter_map(move |msg| {
                let parsed = serde_json::from_slice::<ClientStatus>(&msg.payload);
                if let Err(ref e) = parsed {
                    tracing::debug!(channel = %channel, "nats: invalid status message: {e}");
                }
                std::future::ready(parsed.ok())
            });
            Ok(stream.boxed())
        })
    }
}

#[cfg(test)]
#[path = "nats_tests.rs"]
mod tests;

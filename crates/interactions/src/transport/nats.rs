// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NATS request/reply service and latched state publisher.
//!
//! Requests arrive on `{prefix}.interactions.{op}` and are answered on the
//! message's reply subject. Latched state is republished to
//! `{prefix}.interactions.state.{roles,interactive_clients}` whenever it
//! changes; late subscribers can also fetch it with the `roles` and
//! `interactive_clients` ops.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::{ApiError, StartupError};
use crate::manager::{
    GetInteractionRequest, GetInteractionsRequest, InteractionsManager,
    RequestInteractionRequest, SetInteractionsRequest,
};
use crate::transport::http::RolesResponse;

/// Connect to NATS, waiting at most `timeout` for the connection to be
/// established.
///
/// The client keeps retrying in the background, so an unreachable server
/// surfaces as [`StartupError::SubscriptionTimeout`] rather than an
/// immediate connect error.
pub async fn connect(
    url: &str,
    token: Option<&str>,
    timeout: Duration,
) -> anyhow::Result<async_nats::Client> {
    let mut opts = async_nats::ConnectOptions::new().retry_on_initial_connect();
    if let Some(token) = token {
        opts = opts.token(token.to_owned());
    }
    let client = opts.connect(url).await?;

    let established = async {
        while !matches!(client.connection_state(), async_nats::connection::State::Connected) {
            tokio::time::sleep(CONNECT_POLL).await;
        }
    };
    if tokio::time::timeout(timeout, established).await.is_err() {
        return Err(StartupError::SubscriptionTimeout {
            what: format!("nats at {url}"),
            timeout_ms: timeout.as_millis() as u64,
        }
        .into());
    }
    Ok(client)
}

const CONNECT_POLL: Duration = Duration::from_millis(20);

/// Answers manager operations over NATS request/reply.
pub struct NatsService {
    client: async_nats::Client,
    prefix: String,
}

impl NatsService {
    pub fn new(client: async_nats::Client, prefix: &str) -> Self {
        Self { client, prefix: prefix.to_owned() }
    }

    /// Serve requests until shutdown.
    pub async fn run(
        self,
        manager: Arc<InteractionsManager>,
        shutdown: CancellationToken,
    ) -> anyhow::Result<()> {
        let subject = format!("{}.interactions.*", self.prefix);
        let mut sub = self.client.subscribe(subject.clone()).await?;
        tracing::info!(subject = %subject, "nats service listening");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                msg = sub.next() => {
                    let Some(msg) = msg else { break };
                    let Some(reply) = msg.reply.clone() else {
                        tracing::trace!(subject = %msg.subject, "nats: request without reply subject");
                        continue;
                    };
                    let op = msg.subject.as_str().rsplit('.').next().unwrap_or_default().to_owned();
                    let body = dispatch(&manager, &op, &msg.payload).await;
                    if let Err(e) = self.client.publish(reply, body.into()).await {
                        tracing::warn!(op = %op, "nats: reply failed: {e}");
                    }
                }
            }
        }
        Ok(())
    }
}

/// Decode a request for `op`, run it, and encode the response.
///
/// Undecodable payloads and unknown ops yield a `BAD_REQUEST` envelope.
pub async fn dispatch(manager: &InteractionsManager, op: &str, payload: &[u8]) -> Vec<u8> {
    match op {
        "get_interaction" => match parse::<GetInteractionRequest>(payload) {
            Ok(req) => encode(&manager.get_interaction(req.hash).await),
            Err(e) => bad_request(op, e),
        },
        "get_interactions" => {
            let req = if payload.is_empty() {
                Ok(GetInteractionsRequest::default())
            } else {
                parse::<GetInteractionsRequest>(payload)
            };
            match req {
                Ok(req) => encode(&manager.get_interactions(&req).await),
                Err(e) => bad_request(op, e),
            }
        }
        "set_interactions" => match parse::<SetInteractionsRequest>(payload) {
            Ok(req) => encode(&manager.set_interactions(&req).await),
            Err(e) => bad_request(op, e),
        },
        "request_interaction" => match parse::<RequestInteractionRequest>(payload) {
            Ok(req) => encode(&manager.request_interaction(&req).await),
            Err(e) => bad_request(op, e),
        },
        "roles" => encode(&RolesResponse { roles: manager.roles() }),
        "interactive_clients" => encode(&manager.interactive_clients()),
        other => encode(&ApiError::BadRequest.to_error_response(format!("unknown op: {other}"))),
    }
}

fn parse<T: serde::de::DeserializeOwned>(payload: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(payload)
}

fn bad_request(op: &str, e: serde_json::Error) -> Vec<u8> {
    tracing::debug!(op, "nats: invalid request: {e}");
    encode(&ApiError::BadRequest.to_error_response(format!("invalid {op} request: {e}")))
}

fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_else(|e| {
        tracing::warn!("nats: failed to serialize response: {e}");
        let fallback = ApiError::Internal.to_error_response("serialization failed");
        serde_json::to_vec(&fallback).unwrap_or_default()
    })
}

/// Publishes latched state on every change until shutdown.
pub struct StatePublisher {
    client: async_nats::Client,
    prefix: String,
}

impl StatePublisher {
    pub fn new(client: async_nats::Client, prefix: &str) -> Self {
        Self { client, prefix: prefix.to_owned() }
    }

    pub async fn run(self, manager: Arc<InteractionsManager>, shutdown: CancellationToken) {
        let mut roles_rx = manager.subscribe_roles();
        let mut clients_rx = manager.subscribe_clients();
        roles_rx.mark_changed();
        clients_rx.mark_changed();
        let roles_subject = format!("{}.interactions.state.roles", self.prefix);
        let clients_subject = format!("{}.interactions.state.interactive_clients", self.prefix);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                res = roles_rx.changed() => {
                    if res.is_err() { break }
                    let roles = roles_rx.borrow_and_update().clone();
                    self.publish(&roles_subject, &RolesResponse { roles }).await;
                }
                res = clients_rx.changed() => {
                    if res.is_err() { break }
                    let clients = clients_rx.borrow_and_update().clone();
                    self.publish(&clients_subject, &clients).await;
                }
            }
        }
        tracing::debug!("nats state publisher shutting down");
    }

    async fn publish<T: Serialize>(&self, subject: &str, value: &T) {
        let payload = match serde_json::to_vec(value) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("nats: failed to serialize state for {subject}: {e}");
                return;
            }
        };
        if let Err(e) = self.client.publish(subject.to_owned(), payload.into()).await {
            tracing::warn!("nats: publish to {subject} failed: {e}");
        }
    }
}

#[cfg(test)]
#[path = "nats_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use super::{connect, dispatch};
use crate::error::StartupError;
use crate::manager::{BridgeEndpoint, InteractionsManager};
use crate::presence::PresenceTracker;
use crate::test_support::{MemoryDirectory, MemoryStatusSource};

fn manager() -> InteractionsManager {
    let presence = Arc::new(PresenceTracker::new(
        Arc::new(MemoryDirectory::new()),
        Arc::new(MemoryStatusSource::new()),
        Duration::from_secs(1),
    ));
    InteractionsManager::new(presence, BridgeEndpoint::default())
}

async fn call(m: &InteractionsManager, op: &str, body: Value) -> anyhow::Result<Value> {
    let payload = serde_json::to_vec(&body)?;
    Ok(serde_json::from_slice(&dispatch(m, op, &payload).await)?)
}

fn chat() -> Value {
    json!({
        "name": "chat",
        "role": "operator",
        "namespace": "/chat",
        "application": "chat_app",
        "max": 1,
    })
}

#[tokio::test]
async fn set_then_get_over_dispatch() -> anyhow::Result<()> {
    let m = manager();
    let set = call(&m, "set_interactions", json!({ "interactions": [chat()], "load": true })).await?;
    assert_eq!(set["result"], true);

    let all = call(&m, "get_interactions", json!({})).await?;
    let list = all["interactions"].as_array().cloned().unwrap_or_default();
    assert_eq!(list.len(), 1);

    let hash = list[0]["hash"].clone();
    let one = call(&m, "get_interaction", json!({ "hash": hash })).await?;
    assert_eq!(one["found"], true);
    assert_eq!(one["interaction"]["name"], "chat");

    let roles = call(&m, "roles", Value::Null).await?;
    assert_eq!(roles["roles"], json!(["operator"]));
    Ok(())
}

#[tokio::test]
async fn empty_payload_lists_everything() -> anyhow::Result<()> {
    let m = manager();
    call(&m, "set_interactions", json!({ "interactions": [chat()], "load": true })).await?;
    let out: Value = serde_json::from_slice(&dispatch(&m, "get_interactions", b"").await)?;
    assert_eq!(out["interactions"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn request_interaction_reports_error_code() -> anyhow::Result<()> {
    let m = manager();
    let denied = call(
        &m,
        "request_interaction",
        json!({ "role": "operator", "application": "chat_app", "namespace": "/chat" }),
    )
    .await?;
    assert_eq!(denied["result"], false);
    assert_eq!(denied["error_code"], "ROLE_APP_UNAVAILABLE");

    call(&m, "set_interactions", json!({ "interactions": [chat()], "load": true })).await?;
    let granted = call(
        &m,
        "request_interaction",
        json!({ "role": "operator", "application": "chat_app", "namespace": "/chat" }),
    )
    .await?;
    assert_eq!(granted["result"], true);
    assert_eq!(granted["error_code"], "SUCCESS");
    Ok(())
}

#[yare::parameterized(
    malformed_json = { "set_interactions", b"{not json" as &[u8] },
    missing_field = { "request_interaction", br#"{"role":"operator"}"# },
    bad_hash = { "get_interaction", br#"{"hash":"abc"}"# },
    unknown_op = { "launch_rockets", b"{}" },
)]
#[test_macro(tokio::test)]
async fn invalid_requests_get_bad_request(op: &str, payload: &[u8]) {
    let m = manager();
    let out: Value = serde_json::from_slice(&dispatch(&m, op, payload).await).unwrap_or_default();
    assert_eq!(out["error"]["code"], "BAD_REQUEST");
    assert!(m.registry().is_empty().await);
}

#[tokio::test]
async fn interactive_clients_snapshot_is_served() -> anyhow::Result<()> {
    let m = manager();
    let out = call(&m, "interactive_clients", Value::Null).await?;
    assert_eq!(out, json!({ "running_clients": [], "idle_clients": [] }));
    Ok(())
}

#[tokio::test]
async fn unreachable_server_times_out() {
    let started = std::time::Instant::now();
    let res = connect("nats://127.0.0.1:1", None, Duration::from_millis(300)).await;

    let err = match res {
        Ok(_) => unreachable!("connected to a closed port"),
        Err(e) => e,
    };
    assert!(matches!(
        err.downcast_ref::<StartupError>(),
        Some(StartupError::SubscriptionTimeout { timeout_ms: 300, .. })
    ));
    assert!(started.elapsed() >= Duration::from_millis(300));
}

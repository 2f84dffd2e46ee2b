// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{InteractionRegistry, RejectReason};
use crate::interaction::InteractionHash;
use crate::test_support::interaction_def;

#[tokio::test]
async fn load_accepts_valid_and_rejects_malformed() {
    let registry = InteractionRegistry::new();
    let good = interaction_def("chat", "operator", "/chat", "chat_app", 1);
    let bad = interaction_def("", "operator", "/chat", "chat_app", 1);

    let outcome = registry.load(&[good, bad.clone()]).await;

    assert_eq!(outcome.accepted.len(), 1);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].definition, bad);
    assert!(matches!(outcome.rejected[0].reason, RejectReason::Malformed { .. }));
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn duplicate_identity_is_rejected_not_duplicated() -> anyhow::Result<()> {
    let registry = InteractionRegistry::new();
    let def = interaction_def("chat", "operator", "/chat", "chat_app", 1);
    let mut changed = def.clone();
    changed.max = 5;

    let first = registry.load(&[def.clone()]).await;
    let second = registry.load(&[changed]).await;

    assert_eq!(first.accepted.len(), 1);
    assert!(second.accepted.is_empty());
    assert_eq!(
        second.rejected[0].reason,
        RejectReason::AlreadyLoaded { hash: def.identity()? }
    );
    assert_eq!(registry.len().await, 1);
    let kept = registry.find(def.identity()?).await;
    assert_eq!(kept.map(|i| i.max), Some(1));
    Ok(())
}

#[tokio::test]
async fn duplicate_within_one_batch() {
    let registry = InteractionRegistry::new();
    let def = interaction_def("chat", "operator", "/chat", "chat_app", 1);
    let outcome = registry.load(&[def.clone(), def]).await;
    assert_eq!(outcome.accepted.len(), 1);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn unload_removes_matching_and_ignores_absent() -> anyhow::Result<()> {
    let registry = InteractionRegistry::new();
    let chat = interaction_def("chat", "operator", "/chat", "chat_app", 1);
    let map = interaction_def("map", "viewer", "/", "map_app", 0);
    registry.load(&[chat.clone(), map.clone()]).await;

    let ghost = interaction_def("ghost", "operator", "/", "ghost_app", 0);
    let removed = registry.unload(&[chat.clone(), ghost]).await;

    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].name, "chat");
    assert!(registry.find(chat.identity()?).await.is_none());
    assert!(registry.find(map.identity()?).await.is_some());
    Ok(())
}

#[tokio::test]
async fn reload_after_unload_replaces_entry() -> anyhow::Result<()> {
    let registry = InteractionRegistry::new();
    let def = interaction_def("chat", "operator", "/chat", "chat_app", 1);
    registry.load(&[def.clone()]).await;
    registry.unload(&[def.clone()]).await;

    let mut updated = def.clone();
    updated.max = 3;
    let outcome = registry.load(&[updated]).await;

    assert_eq!(outcome.accepted.len(), 1);
    assert_eq!(registry.find(def.identity()?).await.map(|i| i.max), Some(3));
    Ok(())
}

#[tokio::test]
async fn find_unknown_hash() {
    let registry = InteractionRegistry::new();
    assert!(registry.find(InteractionHash(7)).await.is_none());
}

#[tokio::test]
async fn filter_with_no_roles_returns_everything() {
    let registry = InteractionRegistry::new();
    registry
        .load(&[
            interaction_def("chat", "operator", "/chat", "chat_app", 1),
            interaction_def("map", "viewer", "/", "map_app", 0),
        ])
        .await;
    assert_eq!(registry.filter(&[], "").await.len(), 2);
}

#[tokio::test]
async fn filter_by_role() {
    let registry = InteractionRegistry::new();
    registry
        .load(&[
            interaction_def("chat", "operator", "/chat", "chat_app", 1),
            interaction_def("map", "viewer", "/", "map_app", 0),
            interaction_def("teleop", "operator", "/", "teleop_app", 1),
        ])
        .await;

    let operator = registry.filter(&["operator".to_owned()], "").await;
    assert_eq!(operator.len(), 2);
    assert!(operator.iter().all(|i| i.role == "operator"));
}

#[tokio::test]
async fn filter_unknown_role_is_empty() {
    let registry = InteractionRegistry::new();
    registry.load(&[interaction_def("chat", "operator", "/chat", "chat_app", 1)]).await;
    assert!(registry.filter(&["nonexistent-role".to_owned()], "").await.is_empty());
}

#[tokio::test]
async fn filter_by_compatibility_uri() {
    let registry = InteractionRegistry::new();
    let mut android = interaction_def("chat", "operator", "/chat", "chat_app", 1);
    android.compatibility = "rocon:/*/*/*/android".into();
    let mut any = interaction_def("map", "operator", "/", "map_app", 0);
    any.compatibility = "rocon:/*".into();
    registry.load(&[android, any]).await;

    let from_pc = registry.filter(&[], "rocon:/pc/laptop/hydro/precise").await;
    assert_eq!(from_pc.len(), 1);
    assert_eq!(from_pc[0].name, "map");

    let from_phone = registry.filter(&[], "rocon:/phone/nexus/hydro/android").await;
    assert_eq!(from_phone.len(), 2);
}

#[tokio::test]
async fn roles_reflect_loaded_entries() {
    let registry = InteractionRegistry::new();
    let chat = interaction_def("chat", "operator", "/chat", "chat_app", 1);
    registry.load(&[chat.clone(), interaction_def("map", "viewer", "/", "map_app", 0)]).await;
    let roles: Vec<String> = registry.roles().await.into_iter().collect();
    assert_eq!(roles, vec!["operator".to_owned(), "viewer".to_owned()]);

    registry.unload(&[chat]).await;
    let roles: Vec<String> = registry.roles().await.into_iter().collect();
    assert_eq!(roles, vec!["viewer".to_owned()]);
}

#[tokio::test]
async fn list_keeps_load_order_across_unload() {
    let registry = InteractionRegistry::new();
    let chat = interaction_def("chat", "operator", "/chat", "chat_app", 1);
    let map = interaction_def("map", "viewer", "/", "map_app", 0);
    let web = interaction_def("web", "viewer", "/", "web_app", 0);
    registry.load(&[chat, map.clone(), web]).await;
    registry.unload(&[map]).await;

    let names: Vec<String> = registry.list().await.into_iter().map(|i| i.name).collect();
    assert_eq!(names, vec!["chat".to_owned(), "web".to_owned()]);
}

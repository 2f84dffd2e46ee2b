// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table of loaded interactions keyed by identity hash.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::DefinitionError;
use crate::interaction::{Interaction, InteractionDef, InteractionHash};
use crate::uri;

/// Why a definition was not loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    Malformed { detail: String },
    /// An interaction with the same `(name, role, namespace)` is already loaded.
    AlreadyLoaded { hash: InteractionHash },
}

/// A definition that was turned away by [`InteractionRegistry::load`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejected {
    pub definition: InteractionDef,
    #[serde(flatten)]
    pub reason: RejectReason,
}

/// Result of a load call: what went in and what was turned away.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadOutcome {
    pub accepted: Vec<Interaction>,
    pub rejected: Vec<Rejected>,
}

/// Registry of loaded interactions.
///
/// Re-loading an identity that is already present is rejected rather than
/// overwriting it; updates go through `unload` followed by `load`.
#[derive(Default)]
pub struct InteractionRegistry {
    table: RwLock<IndexMap<InteractionHash, Interaction>>,
}

impl InteractionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and insert each definition.
    pub async fn load(&self, defs: &[InteractionDef]) -> LoadOutcome {
        let mut outcome = LoadOutcome::default();
        let mut table = self.table.write().await;
        for def in defs {
            let interaction = match Interaction::from_def(def) {
                Ok(i) => i,
                Err(e) => {
                    outcome.rejected.push(malformed(def, e));
                    continue;
                }
            };
            if table.contains_key(&interaction.hash) {
                outcome.rejected.push(Rejected {
                    definition: def.clone(),
                    reason: RejectReason::AlreadyLoaded { hash: interaction.hash },
                });
                continue;
            }
            table.insert(interaction.hash, interaction.clone());
            outcome.accepted.push(interaction);
        }
        outcome
    }

    /// Remove every loaded interaction whose identity matches a definition.
    ///
    /// Definitions that are invalid or not loaded are ignored.
    pub async fn unload(&self, defs: &[InteractionDef]) -> Vec<Interaction> {
        let mut table = self.table.write().await;
        defs.iter()
            .filter_map(|def| def.identity().ok())
            .filter_map(|hash| table.shift_remove(&hash))
            .collect()
    }

    pub async fn find(&self, hash: InteractionHash) -> Option<Interaction> {
        self.table.read().await.get(&hash).cloned()
    }

    /// Interactions whose role is in `roles` (all roles when empty) and whose
    /// compatibility pattern accepts `uri`.
    pub async fn filter(&self, roles: &[String], uri: &str) -> Vec<Interaction> {
        self.table
            .read()
            .await
            .values()
            .filter(|i| roles.is_empty() || roles.iter().any(|r| *r == i.role))
            .filter(|i| uri::is_compatible(&i.compatibility, uri))
            .cloned()
            .collect()
    }

    pub async fn by_role(&self, role: &str) -> Vec<Interaction> {
        self.table.read().await.values().filter(|i| i.role == role).cloned().collect()
    }

    pub async fn roles(&self) -> BTreeSet<String> {
        self.table.read().await.values().map(|i| i.role.clone()).collect()
    }

    pub async fn list(&self) -> Vec<Interaction> {
        self.table.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.is_empty()
    }
}

fn malformed(def: &InteractionDef, err: DefinitionError) -> Rejected {
    Rejected {
        definition: def.clone(),
        reason: RejectReason::Malformed { detail: err.to_string() },
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

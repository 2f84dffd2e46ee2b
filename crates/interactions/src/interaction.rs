// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interaction definitions and their identity hash.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::DefinitionError;

/// Namespace applied to definitions that leave it blank.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Identity key of an interaction, derived from `(name, role, namespace)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionHash(pub i32);

impl InteractionHash {
    pub fn compute(name: &str, role: &str, namespace: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update([0x1f]);
        hasher.update(role.as_bytes());
        hasher.update([0x1f]);
        hasher.update(namespace.as_bytes());
        let digest = hasher.finalize();
        Self(i32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
    }
}

impl fmt::Display for InteractionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InteractionHash {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A topic remapping handed to the client when it launches the interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remapping {
    pub remap_from: String,
    pub remap_to: String,
}

/// Interaction definition as it appears on the wire and in YAML resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub application: String,
    /// Maximum concurrent instances; 0 means unlimited.
    #[serde(default)]
    pub max: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    /// Platform URI pattern the interaction is shown to.
    #[serde(default)]
    pub compatibility: String,
    #[serde(default)]
    pub parameters: String,
    #[serde(default)]
    pub remappings: Vec<Remapping>,
    /// Ignored on input; identity is always recomputed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<InteractionHash>,
}

/// A validated, loaded interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub hash: InteractionHash,
    pub name: String,
    pub display_name: String,
    pub role: String,
    pub namespace: String,
    pub application: String,
    pub max: u32,
    pub description: String,
    pub icon: String,
    pub compatibility: String,
    pub parameters: String,
    pub remappings: Vec<Remapping>,
}

impl Interaction {
    /// Validate a definition and compute its identity hash.
    pub fn from_def(def: &InteractionDef) -> Result<Self, DefinitionError> {
        if def.name.trim().is_empty() {
            return Err(DefinitionError::MissingField("name"));
        }
        if def.role.trim().is_empty() {
            return Err(DefinitionError::MissingField("role"));
        }
        if def.application.trim().is_empty() {
            return Err(DefinitionError::MissingField("application"));
        }
        let namespace = match def.namespace.trim() {
            "" => DEFAULT_NAMESPACE.to_owned(),
            ns if ns.starts_with('/') => ns.to_owned(),
            ns => return Err(DefinitionError::RelativeNamespace(ns.to_owned())),
        };
        let display_name =
            if def.display_name.is_empty() { def.name.clone() } else { def.display_name.clone() };

        Ok(Self {
            hash: InteractionHash::compute(&def.name, &def.role, &namespace),
            name: def.name.clone(),
            display_name,
            role: def.role.clone(),
            namespace,
            application: def.application.clone(),
            max: def.max,
            description: def.description.clone(),
            icon: def.icon.clone(),
            compatibility: def.compatibility.clone(),
            parameters: def.parameters.clone(),
            remappings: def.remappings.clone(),
        })
    }

    /// Whether any number of clients may run this interaction at once.
    pub fn is_unlimited(&self) -> bool {
        self.max == 0
    }

    /// Short label used in log lines: `display [name-role-namespace]`.
    pub fn label(&self) -> String {
        format!("{} [{}-{}-{}]", self.display_name, self.name, self.role, self.namespace)
    }
}

impl InteractionDef {
    /// Identity hash this definition would load under, if it is valid.
    pub fn identity(&self) -> Result<InteractionHash, DefinitionError> {
        Interaction::from_def(self).map(|i| i.hash)
    }

    pub fn label(&self) -> String {
        format!("{} [{}-{}-{}]", self.display_name, self.name, self.role, self.namespace)
    }
}

#[cfg(test)]
#[path = "interaction_tests.rs"]
mod tests;

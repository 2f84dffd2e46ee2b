// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! YAML interaction resources.
//!
//! A resource is either a list of definitions or a mapping with an
//! `interactions` key holding that list.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::LoadError;
use crate::interaction::InteractionDef;

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    List(Vec<InteractionDef>),
    Wrapped { interactions: Vec<InteractionDef> },
}

/// Locate `name` as given, then relative to each search path in order.
pub fn resolve_resource(name: &str, search_paths: &[PathBuf]) -> Result<PathBuf, LoadError> {
    let direct = Path::new(name);
    if direct.is_file() {
        return Ok(direct.to_owned());
    }
    if direct.is_relative() {
        for dir in search_paths {
            let candidate = dir.join(direct);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }
    Err(LoadError::ResourceNotFound { name: name.to_owned() })
}

/// Parse interaction definitions from YAML text.
///
/// Definitions with an empty namespace take `default_namespace`.
pub fn parse_definitions(
    yaml: &str,
    default_namespace: &str,
    path: &Path,
) -> Result<Vec<InteractionDef>, LoadError> {
    let doc: Document = serde_yaml::from_str(yaml)
        .map_err(|source| LoadError::Malformed { path: path.to_owned(), source })?;
    let mut defs = match doc {
        Document::List(defs) | Document::Wrapped { interactions: defs } => defs,
    };
    for def in &mut defs {
        if def.namespace.trim().is_empty() {
            def.namespace = default_namespace.to_owned();
        }
    }
    Ok(defs)
}

/// Resolve and parse a resource.
pub fn load_resource(
    name: &str,
    search_paths: &[PathBuf],
    default_namespace: &str,
) -> Result<Vec<InteractionDef>, LoadError> {
    let path = resolve_resource(name, search_paths)?;
    let yaml = std::fs::read_to_string(&path)
        .map_err(|source| LoadError::Io { path: path.clone(), source })?;
    parse_definitions(&yaml, default_namespace, &path)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

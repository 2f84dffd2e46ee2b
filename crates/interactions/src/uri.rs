// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform compatibility URIs.
//!
//! A compatibility URI has the form `rocon:/hardware/name/framework/os`.
//! Each segment is `*` or a `|`-separated list of alternatives, and missing
//! trailing segments behave as `*`.

const SCHEME: &str = "rocon:";
const SEGMENTS: usize = 4;

/// Return true when an interaction advertising `pattern` may be shown to a
/// client identifying itself with `uri`.
///
/// An empty pattern or uri is compatible with everything.
pub fn is_compatible(pattern: &str, uri: &str) -> bool {
    if pattern.trim().is_empty() || uri.trim().is_empty() {
        return true;
    }
    let lhs = segments(pattern);
    let rhs = segments(uri);
    lhs.iter().zip(rhs.iter()).all(|(a, b)| segment_matches(a, b))
}

fn segments(uri: &str) -> Vec<String> {
    let body = uri.trim();
    let body = body.strip_prefix(SCHEME).unwrap_or(body);
    let body = body.trim_start_matches('/');
    let mut out: Vec<String> = body
        .split('/')
        .filter(|s| !s.is_empty())
        .take(SEGMENTS)
        .map(|s| s.to_lowercase())
        .collect();
    out.resize(SEGMENTS, "*".to_owned());
    out
}

fn segment_matches(a: &str, b: &str) -> bool {
    if a == "*" || b == "*" {
        return true;
    }
    a.split('|').any(|x| b.split('|').any(|y| x == y))
}

#[cfg(test)]
#[path = "uri_tests.rs"]
mod tests;

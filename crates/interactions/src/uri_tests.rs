// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::is_compatible;

#[yare::parameterized(
    empty_pattern = { "", "rocon:/pc/dude/hydro/precise", true },
    empty_uri = { "rocon:/pc", "", true },
    wildcard = { "rocon:/*", "rocon:/pc/dude/hydro/precise", true },
    exact = { "rocon:/pc/dude", "rocon:/pc/dude", true },
    mismatch = { "rocon:/turtlebot", "rocon:/pc", false },
    alternatives = { "rocon:/pc|tablet", "rocon:/tablet/x", true },
    alternatives_both_sides = { "rocon:/pc|tablet", "rocon:/phone|tablet", true },
    short_pattern = { "rocon:/pc", "rocon:/pc/dude/hydro/precise", true },
    os_mismatch = { "rocon:/*/*/*/android", "rocon:/pc/dude/hydro/precise", false },
    case_insensitive = { "rocon:/PC", "rocon:/pc", true },
    no_scheme = { "pc/dude", "rocon:/pc/dude", true },
)]
fn compatibility(pattern: &str, uri: &str, expected: bool) {
    assert_eq!(is_compatible(pattern, uri), expected);
}

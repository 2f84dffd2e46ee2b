// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::ManagerConfig;

fn parse(args: &[&str]) -> ManagerConfig {
    ManagerConfig::parse_from(args)
}

#[test]
fn defaults() -> anyhow::Result<()> {
    let config = parse(&["interactions-manager"]);
    config.validate()?;
    assert_eq!(config.watch_loop_period(), Duration::from_secs(1));
    assert_eq!(config.bridge_port, 9090);
    assert_eq!(config.nats_prefix, "concert");
    assert!(config.interactions.is_empty());
    Ok(())
}

#[test]
fn preload_list_is_comma_separated() {
    let config = parse(&[
        "interactions-manager",
        "--interactions",
        "chat.yaml,admin.yaml",
        "--resource-path",
        "/etc/interactions,/opt/interactions",
    ]);
    assert_eq!(config.interactions, vec!["chat.yaml", "admin.yaml"]);
    assert_eq!(
        config.resource_path,
        vec![PathBuf::from("/etc/interactions"), PathBuf::from("/opt/interactions")]
    );
}

#[yare::parameterized(
    zero_period = { &["m", "--watch-loop-ms", "0"], "watch-loop-ms" },
    zero_timeout = { &["m", "--directory-timeout-ms", "0"], "directory-timeout-ms" },
    wildcard_prefix = { &["m", "--nats-prefix", "concert.>"], "nats prefix" },
    bad_log_format = { &["m", "--log-format", "xml"], "log format" },
)]
fn invalid_config(args: &[&str], expected_substr: &str) {
    let err = parse(args).validate().err().map(|e| e.to_string()).unwrap_or_default();
    assert!(err.contains(expected_substr), "{err:?} should contain {expected_substr:?}");
}

#[test]
fn test_config_is_valid() -> anyhow::Result<()> {
    ManagerConfig::test().validate()
}

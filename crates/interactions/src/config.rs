// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Presence tracking and quota arbitration for remote interaction clients.
#[derive(Debug, Clone, Parser)]
#[command(name = "interactions-manager", version, about)]
pub struct ManagerConfig {
    /// Host to bind the HTTP API on.
    #[arg(long, default_value = "127.0.0.1", env = "INTERACTIONS_HOST")]
    pub host: String,

    /// Port for the HTTP API.
    #[arg(long, default_value_t = 9810, env = "INTERACTIONS_PORT")]
    pub port: u16,

    /// NATS server URL for the coordination bus.
    #[arg(long, default_value = "nats://127.0.0.1:4222", env = "INTERACTIONS_NATS_URL")]
    pub nats_url: String,

    /// NATS auth token.
    #[arg(long, env = "INTERACTIONS_NATS_TOKEN")]
    pub nats_token: Option<String>,

    /// Subject prefix for all bus traffic.
    #[arg(long, default_value = "concert", env = "INTERACTIONS_NATS_PREFIX")]
    pub nats_prefix: String,

    /// Reconciliation period in milliseconds.
    #[arg(long, default_value_t = 1000, env = "INTERACTIONS_WATCH_LOOP_MS")]
    pub watch_loop_ms: u64,

    /// Upper bound on a single directory listing, in milliseconds.
    #[arg(long, default_value_t = 1000, env = "INTERACTIONS_DIRECTORY_TIMEOUT_MS")]
    pub directory_timeout_ms: u64,

    /// Channels that have not announced for this long are considered gone.
    #[arg(long, default_value_t = 10000, env = "INTERACTIONS_ANNOUNCE_TTL_MS")]
    pub announce_ttl_ms: u64,

    /// How long to wait for the bus at startup before giving up.
    #[arg(long, default_value_t = 15000, env = "INTERACTIONS_STARTUP_TIMEOUT_MS")]
    pub startup_timeout_ms: u64,

    /// Interaction resources to load at startup (comma-separated).
    #[arg(long, value_delimiter = ',', env = "INTERACTIONS_PRELOAD")]
    pub interactions: Vec<String>,

    /// Directories searched for relative resource names (comma-separated).
    #[arg(long, value_delimiter = ',', env = "INTERACTIONS_RESOURCE_PATH")]
    pub resource_path: Vec<PathBuf>,

    /// Bridge address substituted into interaction parameters.
    #[arg(long, default_value = "", env = "INTERACTIONS_BRIDGE_ADDRESS")]
    pub bridge_address: String,

    /// Bridge port substituted into interaction parameters.
    #[arg(long, default_value_t = 9090, env = "INTERACTIONS_BRIDGE_PORT")]
    pub bridge_port: u16,

    /// Log format (json or text).
    #[arg(long, default_value = "text", env = "INTERACTIONS_LOG_FORMAT")]
    pub log_format: String,

    /// Log level filter.
    #[arg(long, default_value = "info", env = "INTERACTIONS_LOG_LEVEL")]
    pub log_level: String,
}

impl ManagerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.watch_loop_ms == 0 {
            anyhow::bail!("--watch-loop-ms must be greater than zero");
        }
        if self.directory_timeout_ms == 0 {
            anyhow::bail!("--directory-timeout-ms must be greater than zero");
        }
        if self.nats_prefix.is_empty() || self.nats_prefix.contains(['*', '>', ' ']) {
            anyhow::bail!("invalid nats prefix: {:?}", self.nats_prefix);
        }
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other}"),
        }
        Ok(())
    }

    pub fn watch_loop_period(&self) -> Duration {
        Duration::from_millis(self.watch_loop_ms)
    }

    pub fn directory_timeout(&self) -> Duration {
        Duration::from_millis(self.directory_timeout_ms)
    }

    pub fn announce_ttl(&self) -> Duration {
        Duration::from_millis(self.announce_ttl_ms)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    /// Build a minimal config for tests (port 0, fast polling).
    #[doc(hidden)]
    pub fn test() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            nats_url: "nats://127.0.0.1:4222".into(),
            nats_token: None,
            nats_prefix: "concert".into(),
            watch_loop_ms: 20,
            directory_timeout_ms: 200,
            announce_ttl_ms: 10000,
            startup_timeout_ms: 100,
            interactions: vec![],
            resource_path: vec![],
            bridge_address: "bridge.local".into(),
            bridge_port: 9090,
            log_format: "text".into(),
            log_level: "debug".into(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

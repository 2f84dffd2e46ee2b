// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup failure paths of `interactions::run`.

use std::time::Duration;

use interactions::config::ManagerConfig;
use interactions::error::StartupError;

fn unreachable_bus() -> ManagerConfig {
    let mut config = ManagerConfig::test();
    config.nats_url = "nats://127.0.0.1:1".into();
    config.startup_timeout_ms = 200;
    config
}

#[tokio::test]
async fn occupied_port_fails_before_touching_the_bus() -> anyhow::Result<()> {
    let taken = std::net::TcpListener::bind("127.0.0.1:0")?;
    let mut config = unreachable_bus();
    config.port = taken.local_addr()?.port();

    let err = match tokio::time::timeout(Duration::from_secs(5), interactions::run(config)).await? {
        Ok(()) => anyhow::bail!("run succeeded on an occupied port"),
        Err(e) => e,
    };
    let io = err.downcast_ref::<std::io::Error>();
    assert_eq!(io.map(std::io::Error::kind), Some(std::io::ErrorKind::AddrInUse));
    Ok(())
}

#[tokio::test]
async fn unreachable_bus_is_fatal() -> anyhow::Result<()> {
    let err =
        match tokio::time::timeout(Duration::from_secs(5), interactions::run(unreachable_bus()))
            .await?
        {
            Ok(()) => anyhow::bail!("run succeeded without a bus"),
            Err(e) => e,
        };
    assert!(matches!(
        err.downcast_ref::<StartupError>(),
        Some(StartupError::SubscriptionTimeout { timeout_ms: 200, .. })
    ));
    Ok(())
}

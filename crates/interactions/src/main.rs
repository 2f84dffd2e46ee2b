// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tracing::error;

use interactions::config::ManagerConfig;

#[tokio::main]
async fn main() {
    let config = ManagerConfig::parse();
    interactions::init_tracing(&config);

    if let Err(e) = interactions::run(config).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP and NATS surfaces for the interactions manager.

pub mod http;
pub mod nats;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::manager::InteractionsManager;

/// Build the axum `Router` with all manager routes.
pub fn build_router(manager: Arc<InteractionsManager>) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::health))
        // Latched state
        .route("/api/v1/roles", get(http::roles))
        .route("/api/v1/interactive_clients", get(http::interactive_clients))
        // Registry
        .route("/api/v1/interactions", get(http::get_interactions).post(http::set_interactions))
        .route("/api/v1/interactions/request", post(http::request_interaction))
        .route("/api/v1/interactions/{hash}", get(http::get_interaction))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(manager)
}

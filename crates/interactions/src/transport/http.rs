// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the interactions manager.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::interaction::InteractionHash;
use crate::manager::{
    GetInteractionsRequest, InteractionsManager, RequestInteractionRequest,
    SetInteractionsRequest,
};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub client_count: usize,
    pub interaction_count: usize,
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<String>,
}

/// Query for `GET /api/v1/interactions`.
#[derive(Debug, Default, Deserialize)]
pub struct InteractionsQuery {
    /// Comma-separated role names; empty means all roles.
    #[serde(default)]
    pub roles: String,
    #[serde(default)]
    pub uri: String,
}

impl InteractionsQuery {
    fn into_request(self) -> GetInteractionsRequest {
        let roles = self
            .roles
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_owned)
            .collect();
        GetInteractionsRequest { roles, uri: self.uri }
    }
}

/// `GET /api/v1/health`
pub async fn health(State(m): State<Arc<InteractionsManager>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "running".to_owned(),
        client_count: m.presence().client_count().await,
        interaction_count: m.registry().len().await,
    })
}

/// `GET /api/v1/roles`
pub async fn roles(State(m): State<Arc<InteractionsManager>>) -> impl IntoResponse {
    Json(RolesResponse { roles: m.roles() })
}

/// `GET /api/v1/interactive_clients`
pub async fn interactive_clients(State(m): State<Arc<InteractionsManager>>) -> impl IntoResponse {
    Json(m.interactive_clients())
}

/// `GET /api/v1/interactions/{hash}`
pub async fn get_interaction(
    State(m): State<Arc<InteractionsManager>>,
    Path(hash): Path<String>,
) -> impl IntoResponse {
    let hash: InteractionHash = match hash.parse() {
        Ok(h) => h,
        Err(e) => {
            return ApiError::BadRequest
                .to_http_response(format!("invalid hash {hash:?}: {e}"))
                .into_response();
        }
    };
    Json(m.get_interaction(hash).await).into_response()
}

/// `GET /api/v1/interactions?roles=a,b&uri=...`
pub async fn get_interactions(
    State(m): State<Arc<InteractionsManager>>,
    Query(query): Query<InteractionsQuery>,
) -> impl IntoResponse {
    Json(m.get_interactions(&query.into_request()).await)
}

/// `POST /api/v1/interactions`: load or unload definitions.
pub async fn set_interactions(
    State(m): State<Arc<InteractionsManager>>,
    body: Result<Json<SetInteractionsRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(e) => return ApiError::body_rejected(&e).into_response(),
    };
    Json(m.set_interactions(&req).await).into_response()
}

/// `POST /api/v1/interactions/request`
pub async fn request_interaction(
    State(m): State<Arc<InteractionsManager>>,
    body: Result<Json<RequestInteractionRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(e) => return ApiError::body_rejected(&e).into_response(),
    };
    Json(m.request_interaction(&req).await).into_response()
}

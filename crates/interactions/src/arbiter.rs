// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quota arbitration for interaction launch requests.
//!
//! Running instances are counted by application name only, regardless of
//! the role or namespace the client launched under. Two interactions that
//! share an application therefore share one count.
//!
//! No slot is reserved when a request is granted: two concurrent requests
//! can both observe `count < max` and both be granted. Quotas are advisory
//! until the client reports the application as running.

use std::sync::Arc;

use serde::Serialize;

use crate::error::ErrorCode;
use crate::interaction::Interaction;
use crate::presence::PresenceTracker;
use crate::registry::InteractionRegistry;

/// A request to launch an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub role: String,
    pub application: String,
    pub namespace: String,
}

/// Why a request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Denial {
    Unavailable,
    QuotaReached,
}

/// Outcome of arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Decision {
    Granted,
    Denied(Denial),
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Granted => ErrorCode::Success,
            Self::Denied(Denial::Unavailable) => ErrorCode::RoleAppUnavailable,
            Self::Denied(Denial::QuotaReached) => ErrorCode::RoleAppQuotaReached,
        }
    }
}

/// Decide a request given the role's interactions and the number of
/// clients currently running the requested application.
pub fn arbitrate(candidates: &[Interaction], request: &LaunchRequest, running: usize) -> Decision {
    let Some(matched) = candidates.iter().find(|i| {
        i.role == request.role
            && i.application == request.application
            && i.namespace == request.namespace
    }) else {
        return Decision::Denied(Denial::Unavailable);
    };

    if matched.is_unlimited() {
        return Decision::Granted;
    }
    if running < matched.max as usize {
        Decision::Granted
    } else {
        Decision::Denied(Denial::QuotaReached)
    }
}

/// Arbitrates against the live registry and presence set.
pub struct QuotaArbiter {
    registry: Arc<InteractionRegistry>,
    presence: Arc<PresenceTracker>,
}

impl QuotaArbiter {
    pub fn new(registry: Arc<InteractionRegistry>, presence: Arc<PresenceTracker>) -> Self {
        Self { registry, presence }
    }

    pub async fn request_interaction(&self, request: &LaunchRequest) -> Decision {
        let candidates = self.registry.by_role(&request.role).await;
        let running = self.presence.running_count(&request.application).await;
        arbitrate(&candidates, request, running)
    }
}

#[cfg(test)]
#[path = "arbiter_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::path::PathBuf;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Result codes carried by `request_interaction` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Success,
    RoleAppUnavailable,
    RoleAppQuotaReached,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::RoleAppUnavailable => "ROLE_APP_UNAVAILABLE",
            Self::RoleAppQuotaReached => "ROLE_APP_QUOTA_REACHED",
        }
    }

    /// Human-readable message sent alongside the code.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "",
            Self::RoleAppUnavailable => "this role-app pair is not available",
            Self::RoleAppQuotaReached => "the quota for this role-app pair has been reached",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error codes for malformed requests on the HTTP and NATS surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiError {
    BadRequest,
    Internal,
}

impl ApiError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Internal => "INTERNAL",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into() }
    }

    pub fn to_error_response(&self, message: impl Into<String>) -> ErrorResponse {
        ErrorResponse { error: self.to_error_body(message) }
    }

    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_error_response(message)))
    }

    /// `BAD_REQUEST` envelope for a JSON body that failed to decode.
    pub fn body_rejected(rejection: &JsonRejection) -> (StatusCode, Json<ErrorResponse>) {
        Self::BadRequest.to_http_response(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Failure to list advertised client channels.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The directory is temporarily unreachable; retry next cycle.
    #[error("directory temporarily unavailable: {0}")]
    Transient(String),
    /// The directory cannot serve listings at all.
    #[error("directory failure: {0}")]
    Failure(String),
}

/// A single interaction definition failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("namespace `{0}` must be absolute")]
    RelativeNamespace(String),
}

/// Failure to read a definitions resource.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("resource not found: {name}")]
    ResourceNotFound { name: String },
    #[error("malformed interactions yaml in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal failures during service initialization.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("timed out after {timeout_ms}ms waiting for {what}")]
    SubscriptionTimeout { what: String, timeout_ms: u64 },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

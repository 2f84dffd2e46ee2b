// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{ApiError, ErrorCode};

#[yare::parameterized(
    success = { ErrorCode::Success, "SUCCESS" },
    unavailable = { ErrorCode::RoleAppUnavailable, "ROLE_APP_UNAVAILABLE" },
    quota = { ErrorCode::RoleAppQuotaReached, "ROLE_APP_QUOTA_REACHED" },
)]
fn error_code_wire_name(code: ErrorCode, expected: &str) {
    assert_eq!(code.as_str(), expected);
    assert_eq!(serde_json::to_value(code).ok(), Some(serde_json::json!(expected)));
}

#[test]
fn success_has_empty_message() {
    assert!(ErrorCode::Success.message().is_empty());
    assert!(!ErrorCode::RoleAppQuotaReached.message().is_empty());
}

#[test]
fn api_error_envelope() -> anyhow::Result<()> {
    let body = serde_json::to_value(ApiError::BadRequest.to_error_response("bad hash"))?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["error"]["message"], "bad hash");
    assert_eq!(ApiError::BadRequest.http_status(), 400);
    Ok(())
}

// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural and temporal checks on a backend response.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regcode_core::types::CodeResult;
use thiserror::Error;

use crate::types::GenerateCodeResponse;

/// Why a success response cannot be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidResponse {
    #[error("API no devolvió código")]
    MissingCode,

    /// Expired at or before validation time, or not a readable timestamp.
    #[error("API devolvió código vencido (expiresAt={raw})")]
    Expired { raw: String },
}

/// Validates a response against `now`.
///
/// A missing (or empty) `expiresAt` means the backend declared no expiry.
pub fn validate(
    body: &GenerateCodeResponse,
    now: DateTime<Utc>,
) -> Result<CodeResult, InvalidResponse> {
    let code = body
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(InvalidResponse::MissingCode)?;

    let expires_at = match body.expires_at.as_ref().filter(|v| is_declared(v)) {
        None => None,
        Some(raw) => match parse_expiry(raw) {
            Some(at) if at > now => Some(at),
            _ => {
                return Err(InvalidResponse::Expired {
                    raw: raw_text(raw),
                });
            }
        },
    };

    Ok(CodeResult {
        code: code.to_string(),
        expires_at,
        reused: body.reused.unwrap_or(false),
    })
}

fn is_declared(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// ISO-8601 strings, or integer epoch milliseconds.
fn parse_expiry(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => parse_iso8601(s.trim()),
        serde_json::Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// RFC 3339 first, then the looser ISO-8601 shapes backends emit: a
/// `+hhmm` offset, no offset at all, or a bare date. Values without an
/// offset are read as UTC; a bare date means midnight UTC.
fn parse_iso8601(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn raw_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

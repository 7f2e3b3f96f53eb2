// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for `POST /generate-code`.

use serde::{Deserialize, Serialize};

/// Request body. Field names follow the backend's camelCase contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeRequest<'a> {
    pub discord_id: &'a str,
    pub username: &'a str,
    pub request_id: &'a str,
}

/// Success body. Every field is optional on the wire; the validator decides
/// what is acceptable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeResponse {
    #[serde(default)]
    pub code: Option<String>,
    /// ISO-8601 string, or epoch milliseconds from older backends.
    #[serde(default)]
    pub expires_at: Option<serde_json::Value>,
    #[serde(default)]
    pub reused: Option<bool>,
}

impl GenerateCodeResponse {
    /// Parses a response body; anything unreadable becomes an empty response.
    pub fn parse_lenient(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so typos are rejected at
//! startup instead of silently falling back to defaults.

use serde::{Deserialize, Serialize};

/// Top-level regcode configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegcodeConfig {
    /// Code-generation backend.
    #[serde(default)]
    pub api: ApiConfig,

    /// Attempt loop and nested transport retry.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Per-user double-submission guard.
    #[serde(default)]
    pub cooldown: CooldownConfig,

    /// Operational audit log.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Trigger and message settings.
    #[serde(default)]
    pub bot: BotConfig,
}

/// Code-generation backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the backend; `/generate-code` is appended. Required.
    #[serde(default)]
    pub url: Option<String>,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Retry configuration.
///
/// Delays in the attempt loop are linear in the attempt number; the nested
/// transport retry doubles its delay after every failed call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Outer attempts against the backend.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Transport calls per attempt.
    #[serde(default = "default_transport_attempts")]
    pub transport_attempts: u32,

    /// First delay of the nested transport retry.
    #[serde(default = "default_transport_backoff_ms")]
    pub transport_backoff_ms: u64,

    /// Delay unit after an HTTP error status or a body without a code.
    #[serde(default = "default_upstream_backoff_ms")]
    pub upstream_backoff_ms: u64,

    /// Delay unit after a transport failure or an expired code.
    #[serde(default = "default_failure_backoff_ms")]
    pub failure_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            transport_attempts: default_transport_attempts(),
            transport_backoff_ms: default_transport_backoff_ms(),
            upstream_backoff_ms: default_upstream_backoff_ms(),
            failure_backoff_ms: default_failure_backoff_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_transport_attempts() -> u32 {
    2
}

fn default_transport_backoff_ms() -> u64 {
    150
}

fn default_upstream_backoff_ms() -> u64 {
    150
}

fn default_failure_backoff_ms() -> u64 {
    200
}

/// Cooldown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CooldownConfig {
    /// Window after an accepted trigger during which the user is rejected.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Extra time before the scheduled removal drops the entry.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            grace_ms: default_grace_ms(),
        }
    }
}

fn default_window_ms() -> u64 {
    3000
}

fn default_grace_ms() -> u64 {
    50
}

/// Audit log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Private admin channel that receives rendered events. `None` keeps
    /// events in the process log only.
    #[serde(default)]
    pub log_channel_id: Option<String>,

    /// Environment name shown in the event footer.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Release identifier (commit SHA) shown in the event footer.
    #[serde(default)]
    pub build_sha: Option<String>,

    /// Characters of an HTTP response body kept in an event.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,

    /// Characters of an error stack kept in an event.
    #[serde(default = "default_stack_limit")]
    pub stack_limit: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_channel_id: None,
            environment: default_environment(),
            build_sha: None,
            body_limit: default_body_limit(),
            stack_limit: default_stack_limit(),
        }
    }
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_body_limit() -> usize {
    400
}

fn default_stack_limit() -> usize {
    1500
}

/// Bot behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Text command that triggers a code request.
    #[serde(default = "default_command")]
    pub command: String,

    /// In-game command shown in the delivery message.
    #[serde(default = "default_register_command")]
    pub register_command: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            register_command: default_register_command(),
            log_level: default_log_level(),
        }
    }
}

fn default_command() -> String {
    "!codigo".to_string()
}

fn default_register_command() -> String {
    "!registrarse".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

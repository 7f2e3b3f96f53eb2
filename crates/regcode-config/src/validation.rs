// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Collects every problem instead of failing fast, so one startup run shows
//! the operator the whole list.

use crate::diagnostic::ConfigError;
use crate::model::RegcodeConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &RegcodeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    match config.api.url.as_deref().map(str::trim) {
        None | Some("") => fail(
            "api.url is required (set API_URL, REGCODE_API_URL or [api] url)".to_string(),
        ),
        Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            fail(format!("api.url `{url}` must start with http:// or https://"))
        }
        Some(_) => {}
    }

    if config.api.timeout_secs == 0 {
        fail("api.timeout_secs must be at least 1".to_string());
    }

    if config.retry.max_attempts == 0 {
        fail("retry.max_attempts must be at least 1".to_string());
    }

    if config.retry.transport_attempts == 0 {
        fail("retry.transport_attempts must be at least 1".to_string());
    }

    if config.cooldown.window_ms == 0 {
        fail("cooldown.window_ms must be greater than 0".to_string());
    }

    if config.audit.body_limit == 0 || config.audit.stack_limit == 0 {
        fail("audit.body_limit and audit.stack_limit must be greater than 0".to_string());
    }

    if config.audit.environment.trim().is_empty() {
        fail("audit.environment must not be empty".to_string());
    }

    if config.bot.command.trim().is_empty() {
        fail("bot.command must not be empty".to_string());
    }

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        fail(format!(
            "bot.log_level `{}` must be one of: {}",
            config.bot.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

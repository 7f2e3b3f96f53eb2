// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text rendering of audit events for chat log channels.
//!
//! Field order is fixed so that operators scanning a busy channel always
//! find the same line in the same place.

use regcode_config::model::AuditConfig;

use crate::event::{LogEvent, LogLevel};
use crate::identity::ProcessIdentity;

const ELLIPSIS: &str = "...";

/// Renders [`LogEvent`]s as multi-line text blobs.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    body_limit: usize,
    stack_limit: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::from_config(&AuditConfig::default())
    }
}

impl TextRenderer {
    pub fn new(body_limit: usize, stack_limit: usize) -> Self {
        Self {
            body_limit,
            stack_limit,
        }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self::new(config.body_limit, config.stack_limit)
    }

    pub fn render(&self, event: &LogEvent, identity: &ProcessIdentity) -> String {
        let mut lines = Vec::new();

        lines.push(
            match event.level {
                LogLevel::Error => "🔴 ERROR",
                LogLevel::Warn => "🟡 WARNING",
                LogLevel::Info => "🟢 INFO",
            }
            .to_string(),
        );

        if let Some(id) = &event.request_id {
            lines.push(format!("requestId: {id}"));
        }
        lines.push(format!("Action: {}", event.action));
        if let Some(user) = &event.user {
            let id = event.user_id.as_deref().unwrap_or("?");
            lines.push(format!("Usuario: {user} (ID: {id})"));
        }
        if let Some(code) = &event.code {
            let suffix = if event.reused { " (reused)" } else { "" };
            lines.push(format!("Codigo: {code}{suffix}"));
        }
        if let Some(api) = &event.api {
            let status = api
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string());
            lines.push(format!("API: status={status} latency={}ms", api.latency_ms));
            if let Some(body) = api.body.as_deref().filter(|b| !b.is_empty()) {
                lines.push(format!("API body: {}", truncate(body, self.body_limit, ELLIPSIS)));
            }
        }
        if let Some(sent) = event.dm_sent {
            lines.push(format!("DM: {}", if sent { "SENT" } else { "FAILED" }));
        }
        if let Some(error) = &event.dm_error {
            lines.push(format!("DM error: {error}"));
        }
        if let Some(deleted) = event.deleted_message {
            lines.push(format!("DeleteMessage: {}", if deleted { "OK" } else { "FAILED" }));
        }
        if let Some(attempts) = event.attempts {
            lines.push(format!("Attempts: {attempts}"));
        }
        if let Some(extra) = &event.extra {
            lines.push(format!("Extra: {extra}"));
        }

        lines.push(format!("Bot: {}", identity.footer()));

        if let Some(stack) = &event.error_stack {
            lines.push(format!("Stack: ```{}```", truncate(stack, self.stack_limit, "")));
        }

        lines.join("\n")
    }
}

/// Keeps the first `limit` characters (not bytes) and appends `marker` when
/// anything was cut.
pub fn truncate(text: &str, limit: usize, marker: &str) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{marker}", &text[..cut]),
        None => text.to_string(),
    }
}

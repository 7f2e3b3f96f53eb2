// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit sinks: where events go and how they look when they get there.

use std::sync::Arc;

use async_trait::async_trait;
use regcode_core::error::RegcodeError;
use regcode_core::traits::ChatPlatform;
use regcode_core::types::ChannelId;
use tracing::{error, info, warn};

use crate::event::{LogEvent, LogLevel};
use crate::identity::ProcessIdentity;
use crate::render::TextRenderer;

/// A destination for audit events.
///
/// Sinks may fail; the [`AuditLogger`](crate::AuditLogger) absorbs the error.
#[async_trait]
pub trait LogSink: Send + Sync + 'static {
    /// Name used when reporting the sink's own failures.
    fn name(&self) -> &str;

    /// Publishes one event.
    async fn publish(&self, event: &LogEvent, identity: &ProcessIdentity)
    -> Result<(), RegcodeError>;
}

/// Writes events to the process log as structured `tracing` fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! audit_record {
    ($macro:ident, $event:expr, $identity:expr) => {{
        let event = $event;
        let api = event.api.as_ref();
        $macro!(
            action = %event.action,
            request_id = event.request_id.as_ref().map(|id| id.as_str()).unwrap_or("-"),
            user_id = event.user_id.as_deref().unwrap_or("-"),
            user = event.user.as_deref().unwrap_or("-"),
            status = ?api.and_then(|a| a.status),
            latency_ms = ?api.map(|a| a.latency_ms),
            attempts = ?event.attempts,
            dm_sent = ?event.dm_sent,
            deleted_message = ?event.deleted_message,
            reused = event.reused,
            pid = $identity.pid,
            env = %$identity.environment,
            extra = event.extra.as_deref().unwrap_or(""),
            error = event.dm_error.as_deref().or(event.error_stack.as_deref()).unwrap_or(""),
            "audit event"
        )
    }};
}

#[async_trait]
impl LogSink for TracingSink {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn publish(
        &self,
        event: &LogEvent,
        identity: &ProcessIdentity,
    ) -> Result<(), RegcodeError> {
        match event.level {
            LogLevel::Info => audit_record!(info, event, identity),
            LogLevel::Warn => audit_record!(warn, event, identity),
            LogLevel::Error => audit_record!(error, event, identity),
        }
        Ok(())
    }
}

/// Posts rendered events to an operations channel on the chat platform.
pub struct ChannelSink {
    platform: Arc<dyn ChatPlatform>,
    channel: ChannelId,
    renderer: TextRenderer,
}

impl ChannelSink {
    pub fn new(platform: Arc<dyn ChatPlatform>, channel: ChannelId, renderer: TextRenderer) -> Self {
        Self {
            platform,
            channel,
            renderer,
        }
    }
}

#[async_trait]
impl LogSink for ChannelSink {
    fn name(&self) -> &str {
        "channel"
    }

    async fn publish(
        &self,
        event: &LogEvent,
        identity: &ProcessIdentity,
    ) -> Result<(), RegcodeError> {
        let text = self.renderer.render(event, identity);
        self.platform
            .send_channel(&self.channel, &text)
            .await
            .map(|_| ())
            .map_err(|e| RegcodeError::Sink {
                message: format!("failed to post audit event to channel {}", self.channel),
                source: Some(Box::new(e)),
            })
    }
}

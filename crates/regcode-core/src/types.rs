// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the platform boundary, the code client and the
//! orchestrator.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Platform identifier of a user (a Discord snowflake, for instance).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Platform identifier of a public channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

/// Platform identifier of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Correlation id attached to every audit event of one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generates a fresh random (UUID v4) correlation id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user who fired a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    /// Account name sent to the backend.
    pub username: String,
    /// Name shown in audit logs (e.g. `name#1234` or a global display name).
    pub display_name: String,
    /// Bot accounts never trigger an orchestration.
    pub is_bot: bool,
}

impl UserRef {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id: UserId(id.into()),
            display_name: username.clone(),
            username,
            is_bot: false,
        }
    }

    /// Platform mention markup for public channel messages.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// How a trigger reached the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerSource {
    /// A plain text command posted in a channel. The message can be deleted.
    TextCommand { message_id: MessageId },
    /// A structured interaction (slash command); there is nothing to delete.
    Interaction { command: String },
}

impl TriggerSource {
    pub fn kind(&self) -> TriggerKind {
        match self {
            TriggerSource::TextCommand { .. } => TriggerKind::TextCommand,
            TriggerSource::Interaction { .. } => TriggerKind::Interaction,
        }
    }
}

/// Tag-only view of [`TriggerSource`], used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum TriggerKind {
    TextCommand,
    Interaction,
}

/// A user action that initiates one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    pub user: UserRef,
    pub channel: ChannelId,
    pub source: TriggerSource,
}

impl TriggerEvent {
    /// Builds a trigger from a channel message if its content is the command.
    ///
    /// Matching ignores surrounding whitespace and ASCII case. Messages from
    /// bot accounts never match.
    pub fn from_text(
        user: UserRef,
        channel: ChannelId,
        message_id: MessageId,
        content: &str,
        command: &str,
    ) -> Option<Self> {
        if user.is_bot || !content.trim().eq_ignore_ascii_case(command.trim()) {
            return None;
        }
        Some(Self {
            user,
            channel,
            source: TriggerSource::TextCommand { message_id },
        })
    }

    /// Builds a trigger from a structured interaction.
    pub fn from_interaction(user: UserRef, channel: ChannelId, command: impl Into<String>) -> Self {
        Self {
            user,
            channel,
            source: TriggerSource::Interaction {
                command: command.into(),
            },
        }
    }
}

/// A validated code returned by the backend. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeResult {
    pub code: String,
    /// `None` when the backend declared no expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// The backend handed out a still-valid code it had issued before.
    pub reused: bool,
}

/// One orchestration run. Only `attempt_count` changes after creation.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: RequestId,
    pub user: UserRef,
    pub triggered_at: DateTime<Utc>,
    pub attempt_count: u32,
}

impl Request {
    pub fn new(user: UserRef) -> Self {
        Self {
            id: RequestId::generate(),
            user,
            triggered_at: Utc::now(),
            attempt_count: 0,
        }
    }
}

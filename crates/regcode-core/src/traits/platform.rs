// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat platform trait for messaging integrations (Discord, console, mocks).

use async_trait::async_trait;

use crate::error::RegcodeError;
use crate::types::{ChannelId, MessageId, UserRef};

/// Capability-typed operations the orchestrator needs from a chat platform.
///
/// Connection setup, intents and command registration stay inside the
/// adapter; the core only ever sends, posts and deletes.
#[async_trait]
pub trait ChatPlatform: Send + Sync + 'static {
    /// Returns the human-readable name of this platform adapter.
    fn name(&self) -> &str;

    /// Sends a private (direct) message to a user.
    async fn send_private(&self, user: &UserRef, text: &str) -> Result<MessageId, RegcodeError>;

    /// Posts a message in a public channel.
    async fn send_channel(&self, channel: &ChannelId, text: &str)
    -> Result<MessageId, RegcodeError>;

    /// Deletes a message previously posted in a channel.
    async fn delete_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<(), RegcodeError>;
}

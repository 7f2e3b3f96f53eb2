// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat platform for deterministic testing.
//!
//! `MockPlatform` implements `ChatPlatform` and captures every private
//! message, channel post and deletion for assertion in tests. Each
//! operation can be switched to fail, and private sends can be switched to
//! panic.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use regcode_core::error::RegcodeError;
use regcode_core::traits::ChatPlatform;
use regcode_core::types::{ChannelId, MessageId, UserRef};
use tokio::sync::Mutex;

/// Where a captured message was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Private { user_id: String, content: String },
    Channel { channel_id: String, content: String },
}

impl SentMessage {
    pub fn content(&self) -> &str {
        match self {
            SentMessage::Private { content, .. } | SentMessage::Channel { content, .. } => content,
        }
    }
}

/// A mock chat platform for testing.
#[derive(Default)]
pub struct MockPlatform {
    sent: Mutex<Vec<SentMessage>>,
    deleted: Mutex<Vec<(ChannelId, MessageId)>>,
    fail_private: AtomicBool,
    fail_channel: AtomicBool,
    fail_delete: AtomicBool,
    panic_private: AtomicBool,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Private messages are rejected, as when the user has DMs closed.
    pub fn fail_private(&self, fail: bool) {
        self.fail_private.store(fail, Ordering::SeqCst);
    }

    pub fn fail_channel(&self, fail: bool) {
        self.fail_channel.store(fail, Ordering::SeqCst);
    }

    /// Deletions are rejected, as when the bot lacks permission.
    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn panic_on_private(&self, panic: bool) {
        self.panic_private.store(panic, Ordering::SeqCst);
    }

    /// Every successful send, in order.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn private_messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                SentMessage::Private { content, .. } => Some(content.clone()),
                SentMessage::Channel { .. } => None,
            })
            .collect()
    }

    pub async fn channel_messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                SentMessage::Channel { content, .. } => Some(content.clone()),
                SentMessage::Private { .. } => None,
            })
            .collect()
    }

    pub async fn deleted_messages(&self) -> Vec<(ChannelId, MessageId)> {
        self.deleted.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
        self.deleted.lock().await.clear();
    }

    fn next_id() -> MessageId {
        MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4()))
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send_private(&self, user: &UserRef, content: &str) -> Result<MessageId, RegcodeError> {
        if self.panic_private.load(Ordering::SeqCst) {
            panic!("mock platform panicked while sending a private message");
        }
        if self.fail_private.load(Ordering::SeqCst) {
            return Err(RegcodeError::platform(
                "Cannot send messages to this user",
            ));
        }
        self.sent.lock().await.push(SentMessage::Private {
            user_id: user.id.to_string(),
            content: content.to_string(),
        });
        Ok(Self::next_id())
    }

    async fn send_channel(
        &self,
        channel: &ChannelId,
        content: &str,
    ) -> Result<MessageId, RegcodeError> {
        if self.fail_channel.load(Ordering::SeqCst) {
            return Err(RegcodeError::platform("Missing Access"));
        }
        self.sent.lock().await.push(SentMessage::Channel {
            channel_id: channel.to_string(),
            content: content.to_string(),
        });
        Ok(Self::next_id())
    }

    async fn delete_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<(), RegcodeError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(RegcodeError::platform("Missing Permissions"));
        }
        self.deleted
            .lock()
            .await
            .push((channel.clone(), message.clone()));
        Ok(())
    }
}

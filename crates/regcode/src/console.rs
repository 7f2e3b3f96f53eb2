// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Console chat platform.
//!
//! Prints private messages, channel posts and deletions to stdout, one
//! tagged block per operation. Used by `regcode request` and `regcode serve`
//! to drive the orchestrator without a chat service.

use async_trait::async_trait;
use regcode_core::error::RegcodeError;
use regcode_core::traits::ChatPlatform;
use regcode_core::types::{ChannelId, MessageId, UserRef};
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

pub struct ConsolePlatform {
    out: Mutex<Stdout>,
}

impl ConsolePlatform {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }

    async fn write_block(&self, header: &str, body: &str) -> Result<MessageId, RegcodeError> {
        let block = format!("{header}\n{body}\n");
        let mut out = self.out.lock().await;
        let written = async {
            out.write_all(block.as_bytes()).await?;
            out.flush().await
        }
        .await;
        written.map_err(|e| RegcodeError::Platform {
                message: "failed to write to stdout".into(),
                source: Some(Box::new(e)),
            })?;
        Ok(MessageId(uuid::Uuid::new_v4().to_string()))
    }
}

impl Default for ConsolePlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatPlatform for ConsolePlatform {
    fn name(&self) -> &str {
        "console"
    }

    async fn send_private(&self, user: &UserRef, text: &str) -> Result<MessageId, RegcodeError> {
        self.write_block(&format!("[dm -> {} ({})]", user.username, user.id), text)
            .await
    }

    async fn send_channel(
        &self,
        channel: &ChannelId,
        text: &str,
    ) -> Result<MessageId, RegcodeError> {
        self.write_block(&format!("[#{channel}]"), text).await
    }

    async fn delete_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<(), RegcodeError> {
        self.write_block(&format!("[#{channel}]"), &format!("(deleted {})", message.0))
            .await
            .map(|_| ())
    }
}

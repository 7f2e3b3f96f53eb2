// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for regcode.
//!
//! This crate provides the shared error type, the chat-platform boundary
//! trait, and the request/trigger types that flow between the audit logger,
//! the code client, and the orchestrator.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RegcodeError;
pub use traits::ChatPlatform;
pub use types::{
    ChannelId, CodeResult, MessageId, Request, RequestId, TriggerEvent, TriggerKind,
    TriggerSource, UserId, UserRef,
};

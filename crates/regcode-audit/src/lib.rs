// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured audit logging for regcode.
//!
//! Every orchestration run produces [`LogEvent`]s tagged with its request id.
//! The [`AuditLogger`] fans each event out to its [`LogSink`]s and never
//! returns an error: a failing sink is reported to the process log and
//! otherwise ignored.
//!
//! Events are plain data. Presentation belongs to the sink:
//! - [`TracingSink`] writes structured `tracing` fields.
//! - [`ChannelSink`] renders text with [`TextRenderer`] and posts it to an
//!   admin channel on the chat platform.

pub mod event;
pub mod identity;
pub mod logger;
pub mod render;
pub mod sink;

pub use event::{Action, ApiSummary, LogEvent, LogLevel};
pub use identity::ProcessIdentity;
pub use logger::AuditLogger;
pub use render::TextRenderer;
pub use sink::{ChannelSink, LogSink, TracingSink};

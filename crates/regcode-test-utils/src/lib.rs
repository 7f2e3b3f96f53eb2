// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for regcode integration tests.
//!
//! # Components
//!
//! - [`MockPlatform`] - Chat platform that records every send and deletion
//!   and can be told to fail (or panic) per operation
//! - [`MemorySink`] - Audit sink that keeps events in memory for assertions

pub mod memory_sink;
pub mod mock_platform;

pub use memory_sink::MemorySink;
pub use mock_platform::{MockPlatform, SentMessage};

// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boundary traits implemented by platform adapters.

pub mod platform;

pub use platform::ChatPlatform;

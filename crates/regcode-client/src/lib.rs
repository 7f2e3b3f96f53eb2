// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the registration code backend.
//!
//! [`CodeClient::request_code`] runs the attempt loop: each attempt is one
//! `POST /generate-code` (itself retried at the transport level), and its
//! response goes through [`validate`] before a code is handed back. Every
//! attempt produces exactly one audit event.

pub mod client;
pub mod policy;
pub mod types;
pub mod validator;

pub use client::{AttemptError, CodeClient, CodeOutcome};
pub use policy::RetryPolicy;
pub use types::{GenerateCodeRequest, GenerateCodeResponse};
pub use validator::{InvalidResponse, validate};

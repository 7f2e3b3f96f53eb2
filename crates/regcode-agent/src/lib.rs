// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request orchestration for regcode.
//!
//! The [`Orchestrator`] takes a [`TriggerEvent`](regcode_core::TriggerEvent)
//! through the cooldown check, the code client and the delivery dispatcher,
//! ending in exactly one [`Outcome`].

pub mod cooldown;
pub mod delivery;
pub mod messages;
pub mod orchestrator;
pub mod shutdown;

pub use cooldown::{CooldownDecision, CooldownGuard};
pub use delivery::{DeliveryDispatcher, DeliveryOutcome};
pub use orchestrator::{Orchestrator, Outcome, build_audit_logger};

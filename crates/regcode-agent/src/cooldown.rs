// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user cooldown that suppresses accidental double submissions.
//!
//! Each accepted trigger reserves the user for `window`. A tokio task removes
//! the reservation after `window + grace`; it only removes the reservation
//! that scheduled it, so a newer reservation is never cut short. All removal
//! tasks stop when the guard is shut down or dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use regcode_config::model::CooldownConfig;
use regcode_core::types::UserId;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Result of [`CooldownGuard::check_and_reserve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    Allowed,
    Rejected { remaining: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Reservation {
    at: Instant,
    seq: u64,
}

pub struct CooldownGuard {
    entries: Arc<DashMap<UserId, Reservation>>,
    window: Duration,
    grace: Duration,
    next_seq: AtomicU64,
    cancel: CancellationToken,
}

impl CooldownGuard {
    pub fn new(window: Duration, grace: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            window,
            grace,
            next_seq: AtomicU64::new(0),
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(config: &CooldownConfig) -> Self {
        Self::new(
            Duration::from_millis(config.window_ms),
            Duration::from_millis(config.grace_ms),
        )
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Accepts the user and records the reservation, or rejects them with
    /// the time left. A rejection leaves the existing reservation untouched.
    ///
    /// Must be called from within a tokio runtime.
    pub fn check_and_reserve(&self, user: &UserId) -> CooldownDecision {
        let now = Instant::now();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let reservation = Reservation { at: now, seq };

        // The shard lock is held across the check and the insert.
        match self.entries.entry(user.clone()) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.saturating_duration_since(entry.get().at);
                if elapsed < self.window {
                    return CooldownDecision::Rejected {
                        remaining: self.window - elapsed,
                    };
                }
                entry.insert(reservation);
            }
            Entry::Vacant(entry) => {
                entry.insert(reservation);
            }
        }

        self.schedule_removal(user.clone(), seq);
        CooldownDecision::Allowed
    }

    /// Time left before `user` may trigger again, if they are cooling down.
    pub fn remaining(&self, user: &UserId) -> Option<Duration> {
        let entry = self.entries.get(user)?;
        let elapsed = Instant::now().saturating_duration_since(entry.at);
        (elapsed < self.window).then(|| self.window - elapsed)
    }

    /// Number of tracked reservations, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stops every pending removal task. Reservations stay in place but
    /// still expire by time.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn schedule_removal(&self, user: UserId, seq: u64) {
        let entries = Arc::clone(&self.entries);
        let cancel = self.cancel.clone();
        let delay = self.window + self.grace;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if entries.remove_if(&user, |_, r| r.seq == seq).is_some() {
                        debug!(user_id = %user, "cooldown reservation expired");
                    }
                }
            }
        });
    }
}

impl Drop for CooldownGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> CooldownGuard {
        CooldownGuard::new(Duration::from_millis(3000), Duration::from_millis(50))
    }

    fn user(id: &str) -> UserId {
        UserId(id.into())
    }

    #[tokio::test(start_paused = true)]
    async fn second_trigger_within_window_is_rejected() {
        let guard = guard();
        assert_eq!(guard.check_and_reserve(&user("1")), CooldownDecision::Allowed);

        tokio::time::advance(Duration::from_millis(1000)).await;
        assert_eq!(
            guard.check_and_reserve(&user("1")),
            CooldownDecision::Rejected {
                remaining: Duration::from_millis(2000)
            }
        );

        // The rejection did not refresh the reservation.
        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(guard.remaining(&user("1")), Some(Duration::from_millis(1500)));
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_after_window_is_allowed() {
        let guard = guard();
        assert_eq!(guard.check_and_reserve(&user("1")), CooldownDecision::Allowed);

        tokio::time::advance(Duration::from_millis(3000)).await;
        assert_eq!(guard.check_and_reserve(&user("1")), CooldownDecision::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn reservation_is_removed_after_window_and_grace() {
        let guard = guard();
        guard.check_and_reserve(&user("1"));
        assert_eq!(guard.len(), 1);

        tokio::time::sleep(Duration::from_millis(3049)).await;
        assert_eq!(guard.len(), 1);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(guard.is_empty());
        assert_eq!(guard.remaining(&user("1")), None);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_removal_does_not_drop_newer_reservation() {
        let guard = guard();
        guard.check_and_reserve(&user("1"));

        // Re-reserve at exactly the window edge, before the first removal fires.
        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(guard.check_and_reserve(&user("1")), CooldownDecision::Allowed);

        // The first removal task fires at 3050 and must leave the new entry.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(matches!(
            guard.check_and_reserve(&user("1")),
            CooldownDecision::Rejected { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn users_are_independent() {
        let guard = guard();
        assert_eq!(guard.check_and_reserve(&user("1")), CooldownDecision::Allowed);
        assert_eq!(guard.check_and_reserve(&user("2")), CooldownDecision::Allowed);
        assert_eq!(guard.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_removal_but_reservations_still_expire() {
        let guard = guard();
        guard.check_and_reserve(&user("1"));
        guard.shutdown();

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(guard.len(), 1);
        assert_eq!(guard.remaining(&user("1")), None);
        assert_eq!(guard.check_and_reserve(&user("1")), CooldownDecision::Allowed);
    }
}

// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attempt counts and backoff delays.

use std::time::Duration;

use regcode_config::model::RetryConfig;

/// Retry schedule for [`CodeClient`](crate::CodeClient).
///
/// The attempt loop waits `unit * attempt` between attempts; the nested
/// transport retry starts at `transport_backoff` and doubles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub transport_attempts: u32,
    pub transport_backoff: Duration,
    /// Unit after an error status or a body without a code.
    pub upstream_backoff: Duration,
    /// Unit after a transport failure or an expired code.
    pub failure_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            transport_attempts: config.transport_attempts.max(1),
            transport_backoff: Duration::from_millis(config.transport_backoff_ms),
            upstream_backoff: Duration::from_millis(config.upstream_backoff_ms),
            failure_backoff: Duration::from_millis(config.failure_backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// Same attempt counts, every delay set to `delay`. Handy in tests.
    pub fn with_uniform_delay(mut self, delay: Duration) -> Self {
        self.transport_backoff = delay;
        self.upstream_backoff = delay;
        self.failure_backoff = delay;
        self
    }

    pub fn upstream_delay(&self, attempt: u32) -> Duration {
        self.upstream_backoff * attempt
    }

    pub fn failure_delay(&self, attempt: u32) -> Duration {
        self.failure_backoff * attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_contract() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.transport_attempts, 2);
        assert_eq!(policy.transport_backoff, Duration::from_millis(150));
        assert_eq!(policy.upstream_delay(2), Duration::from_millis(300));
        assert_eq!(policy.failure_delay(3), Duration::from_millis(600));
    }

    #[test]
    fn zero_attempts_are_clamped() {
        let config = RetryConfig {
            max_attempts: 0,
            transport_attempts: 0,
            ..RetryConfig::default()
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.transport_attempts, 1);
    }
}

//! Reconnect policy for the Gateway run loop.

use std::time::Duration;

use crate::error::GatewayError;
use crate::gateway::GatewayConfig;

/// Decides whether, and after how long, the run loop may dial again.
///
/// Tracks the streak of consecutive failed connection attempts against
/// the configured limit and spaces retries with full-jitter exponential
/// delays: a uniform draw from zero up to the doubling ceiling
/// `min(cap, base * 2^(failures - 1))`. A healthy session resets the
/// streak, so a bot that reconnects once an hour never escalates its
/// delays.
pub(crate) struct ReconnectPolicy {
    config: GatewayConfig,
    failures: u32,
}

impl ReconnectPolicy {
    pub(crate) fn new(config: &GatewayConfig) -> Self {
        Self {
            config: config.clone(),
            failures: 0,
        }
    }

    /// Account for one failed attempt and compute the wait before the
    /// next. Fails with [`GatewayError::ReconnectsExhausted`] once the
    /// configured limit is passed.
    pub(crate) fn next_attempt(&mut self) -> Result<Duration, GatewayError> {
        self.failures = self.failures.saturating_add(1);
        if self.failures > self.config.max_reconnect_attempts {
            return Err(GatewayError::ReconnectsExhausted(self.failures));
        }
        let doublings = self.failures.saturating_sub(1);
        let ceiling = self
            .config
            .backoff_cap_ms
            .min(
                self.config
                    .backoff_base_ms
                    .saturating_mul(2u64.saturating_pow(doublings)),
            );
        Ok(Duration::from_millis(fastrand::u64(0..=ceiling)))
    }

    /// Note a healthy session; the failure streak starts over.
    pub(crate) fn record_success(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failures since the last healthy session.
    pub(crate) fn failures(&self) -> u32 {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max: u32, base_ms: u64, cap_ms: u64) -> GatewayConfig {
        GatewayConfig {
            max_reconnect_attempts: max,
            backoff_base_ms: base_ms,
            backoff_cap_ms: cap_ms,
        }
    }

    #[test]
    fn delays_follow_the_doubling_ceiling() {
        let mut policy = ReconnectPolicy::new(&config(u32::MAX, 500, 60_000));
        for ceiling_ms in [500u64, 1000, 2000, 4000, 8000] {
            let delay = policy.next_attempt().unwrap();
            assert!(delay <= Duration::from_millis(ceiling_ms));
        }
    }

    #[test]
    fn cap_bounds_every_delay() {
        let mut policy = ReconnectPolicy::new(&config(u32::MAX, 1000, 3000));
        for _ in 0..32 {
            assert!(policy.next_attempt().unwrap() <= Duration::from_millis(3000));
        }
    }

    #[test]
    fn exhausting_the_attempt_limit_is_fatal() {
        let mut policy = ReconnectPolicy::new(&config(2, 0, 0));
        assert!(policy.next_attempt().is_ok());
        assert!(policy.next_attempt().is_ok());
        let err = policy.next_attempt().unwrap_err();
        assert!(matches!(err, GatewayError::ReconnectsExhausted(3)));
        assert!(err.is_fatal());
    }

    #[test]
    fn a_healthy_session_restarts_the_streak() {
        let mut policy = ReconnectPolicy::new(&config(2, 0, 0));
        let _ = policy.next_attempt();
        let _ = policy.next_attempt();
        assert_eq!(policy.failures(), 2);
        policy.record_success();
        assert_eq!(policy.failures(), 0);
        assert!(policy.next_attempt().is_ok());
    }

    #[test]
    fn default_config_never_exhausts() {
        let mut policy = ReconnectPolicy::new(&GatewayConfig::default());
        for _ in 0..100 {
            assert!(policy.next_attempt().is_ok());
        }
    }

    #[test]
    fn extreme_streaks_and_bounds_do_not_overflow() {
        let mut policy = ReconnectPolicy::new(&config(u32::MAX, u64::MAX, u64::MAX));
        for _ in 0..80 {
            let _ = policy.next_attempt().unwrap();
        }
    }
}

//! Authentication configuration.

use chrono::Duration;
use std::time::Duration as StdDuration;

use super::attempts::AttemptPolicy;

const DEFAULT_ACCESS_TTL_SECONDS: i64 = 60 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_REFRESH_TTL_EXTENDED_SECONDS: i64 = 30 * 24 * 60 * 60;
const DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 5;
const DEFAULT_ATTEMPT_WINDOW_SECONDS: i64 = 15 * 60;
const DEFAULT_LOCKOUT_SECONDS: i64 = 30 * 60;
const DEFAULT_IDENTITY_TIMEOUT_MILLIS: u64 = 3_000;
const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
    refresh_ttl_extended_seconds: i64,
    max_failed_attempts: u32,
    attempt_window_seconds: i64,
    lockout_seconds: i64,
    identity_timeout_millis: u64,
    sweep_interval_seconds: u64,
    cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
            refresh_ttl_extended_seconds: DEFAULT_REFRESH_TTL_EXTENDED_SECONDS,
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            attempt_window_seconds: DEFAULT_ATTEMPT_WINDOW_SECONDS,
            lockout_seconds: DEFAULT_LOCKOUT_SECONDS,
            identity_timeout_millis: DEFAULT_IDENTITY_TIMEOUT_MILLIS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
            cookie_secure: true,
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_extended_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_extended_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_max_failed_attempts(mut self, attempts: u32) -> Self {
        self.max_failed_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_attempt_window_seconds(mut self, seconds: i64) -> Self {
        self.attempt_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_lockout_seconds(mut self, seconds: i64) -> Self {
        self.lockout_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_identity_timeout_millis(mut self, millis: u64) -> Self {
        self.identity_timeout_millis = millis;
        self
    }

    #[must_use]
    pub fn with_sweep_interval_seconds(mut self, seconds: u64) -> Self {
        self.sweep_interval_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn access_ttl(&self) -> Duration {
        Duration::seconds(self.access_ttl_seconds)
    }

    #[must_use]
    pub fn refresh_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_ttl_seconds)
    }

    #[must_use]
    pub fn refresh_ttl_extended(&self) -> Duration {
        Duration::seconds(self.refresh_ttl_extended_seconds)
    }

    #[must_use]
    pub fn refresh_ttl_extended_seconds(&self) -> i64 {
        self.refresh_ttl_extended_seconds
    }

    #[must_use]
    pub fn attempt_policy(&self) -> AttemptPolicy {
        AttemptPolicy {
            max_attempts: self.max_failed_attempts,
            attempt_window: Duration::seconds(self.attempt_window_seconds),
            lockout_duration: Duration::seconds(self.lockout_seconds),
        }
    }

    #[must_use]
    pub fn identity_timeout(&self) -> StdDuration {
        StdDuration::from_millis(self.identity_timeout_millis)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.sweep_interval_seconds)
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

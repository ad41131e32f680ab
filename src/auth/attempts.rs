//! Failed-login tracking and account lockout.
//!
//! Each identity moves through `Clear -> Accumulating(n) -> Blocked`.
//! Failures accumulate inside a rolling window; hitting the limit sets
//! `locked`/`locked_until` on the identity record through the store. The
//! lockout expires lazily: nothing unlocks accounts in the background, the
//! next attempt after `locked_until` simply passes the check and a
//! successful login clears the flag.
//!
//! The increment-and-check runs under the map's per-entry lock, so two
//! concurrent failures against the same identity serialize and cannot both
//! observe the same count.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::warn;

use super::clock::Clock;
use super::identity::{Identity, IdentityStore};

#[derive(Debug, Clone, Copy)]
pub struct AttemptPolicy {
    /// Failures allowed before the account is blocked.
    pub max_attempts: u32,
    /// Rolling window measured from the first failure in the window.
    pub attempt_window: Duration,
    /// How long a triggered lockout lasts.
    pub lockout_duration: Duration,
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            attempt_window: Duration::minutes(15),
            lockout_duration: Duration::minutes(30),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AttemptWindow {
    failure_count: u32,
    window_start: DateTime<Utc>,
    locked_until: Option<DateTime<Utc>>,
}

impl AttemptWindow {
    const fn start(now: DateTime<Utc>) -> Self {
        Self {
            failure_count: 0,
            window_start: now,
            locked_until: None,
        }
    }
}

/// Outcome of recording one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Still under the limit.
    Accumulating { failures: u32 },
    /// This failure crossed the limit and the account is now blocked.
    Locked { locked_until: DateTime<Utc> },
}

pub struct LoginAttemptTracker {
    policy: AttemptPolicy,
    windows: DashMap<String, AttemptWindow>,
    identities: Arc<dyn IdentityStore>,
    clock: Arc<dyn Clock>,
}

impl LoginAttemptTracker {
    #[must_use]
    pub fn new(
        policy: AttemptPolicy,
        identities: Arc<dyn IdentityStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            policy,
            windows: DashMap::new(),
            identities,
            clock,
        }
    }

    /// Record one failed attempt; blocks the identity when the limit is hit.
    pub async fn record_failure(&self, identity: &Identity) -> FailureOutcome {
        let now = self.clock.now();
        let key = identity.id.to_string();

        // The entry guard is the atomic step: increment and threshold check
        // happen while no other caller can touch this identity's window.
        let outcome = {
            let mut entry = self
                .windows
                .entry(key)
                .or_insert_with(|| AttemptWindow::start(now));
            let window = entry.value_mut();
            if now - window.window_start > self.policy.attempt_window {
                *window = AttemptWindow::start(now);
            }
            window.failure_count += 1;
            if window.failure_count >= self.policy.max_attempts {
                let locked_until = now + self.policy.lockout_duration;
                window.locked_until = Some(locked_until);
                FailureOutcome::Locked { locked_until }
            } else {
                FailureOutcome::Accumulating {
                    failures: window.failure_count,
                }
            }
        };

        // Persist outside the entry lock. The accumulating branch writes the
        // count only; concurrent persists can land in either order, and a
        // late count write must not undo a lock already written.
        let persisted = match outcome {
            FailureOutcome::Locked { locked_until } => {
                self.identities
                    .update_lockout_state(
                        identity.id,
                        true,
                        Some(locked_until),
                        self.policy.max_attempts,
                    )
                    .await
            }
            FailureOutcome::Accumulating { failures } => {
                self.identities
                    .record_failure_count(identity.id, failures)
                    .await
            }
        };
        // A failed write leaves the local window authoritative for this
        // process.
        if let Err(err) = persisted {
            warn!(identity_id = %identity.id, "Failed to persist lockout state: {err}");
        }

        outcome
    }

    /// Clear the window after a successful login; also lifts an expired lock.
    pub async fn record_success(&self, identity: &Identity) {
        let now = self.clock.now();
        self.windows.remove(&identity.id.to_string());

        let lock_expired = identity.locked && identity.locked_until.is_none_or(|until| now >= until);
        if lock_expired || identity.failed_attempt_count > 0 {
            if let Err(err) = self
                .identities
                .update_lockout_state(identity.id, false, None, 0)
                .await
            {
                warn!(identity_id = %identity.id, "Failed to clear lockout state: {err}");
            }
        }
    }

    /// Lockout check, evaluated lazily against the clock. Consults both the
    /// identity record and any lockout this process decided but has not yet
    /// persisted, so a concurrent attempt cannot slip through the gap.
    #[must_use]
    pub fn is_blocked(&self, identity: &Identity) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        if identity.locked {
            if let Some(until) = identity.locked_until {
                if now < until {
                    return Some(until);
                }
            }
        }
        if let Some(window) = self.windows.get(&identity.id.to_string()) {
            if let Some(until) = window.locked_until {
                if now < until {
                    return Some(until);
                }
            }
        }
        None
    }

    /// Drop windows that are past the rolling window and carry no active
    /// lock; returns how many were removed. Identities that fail once and
    /// never come back would otherwise keep their entry forever.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            let lock_active = window.locked_until.is_some_and(|until| now < until);
            lock_active || now - window.window_start <= self.policy.attempt_window
        });
        before - self.windows.len()
    }
}

/// Spawn the periodic window prune worker. Returns the task handle so
/// callers can abort it on shutdown.
pub fn spawn_pruner(
    tracker: Arc<LoginAttemptTracker>,
    period: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = tracker.prune(tracker.clock.now());
            tracing::info!(removed, "Attempt window prune completed");
        }
    })
}

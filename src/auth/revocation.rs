//! Revoked-token blacklist.
//!
//! Tokens are keyed by a one-way fingerprint so raw credentials never sit in
//! the store. Entries carry the token's own expiry; once that passes, the
//! token already fails signature/expiry checks, so a periodic sweep drops the
//! entry instead of keeping it forever. The sweep runs on its own schedule
//! and is never invoked from the read path.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::clock::Clock;

/// One-way fingerprint used as the blacklist key.
#[must_use]
pub fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub trait RevocationStore: Send + Sync {
    /// Mark a token revoked until its natural expiry. Revoking an already
    /// revoked token is a no-op.
    fn revoke(&self, token: &str, expires_at: DateTime<Utc>);

    /// Hot-path check; O(1) average and read-only.
    fn is_revoked(&self, token: &str) -> bool;

    /// Drop entries whose expiry has passed; returns how many were removed.
    /// Never removes an unexpired entry.
    fn sweep(&self, now: DateTime<Utc>) -> usize;
}

/// In-memory store; reads take no lock that writers on other keys contend on.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    entries: DashMap<String, DateTime<Utc>>,
}

impl InMemoryRevocationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn revoke(&self, token: &str, expires_at: DateTime<Utc>) {
        self.entries.insert(fingerprint(token), expires_at);
    }

    fn is_revoked(&self, token: &str) -> bool {
        self.entries.contains_key(&fingerprint(token))
    }

    fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at >= now);
        before - self.entries.len()
    }
}

/// Spawn the periodic sweep worker. Returns the task handle so callers can
/// abort it on shutdown.
pub fn spawn_sweeper(
    store: Arc<dyn RevocationStore>,
    clock: Arc<dyn Clock>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.sweep(clock.now());
            info!(removed, "Revocation sweep completed");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn revoked_token_is_found() {
        let store = InMemoryRevocationStore::new();
        let expires_at = Utc::now() + Duration::hours(1);

        store.revoke("token-a", expires_at);
        assert!(store.is_revoked("token-a"));
        assert!(!store.is_revoked("token-b"));
    }

    #[test]
    fn revoke_is_idempotent() {
        let store = InMemoryRevocationStore::new();
        let expires_at = Utc::now() + Duration::hours(1);

        store.revoke("token-a", expires_at);
        store.revoke("token-a", expires_at);
        assert!(store.is_revoked("token-a"));
        assert_eq!(store.sweep(Utc::now()), 0);
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let store = InMemoryRevocationStore::new();
        let now = Utc::now();

        store.revoke("expired", now - Duration::minutes(1));
        store.revoke("live", now + Duration::hours(1));

        assert_eq!(store.sweep(now), 1);
        assert!(!store.is_revoked("expired"));
        assert!(store.is_revoked("live"));
    }

    #[test]
    fn fingerprint_is_stable_and_not_the_token() {
        let first = fingerprint("secret-token");
        let second = fingerprint("secret-token");
        assert_eq!(first, second);
        assert_ne!(first, "secret-token");
        assert_eq!(first.len(), 64);
    }
}

//! Identity records and the store that owns them.
//!
//! Identities are created and deleted by user management, which is outside
//! this core. The only fields this subsystem mutates are the lockout fields,
//! through [`IdentityStore::update_lockout_state`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Identity as read from the user store. `password_hash` is a PHC digest.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub active: bool,
    pub failed_attempt_count: u32,
    pub locked: bool,
    pub locked_until: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up an identity by normalized email.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>>;

    /// Look up an identity by id (used when honoring refresh tokens).
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Identity>>;

    /// Persist the lockout fields. Used for the lock transition and for
    /// clearing the lock after a successful login.
    async fn update_lockout_state(
        &self,
        id: Uuid,
        locked: bool,
        locked_until: Option<DateTime<Utc>>,
        failed_count: u32,
    ) -> anyhow::Result<()>;

    /// Persist only the failure count, leaving `locked`/`locked_until`
    /// untouched. A count write that lands after a concurrent lock write
    /// must not unlock the record.
    async fn record_failure_count(&self, id: Uuid, failed_count: u32) -> anyhow::Result<()>;
}

/// In-process identity store for tests and single-node deployments.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    identities: RwLock<HashMap<Uuid, Identity>>,
}

impl MemoryIdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, identity: Identity) {
        let mut identities = self.identities.write().await;
        identities.insert(identity.id, identity);
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>> {
        let identities = self.identities.read().await;
        Ok(identities
            .values()
            .find(|identity| identity.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Identity>> {
        let identities = self.identities.read().await;
        Ok(identities.get(&id).cloned())
    }

    async fn update_lockout_state(
        &self,
        id: Uuid,
        locked: bool,
        locked_until: Option<DateTime<Utc>>,
        failed_count: u32,
    ) -> anyhow::Result<()> {
        let mut identities = self.identities.write().await;
        if let Some(identity) = identities.get_mut(&id) {
            identity.locked = locked;
            identity.locked_until = locked_until;
            identity.failed_attempt_count = failed_count;
        }
        Ok(())
    }

    async fn record_failure_count(&self, id: Uuid, failed_count: u32) -> anyhow::Result<()> {
        let mut identities = self.identities.write().await;
        if let Some(identity) = identities.get_mut(&id) {
            identity.failed_attempt_count = failed_count;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(email: &str) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: "tenant".to_string(),
            permissions: vec![],
            active: true,
            failed_attempt_count: 0,
            locked: false,
            locked_until: None,
        }
    }

    #[tokio::test]
    async fn lookup_by_email_and_id() {
        let store = MemoryIdentityStore::new();
        let record = identity("a@x.com");
        let id = record.id;
        store.insert(record).await;

        let by_email = store.find_by_email("a@x.com").await.unwrap();
        assert_eq!(by_email.map(|i| i.id), Some(id));

        let by_id = store.find_by_id(id).await.unwrap();
        assert_eq!(by_id.map(|i| i.email), Some("a@x.com".to_string()));

        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lockout_state_round_trips() {
        let store = MemoryIdentityStore::new();
        let record = identity("a@x.com");
        let id = record.id;
        store.insert(record).await;

        let until = Utc::now();
        store
            .update_lockout_state(id, true, Some(until), 5)
            .await
            .unwrap();

        let loaded = store.find_by_id(id).await.unwrap().unwrap();
        assert!(loaded.locked);
        assert_eq!(loaded.locked_until, Some(until));
        assert_eq!(loaded.failed_attempt_count, 5);
    }

    #[tokio::test]
    async fn failure_count_write_leaves_lock_fields_alone() {
        let store = MemoryIdentityStore::new();
        let record = identity("a@x.com");
        let id = record.id;
        store.insert(record).await;

        let until = Utc::now();
        store
            .update_lockout_state(id, true, Some(until), 5)
            .await
            .unwrap();
        store.record_failure_count(id, 4).await.unwrap();

        let loaded = store.find_by_id(id).await.unwrap().unwrap();
        assert!(loaded.locked);
        assert_eq!(loaded.locked_until, Some(until));
        assert_eq!(loaded.failed_attempt_count, 4);
    }
}

//! Postgres-backed identity store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{Instrument, info_span};
use uuid::Uuid;

use super::identity::{Identity, IdentityStore};

const FIND_BY_EMAIL: &str = "SELECT id, email, password_hash, role, permissions, active, \
     failed_attempt_count, locked, locked_until FROM identities WHERE email = $1";

const FIND_BY_ID: &str = "SELECT id, email, password_hash, role, permissions, active, \
     failed_attempt_count, locked, locked_until FROM identities WHERE id = $1";

const UPDATE_LOCKOUT: &str = "UPDATE identities SET locked = $2, locked_until = $3, \
     failed_attempt_count = $4 WHERE id = $1";

const RECORD_FAILURE_COUNT: &str =
    "UPDATE identities SET failed_attempt_count = $2 WHERE id = $1";

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    permissions: Vec<String>,
    active: bool,
    failed_attempt_count: i32,
    locked: bool,
    locked_until: Option<DateTime<Utc>>,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role,
            permissions: row.permissions,
            active: row.active,
            failed_attempt_count: row.failed_attempt_count.max(0) as u32,
            locked: row.locked,
            locked_until: row.locked_until,
        }
    }
}

pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(FIND_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(info_span!("db.query", table = "identities", by = "email"))
            .await
            .context("failed to query identity by email")?;
        Ok(row.map(Identity::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(FIND_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(info_span!("db.query", table = "identities", by = "id"))
            .await
            .context("failed to query identity by id")?;
        Ok(row.map(Identity::from))
    }

    async fn update_lockout_state(
        &self,
        id: Uuid,
        locked: bool,
        locked_until: Option<DateTime<Utc>>,
        failed_count: u32,
    ) -> Result<()> {
        sqlx::query(UPDATE_LOCKOUT)
            .bind(id)
            .bind(locked)
            .bind(locked_until)
            .bind(i32::try_from(failed_count).unwrap_or(i32::MAX))
            .execute(&self.pool)
            .instrument(info_span!("db.query", table = "identities", op = "update_lockout"))
            .await
            .context("failed to update lockout state")?;
        Ok(())
    }

    async fn record_failure_count(&self, id: Uuid, failed_count: u32) -> Result<()> {
        sqlx::query(RECORD_FAILURE_COUNT)
            .bind(id)
            .bind(i32::try_from(failed_count).unwrap_or(i32::MAX))
            .execute(&self.pool)
            .instrument(info_span!("db.query", table = "identities", op = "record_failures"))
            .await
            .context("failed to record failure count")?;
        Ok(())
    }
}

use crate::api;
use crate::auth::{
    AuthConfig, AuthService, InMemoryRevocationStore, LoginAttemptTracker, PasswordHasher,
    PgIdentityStore, SystemClock, TokenCodec, TracingAuditSink, spawn_pruner, spawn_sweeper,
};
use crate::cli::actions::Action;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            token_secret,
            insecure_cookies,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&dsn)
                .await
                .context("failed to connect to the database")?;

            let config = AuthConfig::new().with_cookie_secure(!insecure_cookies);
            let clock = Arc::new(SystemClock);

            let codec = TokenCodec::new(
                &token_secret,
                config.access_ttl(),
                config.refresh_ttl(),
                config.refresh_ttl_extended(),
                clock.clone(),
            )?;

            let identities = Arc::new(PgIdentityStore::new(pool));
            let revocations = Arc::new(InMemoryRevocationStore::new());
            let attempts = Arc::new(LoginAttemptTracker::new(
                config.attempt_policy(),
                identities.clone(),
                clock.clone(),
            ));

            // Drop expired fingerprints and stale attempt windows in the
            // background so neither store grows without bound.
            spawn_sweeper(revocations.clone(), clock.clone(), config.sweep_interval());
            spawn_pruner(attempts.clone(), config.sweep_interval());

            let sweep_interval = config.sweep_interval();
            let service = Arc::new(AuthService::new(
                config,
                PasswordHasher::new(),
                codec,
                identities,
                revocations,
                attempts,
                Arc::new(TracingAuditSink),
                clock,
            ));

            info!(port, ?sweep_interval, "Starting authentication service");
            api::serve(port, service).await?;
        }
    }

    Ok(())
}

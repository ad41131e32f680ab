//! The authentication orchestrator.
//!
//! Composes the password hasher, token codec, revocation store, and attempt
//! tracker into the three operations the platform exposes: `login`,
//! `refresh`, and `logout`. Every expected failure is a typed [`AuthError`];
//! the HTTP boundary maps kinds to status codes and never sees a panic or an
//! ad-hoc error for a wrong password.
//!
//! A login walks `lock check -> credential check -> outcome`. The lock check
//! runs first so a blocked account never pays for (or leaks timing from) a
//! password verification. Unknown emails take the same failure path as a
//! wrong password.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::attempts::{FailureOutcome, LoginAttemptTracker};
use super::audit::{AuditEvent, AuditKind, AuditSink};
use super::clock::Clock;
use super::error::AuthError;
use super::identity::{Identity, IdentityStore};
use super::password::{PasswordHasher, STAND_IN_DIGEST};
use super::revocation::RevocationStore;
use super::state::AuthConfig;
use super::token::{TokenCodec, TokenKind};
use super::types::{ClientInfo, IdentitySummary};

/// Successful login outcome. The refresh token is separate from the response
/// body type because the boundary delivers it as a cookie.
#[derive(Debug)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub identity: IdentitySummary,
}

/// Successful refresh outcome; the refresh token itself is not rotated.
#[derive(Debug)]
pub struct RefreshedAccess {
    pub access_token: String,
    pub expires_in: i64,
}

pub struct AuthService {
    config: AuthConfig,
    hasher: PasswordHasher,
    codec: TokenCodec,
    identities: Arc<dyn IdentityStore>,
    revocations: Arc<dyn RevocationStore>,
    attempts: Arc<LoginAttemptTracker>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    /// All collaborators are constructed once at process start and threaded
    /// in here; nothing is reached through ambient state.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: AuthConfig,
        hasher: PasswordHasher,
        codec: TokenCodec,
        identities: Arc<dyn IdentityStore>,
        revocations: Arc<dyn RevocationStore>,
        attempts: Arc<LoginAttemptTracker>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            hasher,
            codec,
            identities,
            revocations,
            attempts,
            audit,
            clock,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Current instant from the injected clock, for boundary code that
    /// reports durations (retry-after and the like).
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Verify credentials and issue an access + refresh token pair.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown email or wrong password,
    /// `AccountLocked` while a lockout is active, `UpstreamUnavailable` if
    /// the identity store fails or times out.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        extended_session: bool,
        client: &ClientInfo,
    ) -> Result<TokenBundle, AuthError> {
        let email = normalize_email(email);
        let identity = self
            .bounded(self.identities.find_by_email(&email))
            .await?;

        let Some(identity) = identity else {
            // Unknown email: burn the same hashing cost as a real check so
            // neither the outcome nor the response timing reveals whether
            // the account exists.
            let _ = self
                .hasher
                .verify(password.to_string(), STAND_IN_DIGEST.to_string())
                .await;
            self.emit(None, AuditKind::LoginFailed, client);
            return Err(AuthError::InvalidCredentials);
        };

        if let Some(locked_until) = self.attempts.is_blocked(&identity) {
            // No password verification for blocked accounts: no wasted
            // hashing cost, no timing difference to observe.
            self.emit(Some(identity.id), AuditKind::AccountLocked, client);
            return Err(AuthError::AccountLocked { locked_until });
        }

        let verified = self
            .hasher
            .verify(password.to_string(), identity.password_hash.clone())
            .await;
        if !verified {
            let outcome = self.attempts.record_failure(&identity).await;
            let kind = match outcome {
                FailureOutcome::Locked { locked_until } => {
                    warn!(identity_id = %identity.id, %locked_until, "Account locked after repeated failures");
                    AuditKind::AccountLocked
                }
                FailureOutcome::Accumulating { .. } => AuditKind::LoginFailed,
            };
            self.emit(Some(identity.id), kind, client);
            // The attempt itself still failed on credentials; the lock
            // answers from the next attempt onward.
            return Err(AuthError::InvalidCredentials);
        }

        self.attempts.record_success(&identity).await;

        let access_token = self.codec.issue_access(&identity)?;
        let refresh_token = self.codec.issue_refresh(&identity, extended_session)?;

        info!(identity_id = %identity.id, "Login succeeded");
        self.emit(Some(identity.id), AuditKind::LoginSuccess, client);

        Ok(TokenBundle {
            access_token,
            refresh_token,
            expires_in: self.codec.access_ttl_seconds(),
            identity: IdentitySummary {
                id: identity.id.to_string(),
                email: identity.email,
                role: identity.role,
            },
        })
    }

    /// Exchange a valid, unrevoked refresh token for a new access token.
    ///
    /// # Errors
    /// `TokenExpired`/`TokenInvalid` from validation, `TokenRevoked` if the
    /// fingerprint is blacklisted or the identity is gone or deactivated,
    /// `UpstreamUnavailable` if the identity store fails or times out.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedAccess, AuthError> {
        let claims = self.codec.validate(refresh_token, TokenKind::Refresh)?;

        if self.revocations.is_revoked(refresh_token) {
            return Err(AuthError::TokenRevoked);
        }

        let subject = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::TokenInvalid)?;
        let identity = self.bounded(self.identities.find_by_id(subject)).await?;

        // Fail closed: a token whose identity vanished or was deactivated is
        // treated as revoked.
        let Some(identity) = identity.filter(|identity| identity.active) else {
            return Err(AuthError::TokenRevoked);
        };

        let access_token = self.codec.issue_access(&identity)?;
        Ok(RefreshedAccess {
            access_token,
            expires_in: self.codec.access_ttl_seconds(),
        })
    }

    /// Revoke the presented tokens until their own expiry. Idempotent:
    /// already-revoked, expired, or malformed tokens are skipped silently.
    pub fn logout(&self, access_token: Option<&str>, refresh_token: Option<&str>) {
        for (token, kind) in [
            (access_token, TokenKind::Access),
            (refresh_token, TokenKind::Refresh),
        ] {
            let Some(token) = token.filter(|token| !token.is_empty()) else {
                continue;
            };
            // Expired or invalid tokens have nothing left to revoke.
            if let Ok(claims) = self.codec.validate(token, kind) {
                if let Some(expires_at) = DateTime::from_timestamp(claims.exp, 0) {
                    self.revocations.revoke(token, expires_at);
                }
            }
        }
    }

    /// Run an identity-store lookup under the configured deadline.
    async fn bounded<T>(
        &self,
        lookup: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.config.identity_timeout(), lookup).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                error!("Identity store lookup failed: {err}");
                Err(AuthError::UpstreamUnavailable {
                    reason: "identity store lookup failed".to_string(),
                })
            }
            Err(_) => Err(AuthError::UpstreamUnavailable {
                reason: "identity store lookup timed out".to_string(),
            }),
        }
    }

    fn emit(&self, identity_id: Option<Uuid>, kind: AuditKind, client: &ClientInfo) {
        self.audit.record(AuditEvent {
            identity_id,
            kind,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            timestamp: self.clock.now(),
        });
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

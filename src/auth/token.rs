//! Signed session tokens (HS256).
//!
//! The wire claim set is fixed for interoperability with existing clients:
//! `{sub, email, role, permissions, iat, exp}`. Token kind (access vs
//! refresh) is not a claim; each kind is signed with its own key derived
//! from the process secret, so a refresh token can never pass as an access
//! token. Expiry is checked against the injected [`Clock`], which keeps
//! `validate` deterministic for a given instant.

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::error;

use super::clock::Clock;
use super::error::AuthError;
use super::identity::Identity;

/// Minimum secret length in bytes (256-bit key).
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Key-derivation context label; changing these invalidates every
    /// outstanding token of that kind.
    const fn context(self) -> &'static [u8] {
        match self {
            Self::Access => b"portiere.access",
            Self::Refresh => b"portiere.refresh",
        }
    }
}

/// Decoded token claims, exactly as serialized on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

struct KindKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

pub struct TokenCodec {
    access: KindKeys,
    refresh: KindKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
    refresh_ttl_extended: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Build a codec from the process-wide signing secret.
    ///
    /// # Errors
    /// Returns an error if the secret is shorter than [`MIN_SECRET_BYTES`];
    /// the process must refuse to start with a weak key.
    pub fn new(
        secret: &SecretString,
        access_ttl: Duration,
        refresh_ttl: Duration,
        refresh_ttl_extended: Duration,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let secret = secret.expose_secret();
        if secret.len() < MIN_SECRET_BYTES {
            anyhow::bail!(
                "token secret must be at least {MIN_SECRET_BYTES} bytes, got {}",
                secret.len()
            );
        }
        Ok(Self {
            access: derive_keys(secret.as_bytes(), TokenKind::Access),
            refresh: derive_keys(secret.as_bytes(), TokenKind::Refresh),
            access_ttl,
            refresh_ttl,
            refresh_ttl_extended,
            clock,
        })
    }

    /// Access-token lifetime in seconds, reported to clients as `expiresIn`.
    #[must_use]
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Sign a short-lived access token for `identity`.
    ///
    /// # Errors
    /// Returns `TokenInvalid` if signing fails.
    pub fn issue_access(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue(identity, TokenKind::Access, self.access_ttl)
    }

    /// Sign a refresh token; `extended` selects the long-session lifetime.
    ///
    /// # Errors
    /// Returns `TokenInvalid` if signing fails.
    pub fn issue_refresh(&self, identity: &Identity, extended: bool) -> Result<String, AuthError> {
        let ttl = if extended {
            self.refresh_ttl_extended
        } else {
            self.refresh_ttl
        };
        self.issue(identity, TokenKind::Refresh, ttl)
    }

    /// Verify signature and expiry, returning the decoded claims.
    ///
    /// # Errors
    /// `TokenInvalid` for malformed input, a signature mismatch, or a token
    /// of the wrong kind; `TokenExpired` for a well-signed token past `exp`.
    pub fn validate(&self, token: &str, kind: TokenKind) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &self.keys(kind).decoding, &validation)
            .map_err(|_| AuthError::TokenInvalid)?;

        if self.clock.now().timestamp() > data.claims.exp {
            return Err(AuthError::TokenExpired);
        }
        Ok(data.claims)
    }

    fn issue(
        &self,
        identity: &Identity,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            role: identity.role.clone(),
            permissions: identity.permissions.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.keys(kind).encoding).map_err(|err| {
            error!("Failed to sign {kind:?} token: {err}");
            AuthError::TokenInvalid
        })
    }

    const fn keys(&self, kind: TokenKind) -> &KindKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

fn derive_keys(secret: &[u8], kind: TokenKind) -> KindKeys {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    hasher.update(kind.context());
    let key = hasher.finalize();
    KindKeys {
        encoding: EncodingKey::from_secret(&key),
        decoding: DecodingKey::from_secret(&key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use chrono::Utc;
    use uuid::Uuid;

    fn test_identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: String::new(),
            role: "manager".to_string(),
            permissions: vec!["vendors:read".to_string(), "invoices:write".to_string()],
            active: true,
            failed_attempt_count: 0,
            locked: false,
            locked_until: None,
        }
    }

    fn codec_with_clock(clock: Arc<ManualClock>) -> TokenCodec {
        TokenCodec::new(
            &SecretString::from("0123456789abcdef0123456789abcdef"),
            Duration::hours(1),
            Duration::days(7),
            Duration::days(30),
            clock,
        )
        .expect("valid secret")
    }

    #[test]
    fn rejects_short_secret() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let result = TokenCodec::new(
            &SecretString::from("too-short"),
            Duration::hours(1),
            Duration::days(7),
            Duration::days(30),
            clock,
        );
        assert!(result.is_err());
    }

    #[test]
    fn access_round_trip_preserves_claims() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let codec = codec_with_clock(clock.clone());
        let identity = test_identity();

        let token = codec.issue_access(&identity).unwrap();
        let claims = codec.validate(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.sub, identity.id.to_string());
        assert_eq!(claims.email, identity.email);
        assert_eq!(claims.role, identity.role);
        assert_eq!(claims.permissions, identity.permissions);
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn expired_token_is_expired_not_invalid() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let codec = codec_with_clock(clock.clone());
        let token = codec.issue_access(&test_identity()).unwrap();

        clock.advance(Duration::hours(2));
        assert_eq!(
            codec.validate(&token, TokenKind::Access),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn garbage_is_invalid() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let codec = codec_with_clock(clock);
        assert_eq!(
            codec.validate("not.a.token", TokenKind::Access),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn kinds_do_not_cross_validate() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let codec = codec_with_clock(clock);
        let identity = test_identity();

        let refresh = codec.issue_refresh(&identity, false).unwrap();
        assert_eq!(
            codec.validate(&refresh, TokenKind::Access),
            Err(AuthError::TokenInvalid)
        );
        assert!(codec.validate(&refresh, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn extended_session_lengthens_refresh_expiry() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let codec = codec_with_clock(clock);
        let identity = test_identity();

        let short = codec.issue_refresh(&identity, false).unwrap();
        let long = codec.issue_refresh(&identity, true).unwrap();
        let short_claims = codec.validate(&short, TokenKind::Refresh).unwrap();
        let long_claims = codec.validate(&long, TokenKind::Refresh).unwrap();

        assert_eq!(short_claims.exp - short_claims.iat, 7 * 24 * 3600);
        assert_eq!(long_claims.exp - long_claims.iat, 30 * 24 * 3600);
    }

    #[test]
    fn wire_claim_keys_match_contract() {
        // jsonwebtoken serializes claims with serde, so the JSON keys here
        // are exactly the keys that land in the token payload.
        let claims = Claims {
            sub: "id".to_string(),
            email: "a@x.com".to_string(),
            role: "manager".to_string(),
            permissions: vec![],
            iat: 0,
            exp: 0,
        };
        let value = serde_json::to_value(&claims).unwrap();
        let object = value.as_object().expect("json object");
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["email", "exp", "iat", "permissions", "role", "sub"]);
    }
}

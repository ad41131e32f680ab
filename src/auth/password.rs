//! Credential hashing with Argon2id.
//!
//! Digests are salted PHC strings; hashing the same password twice never
//! yields the same digest. Work is offloaded with `spawn_blocking` so
//! concurrent logins cannot starve the runtime.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash as PhcHash, PasswordHasher as PhcHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::error;

/// Well-formed digest that matches no password. Verifying against it costs
/// the same Argon2 work as a real check, so the no-such-identity path has
/// the same timing profile as a wrong password. Must stay parseable: a
/// malformed digest would short-circuit verification.
pub const STAND_IN_DIGEST: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// OWASP minimum memory cost: 19 MiB.
    const MEMORY_COST: u32 = 19_456;
    const TIME_COST: u32 = 2;
    const PARALLELISM: u32 = 1;
    const OUTPUT_LEN: usize = 32;

    /// Hasher with production parameters.
    ///
    /// # Panics
    /// Panics only if the compiled-in constants are rejected by `argon2`,
    /// which would be a programming error.
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(
            Self::MEMORY_COST,
            Self::TIME_COST,
            Self::PARALLELISM,
            Some(Self::OUTPUT_LEN),
        )
        .expect("Invalid Argon2 parameters");
        Self { params }
    }

    /// Hasher with custom parameters, for tests or constrained environments.
    ///
    /// # Errors
    /// Returns an error if `argon2` rejects the parameter combination.
    pub fn with_params(memory_cost: u32, time_cost: u32, parallelism: u32) -> anyhow::Result<Self> {
        let params = Params::new(memory_cost, time_cost, parallelism, Some(Self::OUTPUT_LEN))
            .map_err(|err| anyhow::anyhow!("invalid Argon2 parameters: {err}"))?;
        Ok(Self { params })
    }

    /// Hash a password into a salted PHC-format digest.
    ///
    /// # Errors
    /// Returns an error if hashing fails or the blocking task panics.
    pub async fn hash(&self, password: String) -> anyhow::Result<String> {
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|digest| digest.to_string())
                .map_err(|err| anyhow::anyhow!("failed to hash password: {err}"))
        })
        .await
        .map_err(|err| anyhow::anyhow!("password hash task panicked: {err}"))?
    }

    /// Verify a password against a stored digest.
    ///
    /// A malformed or corrupted digest verifies as `false`; it never becomes
    /// an error the caller could branch on differently from a wrong password.
    pub async fn verify(&self, password: String, digest: String) -> bool {
        let result = tokio::task::spawn_blocking(move || {
            let Ok(parsed) = PhcHash::new(&digest) else {
                error!("Stored password digest is malformed");
                return false;
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .await;

        match result {
            Ok(matched) => matched,
            Err(err) => {
                error!("Password verify task panicked: {err}");
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1).expect("valid test parameters")
    }

    #[tokio::test]
    async fn verify_accepts_matching_password() {
        let hasher = fast_hasher();
        let digest = hasher.hash("Correct#1".to_string()).await.unwrap();
        assert!(hasher.verify("Correct#1".to_string(), digest).await);
    }

    #[tokio::test]
    async fn verify_rejects_wrong_password() {
        let hasher = fast_hasher();
        let digest = hasher.hash("Correct#1".to_string()).await.unwrap();
        assert!(!hasher.verify("Wrong#1".to_string(), digest).await);
    }

    #[tokio::test]
    async fn digests_are_salted() {
        let hasher = fast_hasher();
        let first = hasher.hash("same".to_string()).await.unwrap();
        let second = hasher.hash("same".to_string()).await.unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn stand_in_digest_parses_and_matches_nothing() {
        // Parseable, so verification runs the full Argon2 computation
        // instead of the malformed-digest early return.
        assert!(PhcHash::new(STAND_IN_DIGEST).is_ok());

        let hasher = fast_hasher();
        assert!(
            !hasher
                .verify("anything".to_string(), STAND_IN_DIGEST.to_string())
                .await
        );
    }

    #[tokio::test]
    async fn malformed_digest_verifies_false() {
        let hasher = fast_hasher();
        assert!(
            !hasher
                .verify("anything".to_string(), "not-a-digest".to_string())
                .await
        );
    }
}

//! Typed authentication outcomes.
//!
//! Expected failures (wrong password, expired token, lockout) are values, not
//! panics or catch-all errors, so the HTTP boundary can map each kind to a
//! status code and clients can react per kind: an expired access token means
//! "try refresh", an invalid one means "force re-login".

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Wrong email/password combination. Unknown emails answer with the same
    /// kind so callers cannot probe which accounts exist.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Lockout window is active; `locked_until` lets clients display
    /// "try again in N minutes".
    #[error("Account locked until {locked_until}")]
    AccountLocked { locked_until: DateTime<Utc> },

    /// Signature is valid but the token is past its expiry.
    #[error("Token has expired")]
    TokenExpired,

    /// Malformed token or signature mismatch.
    #[error("Token is invalid")]
    TokenInvalid,

    /// Fingerprint present in the revocation store, or the identity behind
    /// the token no longer exists or is deactivated.
    #[error("Token has been revoked")]
    TokenRevoked,

    /// The identity store failed or timed out. Kept distinct from
    /// `InvalidCredentials` so callers may retry instead of treating an
    /// outage as a security rejection.
    #[error("Identity store unavailable: {reason}")]
    UpstreamUnavailable { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_does_not_leak_account_existence() {
        // Unknown email and wrong password must render identically.
        let wrong_password = AuthError::InvalidCredentials.to_string();
        let unknown_email = AuthError::InvalidCredentials.to_string();
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password, "Invalid email or password");
    }

    #[test]
    fn locked_error_carries_deadline() {
        let until = Utc::now();
        let err = AuthError::AccountLocked {
            locked_until: until,
        };
        assert!(err.to_string().starts_with("Account locked until"));
    }
}

pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::login;

pub mod refresh;
pub use self::refresh::refresh;

pub mod logout;
pub use self::logout::logout;

// common functions for the handlers
use axum::{
    Json,
    http::{HeaderMap, StatusCode, header::COOKIE},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::auth::{AuthError, ClientInfo};
use crate::auth::types::ErrorResponse;

/// Name of the refresh-token session cookie.
pub const REFRESH_COOKIE: &str = "portiere_refresh";

/// Minimal structural email check; the identity store is the authority on
/// whether the address exists.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !email.contains(char::is_whitespace)
}

/// Build the `Set-Cookie` value delivering the refresh token. `SameSite=Strict`
/// and `HttpOnly` keep it out of cross-site requests and page scripts.
#[must_use]
pub fn refresh_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{REFRESH_COOKIE}={token}; Path=/v1/auth; Max-Age={max_age_seconds}; HttpOnly; SameSite=Strict"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that expires the refresh cookie.
#[must_use]
pub fn clear_refresh_cookie(secure: bool) -> String {
    refresh_cookie("", 0, secure)
}

/// Extract the refresh token from the `Cookie` header, if present.
#[must_use]
pub fn read_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == REFRESH_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

/// Client attributes for the audit trail. The first address in
/// `x-forwarded-for` wins, then `x-real-ip`.
#[must_use]
pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string)
        });

    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);

    ClientInfo {
        ip_address,
        user_agent,
    }
}

/// Map a typed failure to its HTTP response. `now` comes from the service
/// clock so retry-after math agrees with the lockout decision.
pub fn error_response(err: &AuthError, now: DateTime<Utc>) -> Response {
    let (status, error, locked_until) = match err {
        AuthError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "invalid_credentials", None)
        }
        AuthError::AccountLocked { locked_until } => {
            (StatusCode::LOCKED, "account_locked", Some(*locked_until))
        }
        AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "token_expired", None),
        AuthError::TokenInvalid => (StatusCode::UNAUTHORIZED, "token_invalid", None),
        AuthError::TokenRevoked => (StatusCode::UNAUTHORIZED, "token_revoked", None),
        AuthError::UpstreamUnavailable { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, "upstream_unavailable", None)
        }
    };

    let retry_after_seconds = locked_until.map(|until| (until - now).num_seconds().max(0));

    let body = ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        locked_until,
        retry_after_seconds,
    };

    (status, Json(body)).into_response()
}

//! Request/response types for the auth operations (camelCase wire contract).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub extended_session: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySummary {
    pub id: String,
    pub email: String,
    pub role: String,
}

/// Body returned on login. The refresh token travels only in the session
/// cookie, never in a body field, so page scripts cannot exfiltrate it.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub identity: IdentitySummary,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Optional when the refresh cookie is present.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Error body the boundary serves for typed auth failures.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<i64>,
}

/// Client attributes attached to audit events.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_accepts_optional_extended_session() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"pw"}"#).unwrap();
        assert!(!request.extended_session);

        let request: LoginRequest = serde_json::from_str(
            r#"{"email":"a@x.com","password":"pw","extendedSession":true}"#,
        )
        .unwrap();
        assert!(request.extended_session);
    }

    #[test]
    fn login_response_uses_camel_case_keys() {
        let response = LoginResponse {
            access_token: "jwt".to_string(),
            expires_in: 3600,
            identity: IdentitySummary {
                id: "id".to_string(),
                email: "a@x.com".to_string(),
                role: "manager".to_string(),
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["accessToken"], "jwt");
        assert_eq!(value["expiresIn"], 3600);
        assert_eq!(value["identity"]["email"], "a@x.com");
        // No refresh token field exists in the body.
        assert!(value.get("refreshToken").is_none());
    }

    #[test]
    fn error_response_omits_empty_lockout_fields() {
        let body = ErrorResponse {
            error: "invalid_credentials".to_string(),
            message: "Invalid email or password".to_string(),
            locked_until: None,
            retry_after_seconds: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("lockedUntil").is_none());
        assert!(value.get("retryAfterSeconds").is_none());
    }
}

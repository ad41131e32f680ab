use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::instrument;

use super::{error_response, read_refresh_cookie};
use crate::auth::AuthService;
use crate::auth::types::{RefreshRequest, RefreshResponse};

#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token issued", body = RefreshResponse, content_type = "application/json"),
        (status = 400, description = "No refresh token presented"),
        (status = 401, description = "Refresh token expired, invalid, or revoked"),
        (status = 503, description = "Identity store unavailable"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn refresh(
    service: Extension<Arc<AuthService>>,
    headers: HeaderMap,
    payload: Option<Json<RefreshRequest>>,
) -> Response {
    // The session cookie is authoritative; the body field exists for
    // non-browser clients.
    let token = read_refresh_cookie(&headers).or_else(|| {
        payload
            .and_then(|Json(request)| request.refresh_token)
            .filter(|token| !token.is_empty())
    });

    let Some(token) = token else {
        return (StatusCode::BAD_REQUEST, "Missing refresh token".to_string()).into_response();
    };

    match service.refresh(&token).await {
        Ok(refreshed) => Json(RefreshResponse {
            access_token: refreshed.access_token,
            expires_in: refreshed.expires_in,
        })
        .into_response(),
        Err(err) => error_response(&err, service.now()),
    }
}

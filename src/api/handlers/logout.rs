use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::instrument;

use super::{clear_refresh_cookie, read_refresh_cookie};
use crate::auth::AuthService;
use crate::auth::types::LogoutRequest;

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 204, description = "Presented tokens revoked; always succeeds"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(
    service: Extension<Arc<AuthService>>,
    headers: HeaderMap,
    payload: Option<Json<LogoutRequest>>,
) -> Response {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let refresh_token = read_refresh_cookie(&headers).or(request.refresh_token);

    service.logout(request.access_token.as_deref(), refresh_token.as_deref());

    let cookie = clear_refresh_cookie(service.config().cookie_secure());
    (StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response()
}

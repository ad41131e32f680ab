use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::instrument;

use super::{client_info, error_response, refresh_cookie, valid_email};
use crate::auth::AuthService;
use crate::auth::types::{LoginRequest, LoginResponse};

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted, tokens issued", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Malformed payload"),
        (status = 401, description = "Invalid email or password"),
        (status = 423, description = "Account locked"),
        (status = 503, description = "Identity store unavailable"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    service: Extension<Arc<AuthService>>,
    headers: HeaderMap,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    if !valid_email(&request.email) || request.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Malformed credentials".to_string()).into_response();
    }

    let client = client_info(&headers);
    match service
        .login(
            &request.email,
            &request.password,
            request.extended_session,
            &client,
        )
        .await
    {
        Ok(bundle) => {
            let config = service.config();
            let max_age = if request.extended_session {
                config.refresh_ttl_extended_seconds()
            } else {
                config.refresh_ttl().num_seconds()
            };
            let cookie = refresh_cookie(&bundle.refresh_token, max_age, config.cookie_secure());

            let body = LoginResponse {
                access_token: bundle.access_token,
                expires_in: bundle.expires_in,
                identity: bundle.identity,
            };
            ([(SET_COOKIE, cookie)], Json(body)).into_response()
        }
        Err(err) => error_response(&err, service.now()),
    }
}

//! Machine-readable API description.

use axum::{Json, response::IntoResponse};
use utoipa::OpenApi;

use super::handlers;
use crate::auth::types::{
    ErrorResponse, IdentitySummary, LoginRequest, LoginResponse, LogoutRequest, RefreshRequest,
    RefreshResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(handlers::login::login, handlers::refresh::refresh, handlers::logout::logout),
    components(schemas(
        LoginRequest,
        LoginResponse,
        IdentitySummary,
        RefreshRequest,
        RefreshResponse,
        LogoutRequest,
        ErrorResponse,
    )),
    tags((name = "auth", description = "Session issuance and revocation"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_auth_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/v1/auth/login", "/v1/auth/refresh", "/v1/auth/logout"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}

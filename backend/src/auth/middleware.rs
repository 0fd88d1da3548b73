//! Middleware for protecting authenticated routes.
//!
//! `jwt_auth` runs the access-control gate and attaches the resulting
//! `AuthContext` to the request extensions, where handlers extract it with
//! `Extension<AuthContext>`.

use crate::api::common::service_error_to_http;
use crate::auth::AuthState;
use crate::auth::service::AuthService;
use axum::{
    extract::{Extension, Request},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sqlx::SqlitePool;

/// JWT authentication middleware
pub async fn jwt_auth(
    Extension(pool): Extension<SqlitePool>,
    Extension(auth): Extension<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    // A header that is not valid visible ASCII counts as missing.
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let context = match AuthService::new(&pool, &auth)
        .authenticate(auth_header)
        .await
    {
        Ok(context) => context,
        Err(error) => {
            tracing::warn!("Rejected request to {}: {}", request.uri().path(), error);
            return Err(service_error_to_http(error));
        }
    };

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

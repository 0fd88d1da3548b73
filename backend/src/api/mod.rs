//! Central module for organizing the application's API endpoints.
//!
//! `build_router` assembles every domain router under `/api/v1` and installs
//! the shared dependencies as `Extension` layers.

pub mod common;
pub mod payment;
pub mod playlist;
pub mod song;

use crate::api::common::ApiResponse;
use crate::api::payment::handlers::SharedGateway;
use crate::auth::AuthState;
use crate::services::email_service::Mailer;
use axum::{Extension, Router, response::Json, routing::get};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Builds the complete application router.
pub fn build_router(
    pool: SqlitePool,
    auth: AuthState,
    mailer: Arc<dyn Mailer>,
    gateway: SharedGateway,
) -> Router {
    let api = Router::new()
        .nest("/auth", crate::auth::routes::auth_router())
        .nest("/playlists", playlist::routes::playlist_router())
        .nest("/payments", payment::routes::payment_router())
        .merge(song::routes::song_router());

    Router::new()
        .route("/", get(root_handler))
        .nest("/api/v1", api)
        .layer(Extension(gateway))
        .layer(Extension(mailer))
        .layer(Extension(auth))
        .layer(Extension(pool))
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "El Music Backend",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to El Music API",
    ))
}

//! Handler functions for playlist API endpoints.
//!
//! Each handler receives the caller's `AuthContext` from the JWT gate and
//! passes it to `PlaylistService`, which enforces ownership.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::AuthState;
use crate::auth::models::AuthContext;
use crate::database::models::{
    AddSongRequest, CreatePlaylistRequest, Playlist, PlaylistWithSongs,
};
use crate::services::playlist_service::PlaylistService;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

#[axum::debug_handler]
pub async fn list_playlists(
    Extension(pool): Extension<SqlitePool>,
    Extension(context): Extension<AuthContext>,
) -> Result<ResponseJson<ApiResponse<Vec<Playlist>>>, (StatusCode, String)> {
    match PlaylistService::new(&pool).list_playlists(&context).await {
        Ok(playlists) => Ok(ResponseJson(ApiResponse::ok(playlists))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn create_playlist(
    Extension(pool): Extension<SqlitePool>,
    Extension(auth): Extension<AuthState>,
    Extension(context): Extension<AuthContext>,
    Json(payload): Json<CreatePlaylistRequest>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Playlist>>), (StatusCode, String)> {
    match PlaylistService::new(&pool)
        .create_playlist(&context, payload, auth.clock.now())
        .await
    {
        Ok(playlist) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(playlist, "Playlist created successfully")),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn get_playlist(
    Extension(pool): Extension<SqlitePool>,
    Extension(context): Extension<AuthContext>,
    Path(playlist_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<PlaylistWithSongs>>, (StatusCode, String)> {
    match PlaylistService::new(&pool)
        .get_playlist(&context, &playlist_id)
        .await
    {
        Ok(playlist) => Ok(ResponseJson(ApiResponse::ok(playlist))),
        Err(error) => {
            tracing::warn!(
                "User {} could not read playlist {}: {}",
                context.user_id,
                playlist_id,
                error
            );
            Err(service_error_to_http(error))
        }
    }
}

#[axum::debug_handler]
pub async fn add_song(
    Extension(pool): Extension<SqlitePool>,
    Extension(auth): Extension<AuthState>,
    Extension(context): Extension<AuthContext>,
    Path(playlist_id): Path<String>,
    Json(payload): Json<AddSongRequest>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<()>>), (StatusCode, String)> {
    match PlaylistService::new(&pool)
        .add_song(&context, &playlist_id, payload, auth.clock.now())
        .await
    {
        Ok(()) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::<()>::message("Song added to playlist")),
        )),
        Err(error) => {
            tracing::warn!(
                "User {} could not add to playlist {}: {}",
                context.user_id,
                playlist_id,
                error
            );
            Err(service_error_to_http(error))
        }
    }
}

#[axum::debug_handler]
pub async fn remove_song(
    Extension(pool): Extension<SqlitePool>,
    Extension(context): Extension<AuthContext>,
    Path((playlist_id, song_id)): Path<(String, String)>,
) -> Result<ResponseJson<ApiResponse<()>>, (StatusCode, String)> {
    match PlaylistService::new(&pool)
        .remove_song(&context, &playlist_id, &song_id)
        .await
    {
        Ok(()) => Ok(ResponseJson(ApiResponse::<()>::message(
            "Song removed from playlist",
        ))),
        Err(error) => {
            tracing::warn!(
                "User {} could not remove from playlist {}: {}",
                context.user_id,
                playlist_id,
                error
            );
            Err(service_error_to_http(error))
        }
    }
}

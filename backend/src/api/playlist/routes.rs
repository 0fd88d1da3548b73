//! Defines the HTTP routes for playlists.

use super::handlers::{add_song, create_playlist, get_playlist, list_playlists, remove_song};
use crate::auth::middleware::jwt_auth;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

pub fn playlist_router() -> Router {
    Router::new()
        .route("/", get(list_playlists).post(create_playlist))
        .route("/{playlist_id}", get(get_playlist))
        .route("/{playlist_id}/songs", post(add_song))
        .route("/{playlist_id}/songs/{song_id}", delete(remove_song))
        .route_layer(middleware::from_fn(jwt_auth))
}

//! Defines the HTTP routes for the song catalogue.

use super::handlers::{categories, lyrics, made_for_you, recently_played, search};
use crate::auth::middleware::jwt_auth;
use axum::{Router, middleware, routing::get};

pub fn song_router() -> Router {
    Router::new()
        .route("/songs/recently-played", get(recently_played))
        .route("/songs/made-for-you", get(made_for_you))
        .route("/songs/{song_id}/lyrics", get(lyrics))
        .route("/categories/search", get(categories))
        .route("/search", get(search))
        .route_layer(middleware::from_fn(jwt_auth))
}

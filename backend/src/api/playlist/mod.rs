//! Module for playlist API endpoints.
//!
//! Users manage their own playlists; other users' playlists are off limits.

pub mod handlers;
pub mod routes;

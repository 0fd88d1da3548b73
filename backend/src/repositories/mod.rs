//! Persistence layer.
//!
//! Each repository borrows the shared `SqlitePool` and exposes the queries
//! for one aggregate. Repositories return `anyhow::Result`; services turn
//! outcomes into `ServiceError` variants.

pub mod payment_repository;
pub mod playlist_repository;
pub mod song_repository;
pub mod user_repository;

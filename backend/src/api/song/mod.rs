//! Module for song catalogue API endpoints.
//!
//! Home-screen sections, browse categories, search and lyrics. Every route
//! requires an authenticated caller.

pub mod handlers;
pub mod routes;

//! Module for subscription payment API endpoints.
//!
//! Checkout creation for authenticated users and the public gateway
//! notification callback.

pub mod handlers;
pub mod models;
pub mod routes;

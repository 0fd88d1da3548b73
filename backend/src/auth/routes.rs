//! Defines the HTTP routes specifically for authentication.
//!
//! Registration, verification, login and password reset are public; `/me`
//! sits behind the JWT gate.

use crate::auth::handlers::*;
use crate::auth::middleware::jwt_auth;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/verify", get(verify_email))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/me", get(me).layer(middleware::from_fn(jwt_auth)))
}

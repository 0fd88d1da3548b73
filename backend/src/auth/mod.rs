//! Authentication module for managing user accounts, sessions, and access control.
//!
//! This module provides registration with email verification, login, password
//! reset, bearer token issuance and the request gate that turns a bearer
//! token into an `AuthContext`.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;

use crate::utils::clock::Clock;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::PasswordHasher;
use std::sync::Arc;

/// Process-wide authentication dependencies, built once at startup and shared
/// with every request through an `Extension` layer.
#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<JwtUtils>,
    pub hasher: PasswordHasher,
    pub clock: Arc<dyn Clock>,
}

impl AuthState {
    pub fn new(jwt: JwtUtils, hasher: PasswordHasher, clock: Arc<dyn Clock>) -> Self {
        Self {
            jwt: Arc::new(jwt),
            hasher,
            clock,
        }
    }
}

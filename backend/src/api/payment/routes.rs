//! Defines the HTTP routes for subscription payments.
//!
//! `/notification` is called by the payment gateway and carries no bearer
//! token; its payload is verified against the gateway instead.

use super::handlers::{create_transaction, payment_notification};
use crate::auth::middleware::jwt_auth;
use axum::{Router, middleware, routing::post};

pub fn payment_router() -> Router {
    Router::new()
        .route(
            "/transactions",
            post(create_transaction).layer(middleware::from_fn(jwt_auth)),
        )
        .route("/notification", post(payment_notification))
}

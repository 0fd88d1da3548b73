//! Main entry point for the El Music backend.
//!
//! This file initializes the Axum web server, sets up database connections,
//! and registers all API routes and middleware.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

use crate::api::payment::handlers::SharedGateway;
use crate::auth::AuthState;
use crate::services::email_service::mailer_from_config;
use crate::services::payment_gateway::SnapClient;
use crate::utils::clock::SystemClock;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::PasswordHasher;
use anyhow::Context;
use config::Config;
use database::Database;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;
    let pool = db.pool().clone();

    let auth = AuthState::new(
        JwtUtils::new(&config.jwt_secret),
        PasswordHasher::new(config.bcrypt_cost),
        Arc::new(SystemClock),
    );
    let mailer = mailer_from_config(&config);

    let gateway: SharedGateway = match &config.midtrans {
        Some(midtrans) => {
            let client = SnapClient::new(midtrans)
                .map_err(|e| anyhow::anyhow!("Failed to initialize payment gateway: {}", e))?;
            info!(
                "Payment gateway initialized ({})",
                if midtrans.production { "production" } else { "sandbox" }
            );
            Some(Arc::new(client))
        }
        None => {
            warn!("MIDTRANS_SERVER_KEY not set. Payments are disabled.");
            None
        }
    };

    let app = api::build_router(pool, auth, mailer, gateway);

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Starting El Music server on port {}", config.server_port);
    axum::serve(listener, app).await.context("Server error")?;

    db.close().await;
    Ok(())
}

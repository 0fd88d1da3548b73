//! Central module for application-wide configuration settings.
//!
//! This module handles loading the database URL, server port, token signing
//! secret, password hashing cost and the optional SMTP and payment gateway
//! settings from the environment.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub server_port: u16,
    pub app_base_url: String,
    pub email: Option<EmailConfig>,
    pub midtrans: Option<MidtransConfig>,
}

/// SMTP settings. Absent when `SMTP_HOST` is not set.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    pub base_url: String,
}

/// Midtrans Snap settings. Absent when `MIDTRANS_SERVER_KEY` is not set.
#[derive(Debug, Clone)]
pub struct MidtransConfig {
    pub server_key: String,
    pub production: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let bcrypt_cost = env::var("BCRYPT_COST")
            .unwrap_or_else(|_| bcrypt::DEFAULT_COST.to_string())
            .parse::<u32>()
            .context("BCRYPT_COST must be a valid number")?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let app_base_url = env::var("APP_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let email = Self::email_from_env(&app_base_url)?;
        let midtrans = Self::midtrans_from_env()?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            jwt_secret,
            bcrypt_cost,
            server_port,
            app_base_url,
            email,
            midtrans,
        })
    }

    fn email_from_env(base_url: &str) -> Result<Option<EmailConfig>> {
        let smtp_host = match env::var("SMTP_HOST") {
            Ok(host) if !host.trim().is_empty() => host,
            _ => return Ok(None),
        };

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .context("SMTP_PORT must be a valid number")?;

        let smtp_username = env::var("SMTP_USERNAME").context("SMTP_USERNAME not set")?;
        let smtp_password = env::var("SMTP_PASSWORD").context("SMTP_PASSWORD not set")?;
        let from_email = env::var("SMTP_FROM_EMAIL").context("SMTP_FROM_EMAIL not set")?;
        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "El Music".to_string());

        Ok(Some(EmailConfig {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_email,
            from_name,
            base_url: base_url.to_string(),
        }))
    }

    fn midtrans_from_env() -> Result<Option<MidtransConfig>> {
        let server_key = match env::var("MIDTRANS_SERVER_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => return Ok(None),
        };

        let production = env::var("MIDTRANS_PRODUCTION")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .context("MIDTRANS_PRODUCTION must be true or false")?;

        Ok(Some(MidtransConfig {
            server_key,
            production,
        }))
    }
}

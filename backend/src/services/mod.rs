//! Module for core business logic services.
//!
//! Services validate input, enforce ownership and orchestrate the
//! repositories, the mailer and the payment gateway.

pub mod catalog_service;
pub mod email_service;
pub mod payment_gateway;
pub mod payment_service;
pub mod playlist_service;

//! Data structures for authentication-related entities.
//!
//! Request payloads for the credential lifecycle, the login response and the
//! request-scoped `AuthContext` produced by the access-control gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("password_too_long")
            .with_message("Password must be at most 72 bytes".into()));
    }
    Ok(())
}

/// Registration request payload
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1-255 characters"))]
    pub name: String,

    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        custom(function = "validate_password_bytes")
    )]
    pub password: String,
}

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Email verification link parameters
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyEmailQuery {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing token"))]
    pub token: String,
}

/// Password reset request payload
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,
}

/// Password reset completion payload
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        custom(function = "validate_password_bytes")
    )]
    pub new_password: String,
}

/// Login response containing the bearer token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64, // Token lifetime in seconds
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful registration. The token goes to the mailer, never
/// into the HTTP response.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub verification_token: String,
}

/// A stored password reset token awaiting delivery.
#[derive(Debug, Clone)]
pub struct PasswordResetTicket {
    pub name: String,
    pub email: String,
    pub token: String,
}

/// Caller identity attached to a request by the access-control gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub is_subscribed: bool,
}

/// Current user information returned by `/auth/me`
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_verified: bool,
    pub is_subscribed: bool,
    pub subscription_expires_at: Option<DateTime<Utc>>,
}

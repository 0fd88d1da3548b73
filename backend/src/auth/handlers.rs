//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse incoming requests, call `AuthService` for the core
//! logic and hand one-time tokens to the configured `Mailer`. Delivery failures
//! are logged and never change the response.

use crate::api::common::{ApiResponse, service_error_to_http, validation_error_response};
use crate::auth::AuthState;
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::services::email_service::Mailer;
use axum::{
    extract::{Extension, Json, Query},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use validator::Validate;

const REGISTERED_MESSAGE: &str =
    "Registration successful. Please check your email to verify your account.";
const RESET_REQUESTED_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

/// Handle user registration request
#[axum::debug_handler]
pub async fn register(
    Extension(pool): Extension<SqlitePool>,
    Extension(auth): Extension<AuthState>,
    Extension(mailer): Extension<Arc<dyn Mailer>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<()>>), (StatusCode, String)> {
    let registration = match AuthService::new(&pool, &auth).register(payload).await {
        Ok(registration) => registration,
        Err(error) => {
            tracing::warn!("Registration rejected: {}", error);
            return Err(service_error_to_http(error));
        }
    };

    if let Err(e) = mailer
        .send_verification_email(
            &registration.email,
            &registration.name,
            &registration.verification_token,
        )
        .await
    {
        tracing::error!(
            "Failed to send verification email for user {}: {}",
            registration.user_id,
            e
        );
    }

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::<()>::message(REGISTERED_MESSAGE)),
    ))
}

/// Handle the verification link
#[axum::debug_handler]
pub async fn verify_email(
    Extension(pool): Extension<SqlitePool>,
    Extension(auth): Extension<AuthState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<ResponseJson<ApiResponse<()>>, (StatusCode, String)> {
    if let Err(errors) = query.validate() {
        return Err(validation_error_response(errors));
    }

    match AuthService::new(&pool, &auth)
        .verify_email(&query.token)
        .await
    {
        Ok(()) => Ok(ResponseJson(ApiResponse::<()>::message(
            "Email verified successfully. You can now log in.",
        ))),
        Err(error) => {
            tracing::warn!("Email verification rejected: {}", error);
            Err(service_error_to_http(error))
        }
    }
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(auth): Extension<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, (StatusCode, String)> {
    match AuthService::new(&pool, &auth).login(payload).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(
            response,
            "Login successful",
        ))),
        Err(error) => {
            tracing::warn!("Login rejected: {}", error);
            Err(service_error_to_http(error))
        }
    }
}

/// Handle password reset request. Known and unknown emails get the same answer.
#[axum::debug_handler]
pub async fn forgot_password(
    Extension(pool): Extension<SqlitePool>,
    Extension(auth): Extension<AuthState>,
    Extension(mailer): Extension<Arc<dyn Mailer>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<ResponseJson<ApiResponse<()>>, (StatusCode, String)> {
    let ticket = AuthService::new(&pool, &auth)
        .request_password_reset(payload)
        .await
        .map_err(service_error_to_http)?;

    // Delivery never holds up the response.
    if let Some(ticket) = ticket {
        tokio::spawn(async move {
            if let Err(e) = mailer
                .send_password_reset_email(&ticket.email, &ticket.name, &ticket.token)
                .await
            {
                tracing::error!("Failed to send password reset email: {}", e);
            }
        });
    }

    Ok(ResponseJson(ApiResponse::<()>::message(
        RESET_REQUESTED_MESSAGE,
    )))
}

/// Handle password reset completion
#[axum::debug_handler]
pub async fn reset_password(
    Extension(pool): Extension<SqlitePool>,
    Extension(auth): Extension<AuthState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<ResponseJson<ApiResponse<()>>, (StatusCode, String)> {
    match AuthService::new(&pool, &auth)
        .complete_password_reset(payload)
        .await
    {
        Ok(()) => Ok(ResponseJson(ApiResponse::<()>::message(
            "Password has been reset successfully",
        ))),
        Err(error) => {
            tracing::warn!("Password reset rejected: {}", error);
            Err(service_error_to_http(error))
        }
    }
}

/// Get current user information
#[axum::debug_handler]
pub async fn me(
    Extension(pool): Extension<SqlitePool>,
    Extension(auth): Extension<AuthState>,
    Extension(context): Extension<AuthContext>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, (StatusCode, String)> {
    match AuthService::new(&pool, &auth).current_user(&context).await {
        Ok(profile) => Ok(ResponseJson(ApiResponse::ok(profile))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

//! Core business logic for the authentication system.
//!
//! Every flow runs its steps strictly in order and stops at the first
//! rejection. Token consumption happens inside a single conditional update in
//! `UserRepository`, with the current time taken from the injected clock.

use crate::auth::AuthState;
use crate::auth::models::*;
use crate::database::models::NewUser;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::utils::generate_random_string::generate_random_string;
use chrono::Duration;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

/// Length of verification and password reset tokens.
pub const ONE_TIME_TOKEN_LENGTH: usize = 48;
pub const LOGIN_TOKEN_TTL_HOURS: i64 = 24;
pub const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;
pub const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Authentication service for registration, verification, login, password
/// reset and request authentication.
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    state: &'a AuthState,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, state: &'a AuthState) -> Self {
        AuthService { pool, state }
    }

    /// Create an unverified account and a 24 hour verification token.
    ///
    /// # Errors
    /// - `Validation` for malformed input
    /// - `Conflict` when the email is already registered (nothing is written)
    /// - `InternalError` when hashing fails
    pub async fn register(&self, mut request: RegisterRequest) -> ServiceResult<Registration> {
        request.name = request.name.trim().to_string();
        request.email = normalize_email(&request.email);
        request.validate()?;

        let password_hash = self.state.hasher.hash_password(&request.password)?;

        let now = self.state.clock.now();
        let verification_token = generate_random_string(ONE_TIME_TOKEN_LENGTH);
        let new_user = NewUser {
            id: Uuid::now_v7().to_string(),
            name: request.name,
            email: request.email,
            password_hash,
            verification_token: verification_token.clone(),
            verification_token_expires_at: now + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS),
            created_at: now,
        };

        let user = UserRepository::new(self.pool)
            .create_user(new_user)
            .await?
            .ok_or_else(|| ServiceError::conflict("Email already exists"))?;

        tracing::info!("Registered user {}", user.id);

        Ok(Registration {
            user_id: user.id,
            name: user.name,
            email: user.email,
            verification_token,
        })
    }

    /// Consume a verification token and activate its account.
    ///
    /// # Errors
    /// `InvalidOrExpired` for unknown, already used and expired tokens alike
    pub async fn verify_email(&self, token: &str) -> ServiceResult<()> {
        if token.is_empty() {
            return Err(ServiceError::InvalidOrExpired);
        }

        let now = self.state.clock.now();
        let verified = UserRepository::new(self.pool)
            .verify_user(token, now)
            .await?;

        if !verified {
            return Err(ServiceError::InvalidOrExpired);
        }

        Ok(())
    }

    /// Authenticate user and issue a 24 hour bearer token.
    ///
    /// The password is checked before the verification state so that only a
    /// caller who knows the password learns whether the account is verified.
    pub async fn login(&self, mut request: LoginRequest) -> ServiceResult<LoginResponse> {
        request.email = normalize_email(&request.email);
        request.validate()?;

        let user = UserRepository::new(self.pool)
            .get_user_by_email(&request.email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !self
            .state
            .hasher
            .verify_password(&request.password, &user.password_hash)?
        {
            return Err(ServiceError::InvalidCredentials);
        }

        if !user.is_verified {
            return Err(ServiceError::NotVerified);
        }

        let now = self.state.clock.now();
        let expires_at = now + Duration::hours(LOGIN_TOKEN_TTL_HOURS);
        let token = self.state.jwt.generate_token(&user.id, now, expires_at)?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: (expires_at - now).num_seconds(),
            expires_at,
        })
    }

    /// Store a one hour reset token for the account with this email.
    ///
    /// # Returns
    /// The ticket to deliver, or `None` when no account uses the email. Callers
    /// must answer both cases identically.
    pub async fn request_password_reset(
        &self,
        mut request: ForgotPasswordRequest,
    ) -> ServiceResult<Option<PasswordResetTicket>> {
        request.email = normalize_email(&request.email);
        request.validate()?;

        let repo = UserRepository::new(self.pool);
        let Some(user) = repo.get_user_by_email(&request.email).await? else {
            return Ok(None);
        };

        let now = self.state.clock.now();
        let token = generate_random_string(ONE_TIME_TOKEN_LENGTH);
        let stored = repo
            .set_reset_token(
                &user.email,
                &token,
                now + Duration::hours(RESET_TOKEN_TTL_HOURS),
                now,
            )
            .await?;

        if !stored {
            return Ok(None);
        }

        Ok(Some(PasswordResetTicket {
            name: user.name,
            email: user.email,
            token,
        }))
    }

    /// Consume a reset token and replace the account's password.
    ///
    /// # Errors
    /// `InvalidOrExpired` for unknown, already used and expired tokens alike
    pub async fn complete_password_reset(&self, request: ResetPasswordRequest) -> ServiceResult<()> {
        request.validate()?;

        let password_hash = self.state.hasher.hash_password(&request.new_password)?;

        let now = self.state.clock.now();
        let reset = UserRepository::new(self.pool)
            .reset_password(&request.token, &password_hash, now)
            .await?;

        if !reset {
            return Err(ServiceError::InvalidOrExpired);
        }

        Ok(())
    }

    /// Resolve the `Authorization` header of a request into an `AuthContext`.
    ///
    /// The user is looked up on every call, so subscription state reflects the
    /// store rather than the moment the token was issued.
    pub async fn authenticate(&self, authorization: Option<&str>) -> ServiceResult<AuthContext> {
        let header = authorization
            .ok_or_else(|| ServiceError::unauthorized("Missing authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ServiceError::unauthorized("Invalid authorization header format"))?;

        let now = self.state.clock.now();
        let claims = self.state.jwt.validate_token(token, now)?;

        let user = UserRepository::new(self.pool)
            .get_user_by_id(claims.user_id())
            .await?
            .ok_or_else(|| ServiceError::unauthorized("User not found"))?;

        Ok(AuthContext {
            is_subscribed: user.is_subscribed_at(now),
            user_id: user.id,
        })
    }

    /// Profile of the authenticated caller.
    pub async fn current_user(&self, context: &AuthContext) -> ServiceResult<UserProfile> {
        let user = UserRepository::new(self.pool)
            .get_user_by_id(&context.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &context.user_id))?;

        Ok(UserProfile {
            is_subscribed: user.is_subscribed_at(self.state.clock.now()),
            id: user.id,
            name: user.name,
            email: user.email,
            is_verified: user.is_verified,
            subscription_expires_at: user.subscription_expires_at,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

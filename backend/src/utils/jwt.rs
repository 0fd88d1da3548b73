//! JWT token utilities for authentication and authorization.
//!
//! Provides bearer token creation and validation. The token carries only the
//! user identity and its validity window; anything else about the caller is
//! looked up fresh on every request.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Token expiration timestamp
    pub exp: i64,
    /// Token issued at timestamp
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    /// A token is dead from its expiry instant onwards.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// JWT token utility for creating and validating tokens
#[derive(Clone)]
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtUtils {
    /// Create a new JwtUtils instance signing with the given secret.
    pub fn new(secret: &str) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // Expiry is checked against the injected clock in `validate_token`,
        // with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        JwtUtils {
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Generate a signed token for `user_id` that stops being valid at `expires_at`.
    pub fn generate_token(
        &self,
        user_id: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, ServiceError> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal_error(format!("Token generation failed: {}", e)))
    }

    /// Validate and decode a token as of `now`.
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, ServiceError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                ServiceError::unauthorized("Invalid or expired token")
            })?;

        if claims.is_expired_at(now) {
            return Err(ServiceError::unauthorized("Invalid or expired token"));
        }

        Ok(claims)
    }
}

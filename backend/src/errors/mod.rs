//! Global application error types.
//!
//! Every service operation returns a `ServiceResult`, and the API layer turns
//! the typed `ServiceError` into an HTTP response. Callers branch on the
//! variant, never on the rendered message.

use thiserror::Error;

/// Generic service error shared by the authentication, catalogue, playlist
/// and payment services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Unknown email or wrong password. Both causes render identically.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Correct credentials, but the email address was never confirmed.
    #[error("Please verify your email before logging in")]
    NotVerified,

    #[error("{message}")]
    Conflict { message: String },

    /// Unknown or expired one-time token. Both causes render identically.
    #[error("Invalid or expired token")]
    InvalidOrExpired,

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("External service error: {message}")]
    ExternalService { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn external_service(message: impl Into<String>) -> Self {
        Self::ExternalService {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Machine-readable category used in error responses.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::InvalidCredentials => "invalid_credentials",
            Self::NotVerified => "not_verified",
            Self::Conflict { .. } => "conflict",
            Self::InvalidOrExpired => "invalid_or_expired_token",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Database { .. } => "database_error",
            Self::ExternalService { .. } => "external_service_error",
            Self::InternalError { .. } => "internal_error",
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let error_messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();

        ServiceError::validation(error_messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_validation_errors_are_flattened_per_field() {
        let errors = Probe {
            name: String::new(),
        }
        .validate()
        .unwrap_err();

        match ServiceError::from(errors) {
            ServiceError::Validation { message } => assert_eq!(message, "name: Name is required"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_credential_errors_do_not_leak_cause() {
        assert_eq!(ServiceError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(
            ServiceError::InvalidOrExpired.to_string(),
            "Invalid or expired token"
        );
    }
}

//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Token endpoint refused the refresh token
    #[error("Token refresh failed: {0}")]
    Auth(String),

    /// Client misconfigured
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Worth retrying: transport failures and server-side errors.
    /// Auth, permission and request-shape errors will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Internal(_) | Self::InvalidResponse(_)
        )
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Http(_) => ErrorCode::NetworkError,
            Self::InvalidResponse(_) | Self::Serialization(_) => ErrorCode::InvalidFormat,
            Self::Unauthorized => ErrorCode::NotAuthenticated,
            Self::Auth(_) => ErrorCode::TokenInvalid,
            Self::Forbidden(_) => ErrorCode::PermissionDenied,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Internal(_) => ErrorCode::StorageError,
        }
    }
}

impl From<&ClientError> for AppError {
    fn from(err: &ClientError) -> Self {
        AppError::with_message(err.error_code(), err.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ClientError::Unauthorized.error_code(),
            ErrorCode::NotAuthenticated
        );
        assert_eq!(
            ClientError::NotFound("sheet".into()).error_code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            ClientError::Internal("boom".into()).error_code(),
            ErrorCode::StorageError
        );
    }

    #[test]
    fn test_retryable() {
        assert!(ClientError::Internal("503".into()).is_retryable());
        assert!(ClientError::InvalidResponse("truncated".into()).is_retryable());
        assert!(!ClientError::Unauthorized.is_retryable());
        assert!(!ClientError::Forbidden("no".into()).is_retryable());
        assert!(!ClientError::Config("bad".into()).is_retryable());
    }

    #[test]
    fn test_into_app_error() {
        let err = ClientError::Forbidden("read-only".into());
        let app: AppError = (&err).into();
        assert_eq!(app.code, ErrorCode::PermissionDenied);
        assert_eq!(app.message, "Permission denied: read-only");
    }
}

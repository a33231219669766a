//! Unified error codes for Studio
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Member errors
//! - 4xxx: Annotation errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so that the desk and any
/// front end can agree on them without sharing Rust types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid format
    InvalidFormat = 6,

    // ==================== 1xxx: Auth ====================
    /// Not authenticated against the row store
    NotAuthenticated = 1001,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Member ====================
    /// No member matches the given identifiers
    MemberNotFound = 3001,

    // ==================== 4xxx: Annotation ====================
    /// Concurrent edit or data mismatch detected
    AnnotationConflict = 4001,
    /// Requested version is not in history
    VersionNotFound = 4002,
    /// Stored checksum does not match its content
    ChecksumMismatch = 4003,

    // ==================== 9xxx: System ====================
    /// Row store read or write failed
    StorageError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Configuration error
    ConfigError = 9004,
    /// Persistence retries exhausted
    RetriesExhausted = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidFormat => "Invalid format",

            // Auth
            ErrorCode::NotAuthenticated => "Not authenticated with the row store",
            ErrorCode::TokenInvalid => "Access token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Member
            ErrorCode::MemberNotFound => "Member not found",

            // Annotation
            ErrorCode::AnnotationConflict => "Annotation was changed by someone else",
            ErrorCode::VersionNotFound => "Annotation version not found",
            ErrorCode::ChecksumMismatch => "Annotation checksum mismatch",

            // System
            ErrorCode::StorageError => "Storage error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::RetriesExhausted => "Save failed after retrying",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            6 => Ok(ErrorCode::InvalidFormat),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Member
            3001 => Ok(ErrorCode::MemberNotFound),

            // Annotation
            4001 => Ok(ErrorCode::AnnotationConflict),
            4002 => Ok(ErrorCode::VersionNotFound),
            4003 => Ok(ErrorCode::ChecksumMismatch),

            // System
            9002 => Ok(ErrorCode::StorageError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::ConfigError),
            9005 => Ok(ErrorCode::RetriesExhausted),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

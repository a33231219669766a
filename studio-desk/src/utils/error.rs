//! Desk error handling
//!
//! [`DeskError`] is what desk operations return. Each variant maps onto a
//! shared [`ErrorCode`], and `AppError::from(&err)` produces the payload the
//! front desk shows to staff.
//!
//! | Variant | Code |
//! |---------|------|
//! | `NotFound` | 3001 MemberNotFound |
//! | `Conflict` | 4001 AnnotationConflict |
//! | `VersionNotFound` | 4002 VersionNotFound |
//! | `IntegrityFailure` | 4003 ChecksumMismatch |
//! | `PersistenceFailure` | 9005 RetriesExhausted (or the client's code when not retried) |
//! | `Codec` | 6 InvalidFormat |
//! | `Config` | 9004 ConfigError |

use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::models::Conflict;
use sheet_client::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    /// No member matched the supplied identifiers
    #[error("Member not found: {0}")]
    NotFound(String),

    /// Save blocked until staff pick a resolution
    #[error("Save blocked by {} conflict(s)", .0.len())]
    Conflict(Vec<Conflict>),

    #[error("Version {version} not found for member {member_id}")]
    VersionNotFound { member_id: String, version: u32 },

    #[error("Checksum mismatch for member {member_id}")]
    IntegrityFailure { member_id: String },

    /// Store call failed; `attempts` counts the initial call
    #[error("Persistence failed after {attempts} attempt(s): {source}")]
    PersistenceFailure {
        attempts: u32,
        #[source]
        source: ClientError,
    },

    #[error("Invalid row in {sheet}: {message}")]
    Codec { sheet: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DeskError {
    pub fn codec(sheet: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Codec {
            sheet: sheet.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::MemberNotFound,
            Self::Conflict(_) => ErrorCode::AnnotationConflict,
            Self::VersionNotFound { .. } => ErrorCode::VersionNotFound,
            Self::IntegrityFailure { .. } => ErrorCode::ChecksumMismatch,
            Self::PersistenceFailure { attempts, source } => {
                if *attempts > 1 {
                    ErrorCode::RetriesExhausted
                } else {
                    source.error_code()
                }
            }
            Self::Codec { .. } => ErrorCode::InvalidFormat,
            Self::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Conflicts carried by a blocked save, empty otherwise
    pub fn conflicts(&self) -> &[Conflict] {
        match self {
            Self::Conflict(conflicts) => conflicts,
            _ => &[],
        }
    }
}

impl From<ClientError> for DeskError {
    fn from(source: ClientError) -> Self {
        Self::PersistenceFailure {
            attempts: 1,
            source,
        }
    }
}

impl From<&DeskError> for AppError {
    fn from(err: &DeskError) -> Self {
        let app = AppError::with_message(err.code(), err.to_string());
        match err {
            DeskError::NotFound(query) => app.with_detail("query", query.as_str()),
            DeskError::Conflict(conflicts) => {
                let messages: Vec<Value> = conflicts
                    .iter()
                    .map(|c| Value::String(c.message()))
                    .collect();
                let app = app.with_detail("messages", messages);
                match serde_json::to_value(conflicts) {
                    Ok(value) => app.with_detail("conflicts", value),
                    Err(_) => app,
                }
            }
            DeskError::VersionNotFound { member_id, version } => app
                .with_detail("memberId", member_id.as_str())
                .with_detail("version", *version),
            DeskError::IntegrityFailure { member_id } => {
                app.with_detail("memberId", member_id.as_str())
            }
            DeskError::PersistenceFailure { attempts, .. } => {
                app.with_detail("attempts", *attempts)
            }
            DeskError::Codec { sheet, .. } => app.with_detail("sheet", sheet.as_str()),
            DeskError::Config(_) => app,
        }
    }
}

pub type DeskResult<T> = Result<T, DeskError>;

//! Error payload surfaced to staff

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is what a front end renders as a notification:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details (conflicting associate, field values, ...)
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Look up a detail entry
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.as_ref().and_then(|d| d.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message() {
        let err = AppError::new(ErrorCode::VersionNotFound);
        assert_eq!(err.message, "Annotation version not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_with_detail() {
        let err = AppError::with_message(ErrorCode::MemberNotFound, "Member M1 not found")
            .with_detail("member_id", "M1");
        assert_eq!(err.code, ErrorCode::MemberNotFound);
        assert_eq!(err.to_string(), "Member M1 not found");
        assert_eq!(err.detail("member_id"), Some(&Value::from("M1")));
        assert_eq!(err.detail("missing"), None);
    }

    #[test]
    fn test_serialize_payload() {
        let err = AppError::with_message(ErrorCode::AnnotationConflict, "Edited by Alice")
            .with_detail("edited_by", "Alice");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], 4001);
        assert_eq!(json["message"], "Edited by Alice");
        assert_eq!(json["details"]["edited_by"], "Alice");
    }
}

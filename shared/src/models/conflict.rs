//! Conflict Model
//!
//! Conflicts are transient: produced before a save, shown to staff, then
//! discarded. They are never written to the sheet.

use serde::{Deserialize, Serialize};

/// Disagreement between an in-flight edit and the stored annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Conflict {
    /// Someone saved this annotation inside the conflict window
    ConcurrentEdit { edited_by: String, minutes_ago: i64 },
    /// Stored identifying field differs from the member's current value
    DataMismatch {
        field: String,
        stored: String,
        current: String,
    },
}

impl Conflict {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConcurrentEdit { .. } => "concurrent_edit",
            Self::DataMismatch { .. } => "data_mismatch",
        }
    }

    /// Staff-facing description
    pub fn message(&self) -> String {
        match self {
            Self::ConcurrentEdit {
                edited_by,
                minutes_ago,
            } => format!(
                "{edited_by} edited this annotation {}",
                minutes_ago_label(*minutes_ago)
            ),
            Self::DataMismatch {
                field,
                stored,
                current,
            } => format!("Stored {field} '{stored}' does not match current '{current}'"),
        }
    }
}

pub fn minutes_ago_label(minutes: i64) -> String {
    match minutes {
        i64::MIN..=0 => "just now".to_string(),
        1 => "~1 minute ago".to_string(),
        n => format!("~{n} minutes ago"),
    }
}

/// How staff chose to proceed after seeing conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictResolution {
    /// Save the edit as-is
    Overwrite,
    /// Combine the edit with the stored annotation, then save
    Merge,
    /// Drop the edit
    Cancel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrent_edit_message() {
        let conflict = Conflict::ConcurrentEdit {
            edited_by: "Alice".into(),
            minutes_ago: 2,
        };
        assert_eq!(conflict.kind(), "concurrent_edit");
        assert_eq!(conflict.message(), "Alice edited this annotation ~2 minutes ago");
    }

    #[test]
    fn test_minutes_ago_label() {
        assert_eq!(minutes_ago_label(0), "just now");
        assert_eq!(minutes_ago_label(1), "~1 minute ago");
        assert_eq!(minutes_ago_label(4), "~4 minutes ago");
    }

    #[test]
    fn test_conflict_json_is_tagged() {
        let conflict = Conflict::DataMismatch {
            field: "email".into(),
            stored: "old@x.com".into(),
            current: "a@x.com".into(),
        };
        let json = serde_json::to_value(&conflict).unwrap();
        assert_eq!(json["type"], "data_mismatch");
        assert_eq!(json["field"], "email");
    }
}

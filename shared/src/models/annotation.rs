//! Annotation Model
//!
//! An annotation is the comments / notes / tags staff attach to a member.
//! The persisted form is an [`AnnotationRecord`]: the current fields plus an
//! append-only list of [`AnnotationVersion`] snapshots and a checksum.

use serde::{Deserialize, Serialize};

use crate::util::rfc3339_millis;

/// Annotation content fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationFields {
    pub comments: String,
    pub notes: String,
    pub tags: Vec<String>,
}

impl AnnotationFields {
    pub fn new(comments: impl Into<String>, notes: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            comments: comments.into(),
            notes: notes.into(),
            tags: normalize_tags(tags),
        }
    }

    /// Canonical form: text trimmed, tags normalized.
    ///
    /// This is exactly what survives a write and re-read of the sheet cells,
    /// so checksums are computed over it.
    pub fn normalized(self) -> Self {
        Self {
            comments: self.comments.trim().to_string(),
            notes: self.notes.trim().to_string(),
            tags: normalize_tags(self.tags),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.comments.trim().is_empty() && self.notes.trim().is_empty() && self.tags.is_empty()
    }
}

/// Separator of the tags cell; never part of a normalized tag
pub const TAG_SEPARATOR: char = ',';

/// Split on the separator, trim, drop blanks and duplicates, keep first-seen order
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for raw in tags {
        for tag in raw.as_ref().split(TAG_SEPARATOR) {
            let tag = tag.trim();
            if !tag.is_empty() && !out.iter().any(|t| t == tag) {
                out.push(tag.to_string());
            }
        }
    }
    out
}

/// Annotation as attached to a [`Member`](super::Member) in the roster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(flatten)]
    pub fields: AnnotationFields,
    /// `None` when the fields came from the plain (unversioned) sheet
    pub version: Option<u32>,
    pub updated_at: Option<i64>,
    pub updated_by: Option<String>,
}

/// How a version came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Create,
    Update,
    Rollback,
}

/// Immutable snapshot appended on every save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationVersion {
    pub version: u32,
    #[serde(with = "rfc3339_millis")]
    pub timestamp: i64,
    pub associate: String,
    #[serde(flatten)]
    pub fields: AnnotationFields,
    pub change_type: ChangeType,
    pub previous_version: Option<u32>,
    /// Version whose content a rollback restored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restored_from: Option<u32>,
}

/// Health of a persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Active,
    Corrupted,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Corrupted => "corrupted",
        }
    }

    /// Unknown cell values are read as active; the checksum decides corruption
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("corrupted") {
            Self::Corrupted
        } else {
            Self::Active
        }
    }
}

/// One row of the enhanced annotations sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub member_id: String,
    pub email: String,
    pub unique_id: String,
    pub first_name: String,
    pub last_name: String,
    pub current: AnnotationFields,
    pub current_version: u32,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: String,
    pub updated_by: String,
    /// Oldest first
    pub history: Vec<AnnotationVersion>,
    pub checksum: String,
    pub last_verified: Option<i64>,
    pub status: RecordStatus,
}

impl AnnotationRecord {
    pub fn latest(&self) -> Option<&AnnotationVersion> {
        self.history.last()
    }

    pub fn find_version(&self, version: u32) -> Option<&AnnotationVersion> {
        self.history.iter().find(|v| v.version == version)
    }

    /// Roster view of this record
    pub fn to_annotation(&self) -> Annotation {
        Annotation {
            fields: self.current.clone(),
            version: Some(self.current_version),
            updated_at: Some(self.updated_at),
            updated_by: Some(self.updated_by.clone()),
        }
    }
}

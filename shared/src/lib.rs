//! Shared types for Studio
//!
//! Domain models, the unified error system and small utilities used by
//! both the sheet client and the annotation desk.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, ErrorCategory, ErrorCode};
pub use models::{
    Annotation, AnnotationFields, AnnotationRecord, AnnotationVersion, ChangeType, Conflict,
    ConflictResolution, Member, MemberDraft, MemberStatus, RecordStatus,
};
pub use serde::{Deserialize, Serialize};

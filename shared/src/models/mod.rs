//! Data models
//!
//! Shared between the sheet client and the annotation desk.
//! Timestamps are `i64` Unix millis; IDs are the strings found in the sheet.

pub mod annotation;
pub mod conflict;
pub mod member;

// Re-exports
pub use annotation::*;
pub use conflict::*;
pub use member::*;

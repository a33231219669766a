//! Field merge for the `Merge` conflict resolution
//!
//! Merging never drops text: tags are unioned, and differing free text is
//! kept side by side with the stored text first.

use shared::models::AnnotationFields;
use shared::models::annotation::normalize_tags;

pub fn merge(stored: &AnnotationFields, candidate: &AnnotationFields) -> AnnotationFields {
    AnnotationFields {
        comments: merge_text(&stored.comments, &candidate.comments),
        notes: merge_text(&stored.notes, &candidate.notes),
        tags: normalize_tags(stored.tags.iter().chain(candidate.tags.iter())),
    }
}

fn merge_text(stored: &str, candidate: &str) -> String {
    let (s, c) = (stored.trim(), candidate.trim());
    if s.is_empty() || s == c {
        return candidate.to_string();
    }
    if c.is_empty() || s.contains(c) {
        return stored.to_string();
    }
    format!("{}\n\n{}", stored.trim_end(), candidate.trim_start())
}

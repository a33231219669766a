//! Record checksums
//!
//! A 32-bit rolling hash (`h = h * 31 + c`, wrapping) over a canonical
//! encoding of the identifying and content fields. It detects hand edits
//! and truncated writes in the sheet; it is not a security boundary.

use shared::models::{AnnotationFields, AnnotationRecord};

/// Separates canonical fields; cannot appear in a sheet cell typed by hand
const FIELD_SEPARATOR: &str = "\u{1f}";

fn canonical(member_id: &str, email: &str, fields: &AnnotationFields, version: u32) -> String {
    let mut tags: Vec<&str> = fields.tags.iter().map(String::as_str).collect();
    tags.sort_unstable();
    let tags = tags.join(",");
    let version = version.to_string();

    [
        member_id,
        email,
        fields.comments.as_str(),
        fields.notes.as_str(),
        tags.as_str(),
        version.as_str(),
    ]
    .join(FIELD_SEPARATOR)
}

fn rolling_hash(input: &str) -> u32 {
    input
        .chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32))
}

/// Checksum as 8 lowercase hex digits
pub fn checksum(member_id: &str, email: &str, fields: &AnnotationFields, version: u32) -> String {
    format!(
        "{:08x}",
        rolling_hash(&canonical(member_id, email, fields, version))
    )
}

/// Checksum of a record's current state
pub fn record_checksum(record: &AnnotationRecord) -> String {
    checksum(
        &record.member_id,
        &record.email,
        &record.current,
        record.current_version,
    )
}

/// Recompute and compare against the stored checksum
pub fn validate(record: &AnnotationRecord) -> bool {
    let expected = record_checksum(record);
    let ok = expected.eq_ignore_ascii_case(record.checksum.trim());
    if !ok {
        tracing::warn!(
            member_id = %record.member_id,
            version = record.current_version,
            stored = %record.checksum,
            expected = %expected,
            "Checksum mismatch"
        );
    }
    ok
}

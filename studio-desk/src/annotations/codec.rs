//! Row codecs for the three sheets
//!
//! Every sheet starts with a header row. Readers skip it (and blank rows),
//! writers always emit it. Cells beyond a short row's end read as empty.

use std::str::FromStr;

use rust_decimal::Decimal;
use shared::models::annotation::{TAG_SEPARATOR, normalize_tags};
use shared::models::{
    Annotation, AnnotationFields, AnnotationRecord, AnnotationVersion, Member, MemberStatus,
    RecordStatus,
};
use shared::util::{millis_to_rfc3339, parse_rfc3339_millis, parse_sheet_date};
use sheet_client::Row;

use crate::utils::{DeskError, DeskResult};

pub const MEMBER_HEADER: [&str; 12] = [
    "memberId",
    "firstName",
    "lastName",
    "email",
    "uniqueId",
    "location",
    "membershipType",
    "startDate",
    "endDate",
    "sessionsLeft",
    "amountPaid",
    "status",
];

pub const PLAIN_HEADER: [&str; 8] = [
    "memberId",
    "email",
    "comments",
    "notes",
    "tags",
    "lastUpdated",
    "uniqueId",
    "associateName",
];

pub const ENHANCED_HEADER: [&str; 17] = [
    "memberId",
    "email",
    "uniqueId",
    "firstName",
    "lastName",
    "currentComments",
    "currentNotes",
    "currentTags",
    "currentVersion",
    "createdAt",
    "updatedAt",
    "createdBy",
    "updatedBy",
    "versionHistory",
    "checksum",
    "lastVerified",
    "status",
];

fn cell(row: &Row, index: usize) -> &str {
    row.get(index).map(|c| c.trim()).unwrap_or("")
}

/// Text cell, kept verbatim apart from the missing-cell case
fn raw_cell(row: &Row, index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

fn is_blank(row: &Row) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn is_header(row: &Row, header: &[&str]) -> bool {
    header
        .first()
        .is_some_and(|first| cell(row, 0).eq_ignore_ascii_case(first))
}

/// Data rows only: header and blank rows removed
pub fn data_rows<'a>(rows: &'a [Row], header: &'a [&str]) -> impl Iterator<Item = &'a Row> + 'a {
    rows.iter()
        .filter(move |row| !is_blank(row) && !is_header(row, header))
}

pub fn header_row(header: &[&str]) -> Row {
    header.iter().map(|h| h.to_string()).collect()
}

pub fn split_tags(cell: &str) -> Vec<String> {
    normalize_tags([cell])
}

/// Lossless for normalized tags, which never contain the separator
pub fn join_tags(tags: &[String]) -> String {
    let mut cell = String::new();
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            cell.push(TAG_SEPARATOR);
        }
        cell.push_str(tag);
    }
    cell
}

fn parse_amount(value: &str) -> Decimal {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&cleaned).unwrap_or_else(|_| {
        tracing::debug!(value, "Unparsable amount, using zero");
        Decimal::ZERO
    })
}

// ========== Members ==========

/// Decode a members-sheet row; `None` for rows without a member ID
pub fn decode_member(row: &Row) -> Option<Member> {
    let member_id = cell(row, 0);
    if member_id.is_empty() {
        return None;
    }

    let status_cell = cell(row, 11);
    let status = MemberStatus::from_str(status_cell).unwrap_or_else(|_| {
        if !status_cell.is_empty() {
            tracing::debug!(member_id, status = status_cell, "Unknown member status");
        }
        MemberStatus::default()
    });

    Some(Member {
        member_id: member_id.to_string(),
        first_name: cell(row, 1).to_string(),
        last_name: cell(row, 2).to_string(),
        email: cell(row, 3).to_string(),
        unique_id: cell(row, 4).to_string(),
        location: cell(row, 5).to_string(),
        membership_type: cell(row, 6).to_string(),
        start_date: parse_sheet_date(cell(row, 7)),
        end_date: parse_sheet_date(cell(row, 8)),
        sessions_left: cell(row, 9).parse().ok(),
        amount_paid: parse_amount(cell(row, 10)),
        status,
        annotation: Annotation::default(),
    })
}

pub fn decode_members(rows: &[Row]) -> Vec<Member> {
    data_rows(rows, &MEMBER_HEADER)
        .filter_map(decode_member)
        .collect()
}

// ========== Plain annotations ==========

/// One row of the plain (unversioned) annotations sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainAnnotation {
    pub member_id: String,
    pub email: String,
    pub fields: AnnotationFields,
    pub last_updated: Option<i64>,
    pub unique_id: String,
    pub associate: String,
}

impl PlainAnnotation {
    /// Mirror of a record's current state
    pub fn from_record(record: &AnnotationRecord) -> Self {
        Self {
            member_id: record.member_id.clone(),
            email: record.email.clone(),
            fields: record.current.clone(),
            last_updated: Some(record.updated_at),
            unique_id: record.unique_id.clone(),
            associate: record.updated_by.clone(),
        }
    }

    pub fn to_annotation(&self) -> Annotation {
        Annotation {
            fields: self.fields.clone(),
            version: None,
            updated_at: self.last_updated,
            updated_by: (!self.associate.is_empty()).then(|| self.associate.clone()),
        }
    }
}

pub fn decode_plain(row: &Row) -> Option<PlainAnnotation> {
    let member_id = cell(row, 0);
    if member_id.is_empty() {
        return None;
    }
    Some(PlainAnnotation {
        member_id: member_id.to_string(),
        email: cell(row, 1).to_string(),
        fields: AnnotationFields {
            comments: raw_cell(row, 2),
            notes: raw_cell(row, 3),
            tags: split_tags(cell(row, 4)),
        },
        last_updated: parse_rfc3339_millis(cell(row, 5)),
        unique_id: cell(row, 6).to_string(),
        associate: cell(row, 7).to_string(),
    })
}

pub fn decode_plain_rows(rows: &[Row]) -> Vec<PlainAnnotation> {
    data_rows(rows, &PLAIN_HEADER)
        .filter_map(decode_plain)
        .collect()
}

pub fn encode_plain(plain: &PlainAnnotation) -> Row {
    vec![
        plain.member_id.clone(),
        plain.email.clone(),
        plain.fields.comments.clone(),
        plain.fields.notes.clone(),
        join_tags(&plain.fields.tags),
        plain.last_updated.map(millis_to_rfc3339).unwrap_or_default(),
        plain.unique_id.clone(),
        plain.associate.clone(),
    ]
}

/// Header plus one row per annotation
pub fn encode_plain_sheet(plain: &[PlainAnnotation]) -> Vec<Row> {
    std::iter::once(header_row(&PLAIN_HEADER))
        .chain(plain.iter().map(encode_plain))
        .collect()
}

// ========== Enhanced annotations ==========

fn timestamp(row: &Row, index: usize, sheet: &str, name: &str) -> DeskResult<Option<i64>> {
    let value = cell(row, index);
    if value.is_empty() {
        return Ok(None);
    }
    parse_rfc3339_millis(value)
        .map(Some)
        .ok_or_else(|| DeskError::codec(sheet, format!("{name} '{value}' is not RFC 3339")))
}

/// Decode an enhanced-sheet row. The checksum is not verified here.
pub fn decode_record(row: &Row, sheet: &str) -> DeskResult<AnnotationRecord> {
    let member_id = cell(row, 0);
    if member_id.is_empty() {
        return Err(DeskError::codec(sheet, "missing memberId"));
    }

    let version_cell = cell(row, 8);
    let current_version: u32 = version_cell.parse().map_err(|_| {
        DeskError::codec(
            sheet,
            format!("{member_id}: currentVersion '{version_cell}' is not a number"),
        )
    })?;

    let history_cell = cell(row, 13);
    let history: Vec<AnnotationVersion> = if history_cell.is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(history_cell).map_err(|e| {
            DeskError::codec(sheet, format!("{member_id}: versionHistory: {e}"))
        })?
    };

    let updated_at = timestamp(row, 10, sheet, "updatedAt")?
        .ok_or_else(|| DeskError::codec(sheet, format!("{member_id}: missing updatedAt")))?;
    let created_at = timestamp(row, 9, sheet, "createdAt")?.unwrap_or(updated_at);

    Ok(AnnotationRecord {
        member_id: member_id.to_string(),
        email: cell(row, 1).to_string(),
        unique_id: cell(row, 2).to_string(),
        first_name: cell(row, 3).to_string(),
        last_name: cell(row, 4).to_string(),
        current: AnnotationFields {
            comments: raw_cell(row, 5),
            notes: raw_cell(row, 6),
            tags: split_tags(cell(row, 7)),
        },
        current_version,
        created_at,
        updated_at,
        created_by: cell(row, 11).to_string(),
        updated_by: cell(row, 12).to_string(),
        history,
        checksum: cell(row, 14).to_string(),
        last_verified: timestamp(row, 15, sheet, "lastVerified")?,
        status: RecordStatus::parse(cell(row, 16)),
    })
}

pub fn encode_record(record: &AnnotationRecord) -> DeskResult<Row> {
    let history = serde_json::to_string(&record.history)
        .map_err(|e| DeskError::codec("versionHistory", e.to_string()))?;

    Ok(vec![
        record.member_id.clone(),
        record.email.clone(),
        record.unique_id.clone(),
        record.first_name.clone(),
        record.last_name.clone(),
        record.current.comments.clone(),
        record.current.notes.clone(),
        join_tags(&record.current.tags),
        record.current_version.to_string(),
        millis_to_rfc3339(record.created_at),
        millis_to_rfc3339(record.updated_at),
        record.created_by.clone(),
        record.updated_by.clone(),
        history,
        record.checksum.clone(),
        record.last_verified.map(millis_to_rfc3339).unwrap_or_default(),
        record.status.as_str().to_string(),
    ])
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::models::ChangeType;

    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_decode_members_skips_header_and_blanks() {
        let rows = vec![
            header_row(&MEMBER_HEADER),
            row(&[
                "M1", "Alice", "Ng", "alice@studio.test", "U1", "Downtown", "Unlimited",
                "07/03/2024", "2025-03-07", "12", "$1,250.50", "ACTIVE",
            ]),
            row(&["", "", ""]),
            row(&["M2", "Bob"]),
        ];

        let members = decode_members(&rows);

        assert_eq!(members.len(), 2);
        let alice = &members[0];
        assert_eq!(alice.full_name(), "Alice Ng");
        assert_eq!(alice.start_date, NaiveDate::from_ymd_opt(2024, 3, 7));
        assert_eq!(alice.sessions_left, Some(12));
        assert_eq!(alice.amount_paid, Decimal::new(125050, 2));
        assert_eq!(alice.status, MemberStatus::Active);

        let bob = &members[1];
        assert_eq!(bob.email, "");
        assert_eq!(bob.amount_paid, Decimal::ZERO);
        assert_eq!(bob.status, MemberStatus::Pending);
        assert_eq!(bob.start_date, None);
    }

    #[test]
    fn test_plain_row_decoding() {
        let rows = vec![
            header_row(&PLAIN_HEADER),
            row(&[
                "M1",
                "alice@studio.test",
                "Prefers mornings",
                "",
                "vip, pt ,,vip",
                "2024-06-10T06:13:20.123Z",
                "U1",
                "Alice",
            ]),
        ];

        let plain = decode_plain_rows(&rows);

        assert_eq!(plain.len(), 1);
        assert_eq!(plain[0].fields.tags, vec!["vip", "pt"]);
        assert_eq!(plain[0].last_updated, Some(1_718_000_000_123));
        assert_eq!(plain[0].to_annotation().updated_by.as_deref(), Some("Alice"));
        assert_eq!(plain[0].to_annotation().version, None);
    }

    #[test]
    fn test_plain_sheet_encoding_has_header() {
        let plain = PlainAnnotation {
            member_id: "M1".into(),
            email: "a@x.com".into(),
            fields: AnnotationFields::new("c", "n", vec!["vip".into(), "pt".into()]),
            last_updated: None,
            unique_id: "U1".into(),
            associate: "Alice".into(),
        };
        let rows = encode_plain_sheet(std::slice::from_ref(&plain));

        assert_eq!(rows[0], header_row(&PLAIN_HEADER));
        assert_eq!(rows[1], row(&["M1", "a@x.com", "c", "n", "vip,pt", "", "U1", "Alice"]));
        assert_eq!(decode_plain_rows(&rows), vec![plain]);
    }

    #[test]
    fn test_enhanced_row_matches_column_order() {
        let record = AnnotationRecord {
            member_id: "M1".into(),
            email: "a@x.com".into(),
            unique_id: "U1".into(),
            first_name: "Alice".into(),
            last_name: "Ng".into(),
            current: AnnotationFields::new("c", "", vec!["vip".into()]),
            current_version: 1,
            created_at: 1_718_000_000_000,
            updated_at: 1_718_000_000_000,
            created_by: "Alice".into(),
            updated_by: "Alice".into(),
            history: vec![AnnotationVersion {
                version: 1,
                timestamp: 1_718_000_000_000,
                associate: "Alice".into(),
                fields: AnnotationFields::new("c", "", vec!["vip".into()]),
                change_type: ChangeType::Create,
                previous_version: None,
                restored_from: None,
            }],
            checksum: "0000abcd".into(),
            last_verified: None,
            status: RecordStatus::Active,
        };

        let encoded = encode_record(&record).unwrap();

        assert_eq!(encoded.len(), ENHANCED_HEADER.len());
        assert_eq!(encoded[8], "1");
        assert_eq!(encoded[10], "2024-06-10T06:13:20.000Z");
        assert_eq!(encoded[15], "");
        assert_eq!(encoded[16], "active");
        let history: serde_json::Value = serde_json::from_str(&encoded[13]).unwrap();
        assert_eq!(history[0]["changeType"], "create");
        assert_eq!(history[0]["timestamp"], "2024-06-10T06:13:20.000Z");

        assert_eq!(decode_record(&encoded, "EnhancedAnnotations").unwrap(), record);
    }

    #[test]
    fn test_bad_history_is_codec_error() {
        let mut cells = vec![String::new(); ENHANCED_HEADER.len()];
        cells[0] = "M1".into();
        cells[8] = "2".into();
        cells[10] = "2024-06-10T06:13:20.000Z".into();
        cells[13] = "[{not json".into();

        let err = decode_record(&cells, "EnhancedAnnotations").unwrap_err();
        assert!(matches!(err, DeskError::Codec { ref sheet, .. } if sheet == "EnhancedAnnotations"));
    }

    #[test]
    fn test_missing_version_is_codec_error() {
        let cells = row(&["M1", "a@x.com"]);
        assert!(decode_record(&cells, "EnhancedAnnotations").is_err());
    }
}

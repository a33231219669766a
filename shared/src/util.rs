//! Time, ID and date helpers

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64.
///
/// Layout (53 bits):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Prefix for member IDs created locally (never written to the members sheet)
pub const LOCAL_MEMBER_PREFIX: &str = "LOCAL-";

/// Synthetic member ID for a member created from the desk rather than the sheet
pub fn synthetic_member_id() -> String {
    format!("{LOCAL_MEMBER_PREFIX}{}", snowflake_id())
}

/// Unix millis → RFC 3339 (UTC, millisecond precision)
pub fn millis_to_rfc3339(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// RFC 3339 → Unix millis
pub fn parse_rfc3339_millis(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Parse a date cell as staff type it into the members sheet.
///
/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY`, `YYYY-MM-DD HH:MM:SS`, RFC 3339 and
/// `Mon DD, YYYY`. Anything else is treated as "no date".
pub fn parse_sheet_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }

    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.date_naive()),
        Err(_) => {
            tracing::debug!(value, "Unrecognised date cell");
            None
        }
    }
}

/// Serde adapter: `i64` Unix millis stored as an RFC 3339 string.
///
/// Deserialization also accepts a bare integer so that history written by
/// older tooling still loads.
pub mod rfc3339_millis {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(millis: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::millis_to_rfc3339(*millis))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Millis(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Millis(millis) => Ok(millis),
            Raw::Text(text) => super::parse_rfc3339_millis(&text)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {text}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_roundtrip() {
        let millis = 1_718_000_000_123;
        let text = millis_to_rfc3339(millis);
        assert_eq!(text, "2024-06-10T06:13:20.123Z");
        assert_eq!(parse_rfc3339_millis(&text), Some(millis));
    }

    #[test]
    fn test_parse_sheet_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7);
        assert_eq!(parse_sheet_date("2024-03-07"), expected);
        assert_eq!(parse_sheet_date("07/03/2024"), expected);
        assert_eq!(parse_sheet_date("2024-03-07 18:30:00"), expected);
        assert_eq!(parse_sheet_date("2024-03-07T18:30:00Z"), expected);
        assert_eq!(parse_sheet_date("Mar 07, 2024"), expected);
    }

    #[test]
    fn test_parse_sheet_date_rejects_garbage() {
        assert_eq!(parse_sheet_date(""), None);
        assert_eq!(parse_sheet_date("   "), None);
        assert_eq!(parse_sheet_date("next tuesday"), None);
        assert_eq!(parse_sheet_date("2024-13-40"), None);
    }

    #[test]
    fn test_synthetic_member_id() {
        let id = synthetic_member_id();
        assert!(id.starts_with(LOCAL_MEMBER_PREFIX));
        assert!(id[LOCAL_MEMBER_PREFIX.len()..].parse::<i64>().is_ok());
    }
}

//! Member Model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::annotation::Annotation;
use crate::util::LOCAL_MEMBER_PREFIX;

/// Membership status as entered in the members sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MemberStatus {
    Active,
    Churned,
    Frozen,
    #[default]
    Pending,
    Suspended,
    Trial,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Churned => "Churned",
            Self::Frozen => "Frozen",
            Self::Pending => "Pending",
            Self::Suspended => "Suspended",
            Self::Trial => "Trial",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "churned" => Ok(Self::Churned),
            "frozen" => Ok(Self::Frozen),
            "pending" => Ok(Self::Pending),
            "suspended" => Ok(Self::Suspended),
            "trial" => Ok(Self::Trial),
            other => Err(format!("unknown member status: {other}")),
        }
    }
}

/// Member entity (one studio customer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub member_id: String,
    pub email: String,
    pub unique_id: String,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub membership_type: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sessions_left: Option<u32>,
    pub amount_paid: Decimal,
    pub status: MemberStatus,
    #[serde(default)]
    pub annotation: Annotation,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Created from the desk, not present in the members sheet
    pub fn is_local(&self) -> bool {
        self.member_id.starts_with(LOCAL_MEMBER_PREFIX)
    }
}

/// Create member payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDraft {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub membership_type: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sessions_left: Option<u32>,
    pub amount_paid: Decimal,
    pub status: MemberStatus,
}

impl MemberDraft {
    /// Materialize with an assigned member ID.
    ///
    /// Local members reuse their member ID as the unique ID since nothing
    /// upstream has issued one. Text fields are trimmed the way sheet cells
    /// are read back.
    pub fn into_member(self, member_id: String) -> Member {
        let member_id = member_id.trim().to_string();
        Member {
            unique_id: member_id.clone(),
            member_id,
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            location: self.location.trim().to_string(),
            membership_type: self.membership_type.trim().to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            sessions_left: self.sessions_left,
            amount_paid: self.amount_paid,
            status: self.status,
            annotation: Annotation::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("active".parse(), Ok(MemberStatus::Active));
        assert_eq!(" Churned ".parse(), Ok(MemberStatus::Churned));
        assert_eq!("TRIAL".parse(), Ok(MemberStatus::Trial));
        assert!("gold".parse::<MemberStatus>().is_err());
    }

    #[test]
    fn test_full_name_trims() {
        let member = MemberDraft {
            first_name: " Ana ".into(),
            last_name: "".into(),
            ..Default::default()
        }
        .into_member("M9".into());
        assert_eq!(member.full_name(), "Ana");
        assert_eq!(member.first_name, "Ana");
        assert_eq!(member.unique_id, "M9");
        assert!(!member.is_local());
    }

    #[test]
    fn test_into_member_trims_email() {
        let member = MemberDraft {
            email: "walkin@studio.test ".into(),
            ..Default::default()
        }
        .into_member("M9".into());
        assert_eq!(member.email, "walkin@studio.test");
    }
}

//! Member resolution
//!
//! Finds the roster member an edit refers to from whatever identifiers the
//! desk has on hand. Matching is exact after trimming; a blank identifier
//! never matches, so empty spreadsheet cells cannot pair two members.

use shared::models::Member;

use crate::utils::{DeskError, DeskResult};

/// Identifiers supplied with an edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberQuery {
    pub member_id: String,
    pub email: String,
    pub unique_id: String,
}

impl MemberQuery {
    pub fn new(
        member_id: impl Into<String>,
        email: impl Into<String>,
        unique_id: impl Into<String>,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            email: email.into(),
            unique_id: unique_id.into(),
        }
    }

    pub fn by_member_id(member_id: impl Into<String>) -> Self {
        Self {
            member_id: member_id.into(),
            ..Default::default()
        }
    }

    pub fn for_member(member: &Member) -> Self {
        Self::new(&member.member_id, &member.email, &member.unique_id)
    }
}

/// Which rule produced the match, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    AllIdentifiers,
    MemberIdAndEmail,
    UniqueIdAndEmail,
    MemberIdOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub member: &'a Member,
    pub matched_by: MatchKind,
}

fn same(stored: &str, query: &str) -> bool {
    let query = query.trim();
    !query.is_empty() && stored.trim() == query
}

/// Resolve `query` against `members`, trying each rule across the whole
/// roster before falling back to the next.
pub fn resolve<'a>(members: &'a [Member], query: &MemberQuery) -> DeskResult<Resolved<'a>> {
    let rules: [(MatchKind, fn(&Member, &MemberQuery) -> bool); 4] = [
        (MatchKind::AllIdentifiers, all_identifiers),
        (MatchKind::MemberIdAndEmail, member_id_and_email),
        (MatchKind::UniqueIdAndEmail, unique_id_and_email),
        (MatchKind::MemberIdOnly, member_id_only),
    ];

    for (kind, rule) in rules {
        if let Some(member) = members.iter().find(|m| rule(m, query)) {
            if kind != MatchKind::AllIdentifiers {
                tracing::debug!(
                    member_id = %member.member_id,
                    matched_by = ?kind,
                    "Resolved member on partial identifiers"
                );
            }
            return Ok(Resolved {
                member,
                matched_by: kind,
            });
        }
    }

    Err(DeskError::NotFound(describe(query)))
}

fn all_identifiers(m: &Member, q: &MemberQuery) -> bool {
    same(&m.member_id, &q.member_id) && same(&m.email, &q.email) && same(&m.unique_id, &q.unique_id)
}

fn member_id_and_email(m: &Member, q: &MemberQuery) -> bool {
    same(&m.member_id, &q.member_id) && same(&m.email, &q.email)
}

fn unique_id_and_email(m: &Member, q: &MemberQuery) -> bool {
    same(&m.unique_id, &q.unique_id) && same(&m.email, &q.email)
}

fn member_id_only(m: &Member, q: &MemberQuery) -> bool {
    same(&m.member_id, &q.member_id)
}

fn describe(query: &MemberQuery) -> String {
    let parts: Vec<String> = [
        ("memberId", &query.member_id),
        ("email", &query.email),
        ("uniqueId", &query.unique_id),
    ]
    .into_iter()
    .filter(|(_, v)| !v.trim().is_empty())
    .map(|(k, v)| format!("{k}={}", v.trim()))
    .collect();

    if parts.is_empty() {
        "no identifiers".to_string()
    } else {
        parts.join(", ")
    }
}

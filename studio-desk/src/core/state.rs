//! Roster store
//!
//! The in-memory roster the desk works against. All mutation goes through
//! [`RosterStore::dispatch`], which applies a [`RosterAction`] and bumps the
//! revision so observers can tell a stale snapshot from a fresh one.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use shared::models::{Annotation, Member, MemberDraft};
use shared::util::synthetic_member_id;

#[derive(Debug, Clone)]
pub enum RosterAction {
    /// Replace the roster with a freshly loaded member list.
    /// Local members missing from the new list are kept.
    Replace(Vec<Member>),
    /// Append a member created at the desk under a synthetic ID
    AddMember(MemberDraft),
    SetAnnotation {
        member_id: String,
        annotation: Annotation,
    },
}

/// What a dispatched action changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterChange {
    Replaced { members: usize },
    Added { member_id: String },
    Annotated { member_id: String },
    /// Action referenced a member that is not in the roster
    Unchanged,
}

/// Pure reducer over the member list
pub fn reduce(members: &mut Vec<Member>, action: RosterAction) -> RosterChange {
    match action {
        RosterAction::Replace(incoming) => {
            let local: Vec<Member> = members
                .drain(..)
                .filter(|m| m.is_local() && !incoming.iter().any(|n| n.member_id == m.member_id))
                .collect();
            *members = incoming;
            members.extend(local);
            RosterChange::Replaced {
                members: members.len(),
            }
        }
        RosterAction::AddMember(draft) => {
            let member = draft.into_member(synthetic_member_id());
            let member_id = member.member_id.clone();
            members.push(member);
            RosterChange::Added { member_id }
        }
        RosterAction::SetAnnotation {
            member_id,
            annotation,
        } => match members.iter_mut().find(|m| m.member_id == member_id) {
            Some(member) => {
                member.annotation = annotation;
                RosterChange::Annotated { member_id }
            }
            None => RosterChange::Unchanged,
        },
    }
}

#[derive(Debug, Default)]
pub struct RosterStore {
    members: RwLock<Vec<Member>>,
    revision: AtomicU64,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, action: RosterAction) -> RosterChange {
        let change = {
            let mut members = self.members.write();
            reduce(&mut members, action)
        };
        if change != RosterChange::Unchanged {
            let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::debug!(revision, change = ?change, "Roster updated");
        }
        change
    }

    /// Snapshot of the roster in sheet order
    pub fn members(&self) -> Vec<Member> {
        self.members.read().clone()
    }

    pub fn get(&self, member_id: &str) -> Option<Member> {
        self.members
            .read()
            .iter()
            .find(|m| m.member_id == member_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    /// Incremented on every effective change
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}

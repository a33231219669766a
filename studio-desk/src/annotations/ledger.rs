//! Version ledger
//!
//! Holds every member's [`AnnotationRecord`] as loaded from the enhanced
//! sheet. History is append-only: a save or rollback pushes a new
//! [`AnnotationVersion`] and never touches earlier entries. Versions are
//! strictly increasing per member and never reused.

use shared::models::{
    AnnotationFields, AnnotationRecord, AnnotationVersion, ChangeType, Member, RecordStatus,
};
use sheet_client::Row;

use super::integrity;
use crate::utils::{DeskError, DeskResult};

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<AnnotationRecord>,
    /// Rows that failed to decode, written back untouched
    unreadable: Vec<Row>,
}

impl Ledger {
    pub fn new(records: Vec<AnnotationRecord>, unreadable: Vec<Row>) -> Self {
        Self {
            records,
            unreadable,
        }
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    pub fn unreadable(&self) -> &[Row] {
        &self.unreadable
    }

    pub fn find(&self, member_id: &str) -> Option<&AnnotationRecord> {
        self.records.iter().find(|r| r.member_id == member_id)
    }

    /// Versions for a member, oldest first; empty when never annotated
    pub fn history(&self, member_id: &str) -> &[AnnotationVersion] {
        self.find(member_id)
            .map(|r| r.history.as_slice())
            .unwrap_or_default()
    }

    /// Record a new version of `member`'s annotation
    pub fn save(
        &mut self,
        member: &Member,
        fields: AnnotationFields,
        associate: &str,
        now: i64,
    ) -> &AnnotationRecord {
        let change_type = if self.find(&member.member_id).is_some() {
            ChangeType::Update
        } else {
            ChangeType::Create
        };
        self.append(member, fields, associate, now, change_type, None)
    }

    /// Restore the content of `target` as a new version
    pub fn rollback(
        &mut self,
        member: &Member,
        target: u32,
        associate: &str,
        now: i64,
    ) -> DeskResult<&AnnotationRecord> {
        let fields = self
            .find(&member.member_id)
            .and_then(|r| r.find_version(target))
            .map(|v| v.fields.clone())
            .ok_or_else(|| DeskError::VersionNotFound {
                member_id: member.member_id.clone(),
                version: target,
            })?;

        Ok(self.append(
            member,
            fields,
            associate,
            now,
            ChangeType::Rollback,
            Some(target),
        ))
    }

    fn append(
        &mut self,
        member: &Member,
        fields: AnnotationFields,
        associate: &str,
        now: i64,
        change_type: ChangeType,
        restored_from: Option<u32>,
    ) -> &AnnotationRecord {
        // Stored in the form the sheet gives back, so the checksum holds on re-read
        let fields = fields.normalized();
        let associate = associate.trim();
        let index = match self
            .records
            .iter()
            .position(|r| r.member_id == member.member_id)
        {
            Some(index) => index,
            None => {
                self.records.push(AnnotationRecord {
                    member_id: member.member_id.clone(),
                    email: member.email.trim().to_string(),
                    unique_id: member.unique_id.trim().to_string(),
                    first_name: member.first_name.trim().to_string(),
                    last_name: member.last_name.trim().to_string(),
                    current: AnnotationFields::default(),
                    current_version: 0,
                    created_at: now,
                    updated_at: now,
                    created_by: associate.to_string(),
                    updated_by: associate.to_string(),
                    history: Vec::new(),
                    checksum: String::new(),
                    last_verified: None,
                    status: RecordStatus::Active,
                });
                self.records.len() - 1
            }
        };

        let record = &mut self.records[index];
        let previous = record.current_version.max(
            record.history.last().map(|v| v.version).unwrap_or(0),
        );
        let version = previous + 1;

        record.history.push(AnnotationVersion {
            version,
            timestamp: now,
            associate: associate.to_string(),
            fields: fields.clone(),
            change_type,
            previous_version: (previous > 0).then_some(previous),
            restored_from,
        });

        // Identity follows the roster so a resolved mismatch does not recur
        record.email = member.email.trim().to_string();
        record.unique_id = member.unique_id.trim().to_string();
        record.first_name = member.first_name.trim().to_string();
        record.last_name = member.last_name.trim().to_string();
        record.current = fields;
        record.current_version = version;
        record.updated_at = now;
        record.updated_by = associate.to_string();
        record.checksum = integrity::record_checksum(record);
        record.last_verified = Some(now);
        record.status = RecordStatus::Active;

        tracing::debug!(
            member_id = %record.member_id,
            version,
            change = ?change_type,
            "Appended annotation version"
        );
        record
    }
}

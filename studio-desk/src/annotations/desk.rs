//! Annotation desk
//!
//! Orchestrates one staff action end to end: resolve the member, read the
//! stored record fresh from the sheet, detect conflicts, append a version,
//! persist both annotation sheets, update the roster, then re-read and
//! verify what was written.

use std::sync::Arc;

use serde::Serialize;
use shared::models::{
    Annotation, AnnotationFields, AnnotationRecord, AnnotationVersion, ConflictResolution,
    MemberDraft, RecordStatus,
};
use sheet_client::RowStore;

use super::codec::PlainAnnotation;
use super::conflict::ConflictDetector;
use super::integrity;
use super::ledger::Ledger;
use super::merge::merge;
use super::repository::{AnnotationRepository, SheetNames};
use crate::core::{Config, RosterAction, RosterChange, RosterStore};
use crate::members::{MemberQuery, resolve};
use crate::utils::{Clock, DeskError, DeskResult, RetryPolicy, SystemClock};

/// A staff edit of one member's annotation
#[derive(Debug, Clone)]
pub struct AnnotationEdit {
    pub member: MemberQuery,
    pub fields: AnnotationFields,
    pub associate: String,
}

impl AnnotationEdit {
    pub fn new(member: MemberQuery, fields: AnnotationFields, associate: impl Into<String>) -> Self {
        Self {
            member,
            fields,
            associate: associate.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub member_id: String,
    pub version: u32,
    pub checksum: String,
    /// Re-read after the write returned the same version and a valid checksum
    pub verified: bool,
    /// The plain sheet carries this version too
    pub mirrored: bool,
    pub merged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(SaveReceipt),
    /// Staff chose not to save; nothing was written
    Cancelled,
}

impl SaveOutcome {
    pub fn receipt(&self) -> Option<&SaveReceipt> {
        match self {
            Self::Saved(receipt) => Some(receipt),
            Self::Cancelled => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub members: usize,
    /// Members annotated from a valid versioned record
    pub versioned: usize,
    /// Members annotated from the plain sheet
    pub plain: usize,
    /// Members whose versioned record failed validation
    pub corrupted: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub checked: usize,
    pub valid: usize,
    pub corrupted: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.corrupted.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct AnnotationDesk {
    repo: AnnotationRepository,
    roster: Arc<RosterStore>,
    detector: ConflictDetector,
    clock: Arc<dyn Clock>,
}

impl AnnotationDesk {
    pub fn new(
        repo: AnnotationRepository,
        roster: Arc<RosterStore>,
        detector: ConflictDetector,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            roster,
            detector,
            clock,
        }
    }

    /// Desk wired from configuration, on the wall clock
    pub fn from_config(config: &Config, store: Arc<dyn RowStore>) -> Self {
        Self::new(
            AnnotationRepository::new(store, config.sheets.clone(), config.retry_policy()),
            Arc::new(RosterStore::new()),
            ConflictDetector::new(config.conflict_window()),
            Arc::new(SystemClock),
        )
    }

    /// Desk with default sheets, window and retry policy
    pub fn with_store(store: Arc<dyn RowStore>, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            AnnotationRepository::new(store, SheetNames::default(), RetryPolicy::default()),
            Arc::new(RosterStore::new()),
            ConflictDetector::default(),
            clock,
        )
    }

    pub fn roster(&self) -> &Arc<RosterStore> {
        &self.roster
    }

    pub fn repository(&self) -> &AnnotationRepository {
        &self.repo
    }

    /// Load the roster and attach each member's annotation.
    ///
    /// A valid versioned record wins; a corrupted or missing one falls back
    /// to the plain sheet.
    pub async fn load(&self) -> DeskResult<LoadReport> {
        let mut members = self.repo.load_members().await?;
        let plain = self.repo.load_plain().await?;
        let loaded = self.repo.load_ledger().await?;

        let mut report = LoadReport {
            members: members.len(),
            corrupted: loaded.corrupted.clone(),
            ..Default::default()
        };

        for member in &mut members {
            let record = loaded
                .ledger
                .find(&member.member_id)
                .filter(|r| r.status == RecordStatus::Active);
            if let Some(record) = record {
                member.annotation = record.to_annotation();
                report.versioned += 1;
            } else if let Some(p) = plain.iter().find(|p| p.member_id == member.member_id) {
                if loaded.corrupted.contains(&member.member_id) {
                    tracing::warn!(
                        member_id = %member.member_id,
                        "Using plain annotation in place of corrupted record"
                    );
                }
                member.annotation = p.to_annotation();
                report.plain += 1;
            }
        }

        self.roster.dispatch(RosterAction::Replace(members));
        tracing::info!(
            members = report.members,
            versioned = report.versioned,
            plain = report.plain,
            corrupted = report.corrupted.len(),
            "Roster loaded"
        );
        Ok(report)
    }

    /// Create a member at the desk; returns its synthetic ID
    pub fn add_member(&self, draft: MemberDraft) -> Option<String> {
        match self.roster.dispatch(RosterAction::AddMember(draft)) {
            RosterChange::Added { member_id } => {
                tracing::info!(member_id = %member_id, "Local member created");
                Some(member_id)
            }
            _ => None,
        }
    }

    /// Save an edit; any conflict blocks it with [`DeskError::Conflict`]
    pub async fn save(&self, edit: AnnotationEdit) -> DeskResult<SaveOutcome> {
        self.save_inner(edit, None).await
    }

    /// Save after staff picked a resolution for reported conflicts
    pub async fn save_with(
        &self,
        edit: AnnotationEdit,
        resolution: ConflictResolution,
    ) -> DeskResult<SaveOutcome> {
        self.save_inner(edit, Some(resolution)).await
    }

    async fn save_inner(
        &self,
        edit: AnnotationEdit,
        resolution: Option<ConflictResolution>,
    ) -> DeskResult<SaveOutcome> {
        let members = self.roster.members();
        let member = resolve(&members, &edit.member)?.member.clone();

        if resolution == Some(ConflictResolution::Cancel) {
            tracing::info!(member_id = %member.member_id, "Save cancelled");
            return Ok(SaveOutcome::Cancelled);
        }

        let mut loaded = self.repo.load_ledger().await?;
        let now = self.clock.now_millis();
        let stored = loaded.ledger.find(&member.member_id);

        let mut merged = false;
        let fields = match resolution {
            None => {
                let conflicts = self.detector.detect(&member, stored, now);
                if !conflicts.is_empty() {
                    return Err(DeskError::Conflict(conflicts));
                }
                edit.fields
            }
            Some(ConflictResolution::Merge) => match stored {
                Some(record) => {
                    merged = true;
                    merge(&record.current, &edit.fields)
                }
                None => edit.fields,
            },
            Some(ConflictResolution::Overwrite | ConflictResolution::Cancel) => edit.fields,
        };

        let record = loaded
            .ledger
            .save(&member, fields, &edit.associate, now)
            .clone();
        let receipt = self.persist(&loaded.ledger, &record, merged).await?;

        tracing::info!(
            member_id = %receipt.member_id,
            version = receipt.version,
            associate = %edit.associate,
            merged,
            verified = receipt.verified,
            "Annotation saved"
        );
        Ok(SaveOutcome::Saved(receipt))
    }

    /// Restore version `target` of a member's annotation as a new version
    pub async fn rollback(
        &self,
        member_id: &str,
        target: u32,
        associate: &str,
    ) -> DeskResult<SaveReceipt> {
        let members = self.roster.members();
        let member = resolve(&members, &MemberQuery::by_member_id(member_id))?
            .member
            .clone();

        let mut loaded = self.repo.load_ledger().await?;
        let now = self.clock.now_millis();
        let record = loaded
            .ledger
            .rollback(&member, target, associate, now)?
            .clone();
        let receipt = self.persist(&loaded.ledger, &record, false).await?;

        tracing::info!(
            member_id = %receipt.member_id,
            version = receipt.version,
            restored_from = target,
            associate,
            "Annotation rolled back"
        );
        Ok(receipt)
    }

    /// Version history, oldest first, read fresh from the sheet
    pub async fn history(&self, member_id: &str) -> DeskResult<Vec<AnnotationVersion>> {
        let loaded = self.repo.load_ledger().await?;
        Ok(loaded.ledger.history(member_id).to_vec())
    }

    /// The stored record for a member, only if its checksum holds
    pub async fn verified_record(&self, member_id: &str) -> DeskResult<AnnotationRecord> {
        let loaded = self.repo.load_ledger().await?;
        match loaded.ledger.find(member_id) {
            Some(record) if record.status == RecordStatus::Active => Ok(record.clone()),
            Some(_) => Err(DeskError::IntegrityFailure {
                member_id: member_id.to_string(),
            }),
            None if loaded.corrupted.iter().any(|id| id == member_id) => {
                Err(DeskError::IntegrityFailure {
                    member_id: member_id.to_string(),
                })
            }
            None => Err(DeskError::NotFound(format!("annotation record for {member_id}"))),
        }
    }

    /// Validate every stored record's checksum
    pub async fn verify_all(&self) -> DeskResult<IntegrityReport> {
        let loaded = self.repo.load_ledger().await?;
        let checked = loaded.ledger.records().len() + loaded.ledger.unreadable().len();
        let report = IntegrityReport {
            checked,
            valid: checked.saturating_sub(loaded.corrupted.len()),
            corrupted: loaded.corrupted,
        };
        if report.is_clean() {
            tracing::info!(checked = report.checked, "All annotation records valid");
        } else {
            tracing::warn!(
                checked = report.checked,
                corrupted = report.corrupted.len(),
                "Annotation records failed validation"
            );
        }
        Ok(report)
    }

    /// Write both sheets, refresh the roster, then verify by re-reading.
    ///
    /// The versioned write is the commit point. A failed plain-sheet mirror
    /// after it leaves the save standing with `mirrored: false`.
    async fn persist(
        &self,
        ledger: &Ledger,
        record: &AnnotationRecord,
        merged: bool,
    ) -> DeskResult<SaveReceipt> {
        self.repo.write_ledger(ledger).await?;

        let mirrored = match self.mirror_plain(record).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    member_id = %record.member_id,
                    version = record.current_version,
                    error = %e,
                    "Plain sheet mirror failed after versioned save"
                );
                false
            }
        };

        self.roster.dispatch(RosterAction::SetAnnotation {
            member_id: record.member_id.clone(),
            annotation: record.to_annotation(),
        });

        let verified = self.verify_written(record).await;
        Ok(SaveReceipt {
            member_id: record.member_id.clone(),
            version: record.current_version,
            checksum: record.checksum.clone(),
            verified,
            mirrored,
            merged,
        })
    }

    async fn mirror_plain(&self, record: &AnnotationRecord) -> DeskResult<()> {
        let mut plain = self.repo.load_plain().await?;
        let mirror = PlainAnnotation::from_record(record);
        match plain.iter_mut().find(|p| p.member_id == record.member_id) {
            Some(existing) => *existing = mirror,
            None => plain.push(mirror),
        }
        self.repo.write_plain(&plain).await
    }

    /// The write already succeeded, so a failed check is reported, not raised
    async fn verify_written(&self, expected: &AnnotationRecord) -> bool {
        let loaded = match self.repo.load_ledger().await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(member_id = %expected.member_id, error = %e, "Could not re-read after save");
                return false;
            }
        };

        let ok = loaded.ledger.find(&expected.member_id).is_some_and(|r| {
            r.current_version == expected.current_version && integrity::validate(r)
        });
        if !ok {
            tracing::warn!(
                member_id = %expected.member_id,
                version = expected.current_version,
                "Saved annotation did not verify on re-read"
            );
        }
        ok
    }

    /// Roster annotation for a member, if loaded
    pub fn annotation(&self, member_id: &str) -> Option<Annotation> {
        self.roster.get(member_id).map(|m| m.annotation)
    }
}

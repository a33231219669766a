//! Sheet-backed repository
//!
//! Reads and writes the members, plain annotations and enhanced annotations
//! sheets through a [`RowStore`]. Every store call goes through the retry
//! policy. Writes are full-sheet overwrites.

use std::sync::Arc;

use shared::models::{Member, RecordStatus};
use sheet_client::{Row, RowStore};

use super::codec::{self, ENHANCED_HEADER, PlainAnnotation};
use super::integrity;
use super::ledger::Ledger;
use crate::utils::{DeskResult, RetryPolicy};

/// Sheet (tab) names inside the spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    pub members: String,
    pub annotations: String,
    pub enhanced: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            members: "Members".into(),
            annotations: "Annotations".into(),
            enhanced: "EnhancedAnnotations".into(),
        }
    }
}

/// Enhanced sheet as loaded, with the checksum verdicts
#[derive(Debug, Clone, Default)]
pub struct LoadedLedger {
    pub ledger: Ledger,
    /// Members whose record failed checksum validation
    pub corrupted: Vec<String>,
}

#[derive(Clone)]
pub struct AnnotationRepository {
    store: Arc<dyn RowStore>,
    sheets: SheetNames,
    retry: RetryPolicy,
}

impl std::fmt::Debug for AnnotationRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationRepository")
            .field("sheets", &self.sheets)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl AnnotationRepository {
    pub fn new(store: Arc<dyn RowStore>, sheets: SheetNames, retry: RetryPolicy) -> Self {
        Self {
            store,
            sheets,
            retry,
        }
    }

    pub fn sheets(&self) -> &SheetNames {
        &self.sheets
    }

    async fn fetch(&self, sheet: &str) -> DeskResult<Vec<Row>> {
        let store = &self.store;
        self.retry
            .run(&format!("fetch {sheet}"), || store.fetch_rows(sheet))
            .await
    }

    async fn write(&self, sheet: &str, rows: &[Row]) -> DeskResult<()> {
        let store = &self.store;
        self.retry
            .run(&format!("write {sheet}"), || store.write_rows(sheet, rows))
            .await
    }

    pub async fn load_members(&self) -> DeskResult<Vec<Member>> {
        let rows = self.fetch(&self.sheets.members).await?;
        Ok(codec::decode_members(&rows))
    }

    pub async fn load_plain(&self) -> DeskResult<Vec<PlainAnnotation>> {
        let rows = self.fetch(&self.sheets.annotations).await?;
        Ok(codec::decode_plain_rows(&rows))
    }

    /// Load the enhanced sheet.
    ///
    /// Undecodable rows are kept aside and written back verbatim. Records
    /// that fail checksum validation are marked corrupted rather than
    /// failing the load.
    pub async fn load_ledger(&self) -> DeskResult<LoadedLedger> {
        let sheet = self.sheets.enhanced.as_str();
        let rows = self.fetch(sheet).await?;

        let mut records = Vec::new();
        let mut unreadable = Vec::new();
        let mut corrupted = Vec::new();

        for row in codec::data_rows(&rows, &ENHANCED_HEADER) {
            match codec::decode_record(row, sheet) {
                Ok(mut record) => {
                    if !integrity::validate(&record) {
                        record.status = RecordStatus::Corrupted;
                        corrupted.push(record.member_id.clone());
                    }
                    records.push(record);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Unreadable annotation row, preserving as-is");
                    if let Some(member_id) = row.first().map(|c| c.trim()).filter(|c| !c.is_empty())
                    {
                        corrupted.push(member_id.to_string());
                    }
                    unreadable.push(row.clone());
                }
            }
        }

        Ok(LoadedLedger {
            ledger: Ledger::new(records, unreadable),
            corrupted,
        })
    }

    /// Overwrite the enhanced sheet with the ledger
    pub async fn write_ledger(&self, ledger: &Ledger) -> DeskResult<()> {
        let mut rows = Vec::with_capacity(ledger.records().len() + ledger.unreadable().len() + 1);
        rows.push(codec::header_row(&ENHANCED_HEADER));
        for record in ledger.records() {
            rows.push(codec::encode_record(record)?);
        }
        rows.extend(ledger.unreadable().iter().cloned());

        self.write(&self.sheets.enhanced, &rows).await
    }

    /// Overwrite the plain annotations sheet
    pub async fn write_plain(&self, plain: &[PlainAnnotation]) -> DeskResult<()> {
        let rows = codec::encode_plain_sheet(plain);
        self.write(&self.sheets.annotations, &rows).await
    }
}

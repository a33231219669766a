//! Row store abstraction
//!
//! Rows are the unit of storage and a full-range overwrite is the only
//! write primitive: no partial row updates, no transactions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{ClientError, ClientResult};

/// One spreadsheet row, cell values as text
pub type Row = Vec<String>;

/// Key-value row store (sheet name → rows)
#[async_trait]
pub trait RowStore: Send + Sync {
    /// All rows of a sheet, header included, in sheet order
    async fn fetch_rows(&self, sheet: &str) -> ClientResult<Vec<Row>>;

    /// Replace the whole sheet with `rows`
    async fn write_rows(&self, sheet: &str, rows: &[Row]) -> ClientResult<()>;
}

/// In-memory row store
///
/// Used by tests and offline runs. Failures can be injected to exercise
/// retry paths.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    sheets: RwLock<HashMap<String, Vec<Row>>>,
    failing_reads: AtomicU32,
    failing_writes: AtomicU32,
    writes: AtomicU32,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a sheet
    pub fn with_sheet(self, sheet: impl Into<String>, rows: Vec<Row>) -> Self {
        self.sheets.write().insert(sheet.into(), rows);
        self
    }

    /// Replace a sheet directly, bypassing failure injection
    pub fn set_rows(&self, sheet: &str, rows: Vec<Row>) {
        self.sheets.write().insert(sheet.to_string(), rows);
    }

    /// Current contents of a sheet
    pub fn rows(&self, sheet: &str) -> Vec<Row> {
        self.sheets.read().get(sheet).cloned().unwrap_or_default()
    }

    /// Make the next `n` reads fail
    pub fn fail_next_reads(&self, n: u32) {
        self.failing_reads.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` writes fail
    pub fn fail_next_writes(&self, n: u32) {
        self.failing_writes.store(n, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn fetch_rows(&self, sheet: &str) -> ClientResult<Vec<Row>> {
        if Self::take_failure(&self.failing_reads) {
            return Err(ClientError::Internal(format!("injected read failure on {sheet}")));
        }
        Ok(self.rows(sheet))
    }

    async fn write_rows(&self, sheet: &str, rows: &[Row]) -> ClientResult<()> {
        if Self::take_failure(&self.failing_writes) {
            return Err(ClientError::Internal(format!("injected write failure on {sheet}")));
        }
        self.sheets.write().insert(sheet.to_string(), rows.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_missing_sheet_is_empty() {
        let store = MemoryRowStore::new();
        assert!(store.fetch_rows("Nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_overwrites_whole_sheet() {
        let store = MemoryRowStore::new().with_sheet(
            "Annotations",
            vec![row(&["a"]), row(&["b"]), row(&["c"])],
        );
        store.write_rows("Annotations", &[row(&["x"])]).await.unwrap();
        assert_eq!(store.fetch_rows("Annotations").await.unwrap(), vec![row(&["x"])]);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let store = MemoryRowStore::new();
        store.fail_next_writes(2);

        assert!(store.write_rows("S", &[row(&["1"])]).await.is_err());
        assert!(store.write_rows("S", &[row(&["2"])]).await.is_err());
        store.write_rows("S", &[row(&["3"])]).await.unwrap();

        assert_eq!(store.rows("S"), vec![row(&["3"])]);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_read_failure() {
        let store = MemoryRowStore::new().with_sheet("S", vec![row(&["1"])]);
        store.fail_next_reads(1);
        assert!(matches!(
            store.fetch_rows("S").await,
            Err(ClientError::Internal(_))
        ));
        assert_eq!(store.fetch_rows("S").await.unwrap().len(), 1);
    }
}

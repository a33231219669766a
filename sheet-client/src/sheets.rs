//! Spreadsheet-backed row store

use async_trait::async_trait;

use crate::http::sheet_range;
use crate::store::{Row, RowStore};
use crate::{ClientResult, SheetsHttpClient};

/// [`RowStore`] over one spreadsheet; each sheet (tab) is a row collection
#[derive(Debug, Clone)]
pub struct SheetsRowStore {
    http: SheetsHttpClient,
}

impl SheetsRowStore {
    pub fn new(http: SheetsHttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &SheetsHttpClient {
        &self.http
    }
}

#[async_trait]
impl RowStore for SheetsRowStore {
    async fn fetch_rows(&self, sheet: &str) -> ClientResult<Vec<Row>> {
        let rows = self.http.get_values(&sheet_range(sheet)).await?;
        tracing::debug!(sheet, rows = rows.len(), "Fetched sheet");
        Ok(rows)
    }

    async fn write_rows(&self, sheet: &str, rows: &[Row]) -> ClientResult<()> {
        let range = sheet_range(sheet);
        // Clear first so rows beyond the new length do not survive
        self.http.clear_values(&range).await?;
        self.http.update_values(&range, rows).await?;
        tracing::debug!(sheet, rows = rows.len(), "Overwrote sheet");
        Ok(())
    }
}

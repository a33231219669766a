//! HTTP client for the Sheets v4 `values` API

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::TokenProvider;
use crate::{ClientError, ClientResult};

/// Body of a `values` read or write
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Absent when the range is empty
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// HTTP client bound to one spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsHttpClient {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SheetsHttpClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}`
    fn values_url(&self, range: &str, suffix: &str) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL: {e}")))?;
        let target = format!("{range}{suffix}");
        url.path_segments_mut()
            .map_err(|_| ClientError::Config("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                target.as_str(),
            ]);
        Ok(url)
    }

    /// Send with a bearer token; on 401 drop the cached token and try once more
    async fn send_authorized<T, F>(&self, build: F) -> ClientResult<T>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let token = self.tokens.bearer_token().await?;
        let response = build(&self.client).bearer_auth(token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("Access token rejected, refreshing");
            self.tokens.invalidate();
            let token = self.tokens.bearer_token().await?;
            let response = build(&self.client).bearer_auth(token).send().await?;
            return Self::handle_response(response).await;
        }

        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Internal(format!("{status}: {text}"))),
            };
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidResponse(format!("{e}")))
    }

    /// Read every cell of a range as strings (rows may be ragged)
    pub async fn get_values(&self, range: &str) -> ClientResult<Vec<Vec<String>>> {
        let url = self.values_url(range, "")?;
        let body: ValueRange = self.send_authorized(|c| c.get(url.clone())).await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Clear every cell of a range
    pub async fn clear_values(&self, range: &str) -> ClientResult<()> {
        let url = self.values_url(range, ":clear")?;
        let _: Value = self
            .send_authorized(|c| c.post(url.clone()).json(&serde_json::json!({})))
            .await?;
        Ok(())
    }

    /// Write rows starting at the top-left of a range, values taken verbatim
    pub async fn update_values(&self, range: &str, rows: &[Vec<String>]) -> ClientResult<()> {
        let url = self.values_url(range, "")?;
        let body = ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values: rows
                .iter()
                .map(|row| row.iter().cloned().map(Value::String).collect())
                .collect(),
        };
        let _: Value = self
            .send_authorized(|c| {
                c.put(url.clone())
                    .query(&[("valueInputOption", "RAW")])
                    .json(&body)
            })
            .await?;
        Ok(())
    }
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A1 range covering a whole sheet; titles with spaces or punctuation are quoted
pub fn sheet_range(sheet: &str) -> String {
    if !sheet.is_empty() && sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;

    fn client(base: &str) -> SheetsHttpClient {
        SheetsHttpClient::new(
            Client::new(),
            base,
            "sheet-123",
            Arc::new(StaticTokenProvider::new("t")),
        )
    }

    #[test]
    fn test_values_url() {
        let url = client("https://sheets.googleapis.com")
            .values_url("Members", "")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/Members"
        );
    }

    #[test]
    fn test_values_url_clear_with_trailing_slash_base() {
        let url = client("http://127.0.0.1:9000/")
            .values_url("Members", ":clear")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/v4/spreadsheets/sheet-123/values/Members:clear"
        );
    }

    #[test]
    fn test_sheet_range_quoting() {
        assert_eq!(sheet_range("Members"), "Members");
        assert_eq!(sheet_range("Front Desk"), "'Front Desk'");
        assert_eq!(sheet_range("Bob's"), "'Bob''s'");
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(Value::from("a")), "a");
        assert_eq!(cell_to_string(Value::from(3)), "3");
        assert_eq!(cell_to_string(Value::Bool(true)), "true");
        assert_eq!(cell_to_string(Value::Null), "");
    }
}

//! Client configuration

use std::sync::Arc;

use crate::auth::{OAuthRefreshProvider, StaticTokenProvider, TokenProvider};
use crate::{ClientError, ClientResult, SheetsHttpClient, SheetsRowStore};

/// Default Sheets API host
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

/// Default OAuth2 token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth2 refresh-token credentials
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Configuration for talking to one spreadsheet
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "https://sheets.googleapis.com")
    pub base_url: String,

    /// Spreadsheet the row store reads and writes
    pub spreadsheet_id: String,

    /// OAuth2 token endpoint
    pub token_url: String,

    /// Refresh-token credentials
    pub oauth: Option<OAuthCredentials>,

    /// Fixed bearer token, used when no OAuth credentials are set
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new configuration for a spreadsheet
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            oauth: None,
            token: None,
            timeout: 30,
        }
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the token endpoint
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Use the OAuth2 refresh-token flow
    pub fn with_oauth(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        self.oauth = Some(OAuthCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        });
        self
    }

    /// Use a fixed bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Build the underlying reqwest client
    pub fn build_reqwest(&self) -> ClientResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout))
            .build()
            .map_err(Into::into)
    }

    /// Token provider for this configuration (OAuth wins over a fixed token)
    pub fn build_token_provider(
        &self,
        client: reqwest::Client,
    ) -> ClientResult<Arc<dyn TokenProvider>> {
        if let Some(oauth) = &self.oauth {
            return Ok(Arc::new(OAuthRefreshProvider::new(
                client,
                self.token_url.clone(),
                oauth.clone(),
            )));
        }
        match &self.token {
            Some(token) => Ok(Arc::new(StaticTokenProvider::new(token.clone()))),
            None => Err(ClientError::Config(
                "either OAuth credentials or a bearer token is required".to_string(),
            )),
        }
    }

    /// Create a Sheets HTTP client from this configuration
    pub fn build_http_client(&self) -> ClientResult<SheetsHttpClient> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ClientError::Config("spreadsheet id is empty".to_string()));
        }
        let client = self.build_reqwest()?;
        let tokens = self.build_token_provider(client.clone())?;
        Ok(SheetsHttpClient::new(
            client,
            self.base_url.clone(),
            self.spreadsheet_id.clone(),
            tokens,
        ))
    }

    /// Create a row store backed by the spreadsheet
    pub fn build_row_store(&self) -> ClientResult<SheetsRowStore> {
        Ok(SheetsRowStore::new(self.build_http_client()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("sheet-1");
        assert_eq!(config.base_url, DEFAULT_SHEETS_BASE_URL);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.timeout, 30);
        assert!(config.oauth.is_none());
    }

    #[test]
    fn test_requires_credentials() {
        let err = ClientConfig::new("sheet-1").build_http_client().unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_requires_spreadsheet_id() {
        let err = ClientConfig::new(" ")
            .with_token("t")
            .build_http_client()
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_builds_with_static_token() {
        let client = ClientConfig::new("sheet-1")
            .with_token("t")
            .with_timeout(5)
            .build_http_client()
            .unwrap();
        assert_eq!(client.spreadsheet_id(), "sheet-1");
    }
}

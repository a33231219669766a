//! Desk configuration
//!
//! Loaded once at startup from the environment (after `.env`, see
//! [`setup_environment`](crate::setup_environment)). Everything except the
//! sheet credentials has a default.

use std::time::Duration;

use sheet_client::ClientConfig;
use sheet_client::config::{DEFAULT_SHEETS_BASE_URL, DEFAULT_TOKEN_URL};

use crate::annotations::SheetNames;
use crate::utils::{DeskError, DeskResult, RetryPolicy};

/// Desk configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | SHEETS_SPREADSHEET_ID | (required) | Spreadsheet holding all sheets |
/// | SHEETS_API_BASE | https://sheets.googleapis.com | Sheets API base |
/// | OAUTH_TOKEN_URL | https://oauth2.googleapis.com/token | Token endpoint |
/// | OAUTH_CLIENT_ID / OAUTH_CLIENT_SECRET / OAUTH_REFRESH_TOKEN | - | Refresh-token credentials |
/// | MEMBERS_SHEET | Members | Member roster sheet |
/// | ANNOTATIONS_SHEET | Annotations | Plain annotations sheet |
/// | ENHANCED_SHEET | EnhancedAnnotations | Versioned annotations sheet |
/// | CONFLICT_WINDOW_MINUTES | 5 | Concurrent-edit window |
/// | SAVE_MAX_RETRIES | 3 | Retries after a failed store call |
/// | SAVE_RETRY_BASE_MS | 1000 | Linear backoff step |
/// | REQUEST_TIMEOUT_SECS | 30 | HTTP timeout |
/// | LOG_LEVEL | info | Log filter |
/// | LOG_DIR | - | Daily log files, when the directory exists |
///
/// # Example
///
/// ```ignore
/// SHEETS_SPREADSHEET_ID=1AbC OAUTH_REFRESH_TOKEN=... cargo run -p studio-desk
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub spreadsheet_id: String,
    pub sheets_api_base: String,
    pub token_url: String,
    pub oauth_client_id: Option<String>,
    pub oauth_client_secret: Option<String>,
    pub oauth_refresh_token: Option<String>,
    pub sheets: SheetNames,
    pub conflict_window_minutes: u64,
    pub save_max_retries: u32,
    pub save_retry_base_ms: u64,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_string(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = SheetNames::default();
        Self {
            spreadsheet_id: env_string("SHEETS_SPREADSHEET_ID").unwrap_or_default(),
            sheets_api_base: env_string("SHEETS_API_BASE")
                .unwrap_or_else(|| DEFAULT_SHEETS_BASE_URL.into()),
            token_url: env_string("OAUTH_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.into()),
            oauth_client_id: env_string("OAUTH_CLIENT_ID"),
            oauth_client_secret: env_string("OAUTH_CLIENT_SECRET"),
            oauth_refresh_token: env_string("OAUTH_REFRESH_TOKEN"),
            sheets: SheetNames {
                members: env_string("MEMBERS_SHEET").unwrap_or(defaults.members),
                annotations: env_string("ANNOTATIONS_SHEET").unwrap_or(defaults.annotations),
                enhanced: env_string("ENHANCED_SHEET").unwrap_or(defaults.enhanced),
            },
            conflict_window_minutes: env_parse("CONFLICT_WINDOW_MINUTES", 5),
            save_max_retries: env_parse("SAVE_MAX_RETRIES", 3),
            save_retry_base_ms: env_parse("SAVE_RETRY_BASE_MS", 1000),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            log_level: env_string("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: env_string("LOG_DIR"),
        }
    }

    /// Configuration for a given spreadsheet with every other value defaulted
    pub fn for_spreadsheet(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheets_api_base: DEFAULT_SHEETS_BASE_URL.into(),
            token_url: DEFAULT_TOKEN_URL.into(),
            oauth_client_id: None,
            oauth_client_secret: None,
            oauth_refresh_token: None,
            sheets: SheetNames::default(),
            conflict_window_minutes: 5,
            save_max_retries: 3,
            save_retry_base_ms: 1000,
            request_timeout_secs: 30,
            log_level: "info".into(),
            log_dir: None,
        }
    }

    pub fn conflict_window(&self) -> Duration {
        Duration::from_secs(self.conflict_window_minutes * 60)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.save_max_retries,
            Duration::from_millis(self.save_retry_base_ms),
        )
    }

    /// Sheet client settings; OAuth credentials must be complete
    pub fn client_config(&self) -> DeskResult<ClientConfig> {
        if self.spreadsheet_id.is_empty() {
            return Err(DeskError::Config("SHEETS_SPREADSHEET_ID is not set".into()));
        }

        let config = ClientConfig::new(&self.spreadsheet_id)
            .with_base_url(&self.sheets_api_base)
            .with_token_url(&self.token_url)
            .with_timeout(self.request_timeout_secs);

        match (
            &self.oauth_client_id,
            &self.oauth_client_secret,
            &self.oauth_refresh_token,
        ) {
            (Some(id), Some(secret), Some(refresh)) => Ok(config.with_oauth(id, secret, refresh)),
            _ => Err(DeskError::Config(
                "OAUTH_CLIENT_ID, OAUTH_CLIENT_SECRET and OAUTH_REFRESH_TOKEN are required".into(),
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

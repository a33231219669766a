//! Bearer token providers
//!
//! The row store attaches `Authorization: Bearer <token>` to every call.
//! Tokens come either from a fixed value or from the OAuth2 refresh-token
//! grant, cached until shortly before they expire.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::config::OAuthCredentials;
use crate::{ClientError, ClientResult};

/// Refresh this long before the token endpoint says the token expires
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Used when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Source of bearer tokens for row store calls
#[async_trait]
pub trait TokenProvider: Send + Sync + fmt::Debug {
    /// A currently valid access token
    async fn bearer_token(&self) -> ClientResult<String>;

    /// Drop any cached token (called after the API answers 401)
    fn invalidate(&self) {}
}

/// Fixed token
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> ClientResult<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// OAuth2 refresh-token grant against a token endpoint
pub struct OAuthRefreshProvider {
    client: reqwest::Client,
    token_url: String,
    credentials: OAuthCredentials,
    cached: Mutex<Option<CachedToken>>,
}

impl OAuthRefreshProvider {
    pub fn new(client: reqwest::Client, token_url: String, credentials: OAuthCredentials) -> Self {
        Self {
            client,
            token_url,
            credentials,
            cached: Mutex::new(None),
        }
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self.cached.lock();
        guard
            .as_ref()
            .filter(|t| Instant::now() < t.refresh_at)
            .map(|t| t.access_token.clone())
    }

    async fn refresh(&self) -> ClientResult<CachedToken> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
        ];

        let response = self.client.post(&self.token_url).form(&form[..]).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            tracing::warn!(status = %status, "Token refresh rejected");
            return Err(ClientError::Auth(format!("{status}: {text}")));
        }

        let body: TokenResponse = response.json().await?;
        if body.access_token.is_empty() {
            return Err(ClientError::Auth("empty access token".to_string()));
        }

        let lifetime = Duration::from_secs(body.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS));
        tracing::debug!(expires_in = lifetime.as_secs(), "Access token refreshed");
        Ok(CachedToken {
            access_token: body.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }
}

impl fmt::Debug for OAuthRefreshProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthRefreshProvider")
            .field("token_url", &self.token_url)
            .field("client_id", &self.credentials.client_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for OAuthRefreshProvider {
    async fn bearer_token(&self) -> ClientResult<String> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }
        let fresh = self.refresh().await?;
        let token = fresh.access_token.clone();
        *self.cached.lock() = Some(fresh);
        Ok(token)
    }

    fn invalidate(&self) {
        *self.cached.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.bearer_token().await.unwrap(), "abc");
        provider.invalidate();
        assert_eq!(provider.bearer_token().await.unwrap(), "abc");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let provider = OAuthRefreshProvider::new(
            reqwest::Client::new(),
            "http://localhost/token".into(),
            OAuthCredentials {
                client_id: "id".into(),
                client_secret: "very-secret".into(),
                refresh_token: "refresh-me".into(),
            },
        );
        let text = format!("{provider:?}");
        assert!(text.contains("id"));
        assert!(!text.contains("very-secret"));
        assert!(!text.contains("refresh-me"));
    }

    #[test]
    fn test_cache_respects_refresh_deadline() {
        let provider = OAuthRefreshProvider::new(
            reqwest::Client::new(),
            "http://localhost/token".into(),
            OAuthCredentials {
                client_id: "id".into(),
                client_secret: "s".into(),
                refresh_token: "r".into(),
            },
        );
        *provider.cached.lock() = Some(CachedToken {
            access_token: "fresh".into(),
            refresh_at: Instant::now() + Duration::from_secs(30),
        });
        assert_eq!(provider.cached_token().as_deref(), Some("fresh"));

        provider.invalidate();
        assert_eq!(provider.cached_token(), None);
    }
}

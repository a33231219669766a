//! Sheet Client - row store over a spreadsheet
//!
//! Provides the persistence boundary for the annotation desk: a
//! [`RowStore`] trait, a Sheets-backed implementation authenticated with an
//! OAuth2 refresh token, and an in-memory implementation.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod sheets;
pub mod store;

pub use auth::{OAuthRefreshProvider, StaticTokenProvider, TokenProvider};
pub use config::{ClientConfig, OAuthCredentials};
pub use error::{ClientError, ClientResult};
pub use http::{SheetsHttpClient, ValueRange, sheet_range};
pub use sheets::SheetsRowStore;
pub use store::{MemoryRowStore, Row, RowStore};

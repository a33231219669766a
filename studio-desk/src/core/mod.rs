//! Core: configuration and the roster store
//!
//! - [`Config`] - desk configuration from the environment
//! - [`RosterStore`] - in-memory roster driven by [`RosterAction`]s

pub mod config;
pub mod state;

pub use config::Config;
pub use state::{RosterAction, RosterChange, RosterStore, reduce};

//! Member lookup

pub mod resolver;

pub use resolver::{MatchKind, MemberQuery, Resolved, resolve};

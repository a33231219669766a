//! Studio Desk - member annotations for the front desk
//!
//! Staff attach comments, notes and tags to members. Annotations are
//! versioned, checksummed and stored in a spreadsheet next to the member
//! roster.
//!
//! # Module structure
//!
//! ```text
//! studio-desk/src/
//! ├── core/          # configuration, roster store
//! ├── members/       # member resolution
//! ├── annotations/   # ledger, integrity, conflicts, sheet codecs, desk
//! └── utils/         # errors, logging, retry, clock
//! ```

pub mod annotations;
pub mod core;
pub mod members;
pub mod utils;

pub use annotations::{
    AnnotationDesk, AnnotationEdit, ConflictDetector, IntegrityReport, LoadReport, SaveOutcome,
    SaveReceipt, SheetNames,
};
pub use crate::core::{Config, RosterAction, RosterChange, RosterStore};
pub use members::{MatchKind, MemberQuery};
pub use utils::{Clock, DeskError, DeskResult, ManualClock, RetryPolicy, SystemClock};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` (if present) and initialize logging from the environment
pub fn setup_environment() -> Config {
    // Missing .env is fine; variables may come from the process environment
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    config
}

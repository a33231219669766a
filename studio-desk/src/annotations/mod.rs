//! Annotations: versioning, integrity, conflicts and persistence
//!
//! ```text
//! desk ──► resolver ──► repository ──► codec ──► RowStore
//!   │                      │
//!   ├─► conflict           └─► integrity
//!   ├─► merge
//!   └─► ledger ──► integrity
//! ```

pub mod codec;
pub mod conflict;
pub mod desk;
pub mod integrity;
pub mod ledger;
pub mod merge;
pub mod repository;

pub use conflict::{ConflictDetector, DEFAULT_CONFLICT_WINDOW};
pub use desk::{
    AnnotationDesk, AnnotationEdit, IntegrityReport, LoadReport, SaveOutcome, SaveReceipt,
};
pub use ledger::Ledger;
pub use merge::merge;
pub use repository::{AnnotationRepository, LoadedLedger, SheetNames};

//! Utilities: errors, logging, retry, time

pub mod clock;
pub mod error;
pub mod logger;
pub mod retry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{DeskError, DeskResult};
pub use retry::RetryPolicy;

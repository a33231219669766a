//! Conflict detection before a save

use std::time::Duration;

use shared::models::{AnnotationRecord, Conflict, Member};

pub const DEFAULT_CONFLICT_WINDOW: Duration = Duration::from_secs(5 * 60);

const MILLIS_PER_MINUTE: i64 = 60_000;

#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector {
    window_millis: i64,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CONFLICT_WINDOW)
    }
}

impl ConflictDetector {
    pub fn new(window: Duration) -> Self {
        Self {
            window_millis: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_millis as u64)
    }

    /// Conflicts between the member being edited and the stored record.
    ///
    /// A record saved less than one window ago (either side of `now`, to
    /// tolerate clock skew between desks) is a concurrent edit. A stored
    /// email that differs from the roster is a data mismatch; a blank stored
    /// email has nothing to compare and is ignored.
    pub fn detect(
        &self,
        member: &Member,
        stored: Option<&AnnotationRecord>,
        now: i64,
    ) -> Vec<Conflict> {
        let Some(stored) = stored else {
            return Vec::new();
        };
        let mut conflicts = Vec::new();

        let elapsed = now.saturating_sub(stored.updated_at);
        if elapsed.unsigned_abs() < self.window_millis.unsigned_abs() {
            conflicts.push(Conflict::ConcurrentEdit {
                edited_by: stored.updated_by.clone(),
                minutes_ago: round_minutes(elapsed.max(0)),
            });
        }

        let stored_email = stored.email.trim();
        let current_email = member.email.trim();
        if !stored_email.is_empty() && stored_email != current_email {
            conflicts.push(Conflict::DataMismatch {
                field: "email".into(),
                stored: stored_email.to_string(),
                current: current_email.to_string(),
            });
        }

        if !conflicts.is_empty() {
            tracing::info!(
                member_id = %member.member_id,
                conflicts = conflicts.len(),
                "Conflicts detected"
            );
        }
        conflicts
    }
}

/// Whole minutes, half rounding up
fn round_minutes(millis: i64) -> i64 {
    (millis + MILLIS_PER_MINUTE / 2) / MILLIS_PER_MINUTE
}

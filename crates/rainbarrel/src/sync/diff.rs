//! Candidate classification: decide per remote item whether to enrich or skip.

use chrono::Utc;

use crate::api::RaindropPayload;
use crate::entity::link;
use crate::entity::run_mode::RunMode;

/// What to do with a remote item this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Fetch content, tag, and persist.
    Enrich,
    /// Leave the stored record untouched.
    Skip,
}

/// Classify one remote item against its stored counterpart.
///
/// Full and reprocess modes make every item a candidate. Incremental mode
/// enriches unseen items and items whose remote last-modified timestamp is
/// strictly newer than the stored one; equal timestamps skip, and a record
/// with no stored timestamp is always treated as older.
#[must_use]
pub fn classify(
    mode: RunMode,
    remote: &RaindropPayload,
    existing: Option<&link::Model>,
) -> Decision {
    match mode {
        RunMode::Full | RunMode::Reprocess => Decision::Enrich,
        RunMode::Incremental => {
            let Some(existing) = existing else {
                return Decision::Enrich;
            };
            let Some(stored) = existing.updated_at else {
                return Decision::Enrich;
            };
            match remote.last_update {
                Some(remote_ts) if remote_ts > stored.with_timezone(&Utc) => Decision::Enrich,
                _ => Decision::Skip,
            }
        }
    }
}

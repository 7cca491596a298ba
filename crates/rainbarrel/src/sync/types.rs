//! Shared sync types and defaults.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::DEFAULT_PAGE_SIZE;
use crate::entity::link_status::LinkStatus;
use crate::entity::run_mode::RunMode;

/// Minimum confidence a tag suggestion needs to be stored.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Maximum stored tag suggestions per link.
pub const DEFAULT_MAX_TAGS: usize = 10;

/// Options for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Compute counters but skip persistence and export.
    pub dry_run: bool,
    /// Listing page size.
    pub page_size: u32,
    /// Explicit cursor override; takes precedence over stored cursors.
    pub cursor_override: Option<DateTime<Utc>>,
    /// Minimum confidence for stored tag suggestions.
    pub confidence_threshold: f64,
    /// Cap on stored tag suggestions per link.
    pub max_tags: usize,
    /// Where the snapshot is written.
    pub export_path: PathBuf,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            page_size: DEFAULT_PAGE_SIZE,
            cursor_override: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            max_tags: DEFAULT_MAX_TAGS,
            export_path: PathBuf::from("rainbarrel-export.json"),
        }
    }
}

/// A per-item enrichment failure recorded on the run.
#[derive(Debug, Clone, Serialize)]
pub struct LinkFailure {
    pub link_id: i64,
    pub reason: String,
}

/// Previous and new status of a reprocessed link.
#[derive(Debug, Clone, Serialize)]
pub struct StatusTransition {
    pub previous: Option<LinkStatus>,
    pub current: LinkStatus,
}

/// Summary returned to the caller when a run completes.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub mode: RunMode,
    pub processed: usize,
    pub skipped: usize,
    pub manual_review: usize,
    pub failures: Vec<LinkFailure>,
    pub export_path: Option<String>,
    /// Completion time.
    pub timestamp: DateTime<Utc>,
    pub duration_seconds: f64,
    pub rate_limit_remaining: Option<i64>,
    pub rate_limit_reset: Option<i64>,
    /// Present for reprocess runs only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<StatusTransition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_documented_defaults() {
        let options = SyncOptions::default();
        assert!(!options.dry_run);
        assert_eq!(options.page_size, DEFAULT_PAGE_SIZE);
        assert!(options.cursor_override.is_none());
        assert_eq!(options.confidence_threshold, DEFAULT_CONFIDENCE_THRESHOLD);
        assert_eq!(options.max_tags, DEFAULT_MAX_TAGS);
    }

    #[test]
    fn summary_serializes_for_json_output() {
        let summary = RunSummary {
            run_id: Uuid::nil(),
            mode: RunMode::Full,
            processed: 2,
            skipped: 0,
            manual_review: 1,
            failures: vec![LinkFailure {
                link_id: 201,
                reason: "fetch failed".to_string(),
            }],
            export_path: Some("export.json".to_string()),
            timestamp: Utc::now(),
            duration_seconds: 1.5,
            rate_limit_remaining: Some(100),
            rate_limit_reset: None,
            transition: None,
        };

        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["mode"], "full");
        assert_eq!(json["processed"], 2);
        assert_eq!(json["failures"][0]["link_id"], 201);
        // Reprocess-only field is omitted for listing runs.
        assert!(json.get("transition").is_none());
    }

    #[test]
    fn reprocess_summary_includes_transition() {
        let summary = RunSummary {
            run_id: Uuid::nil(),
            mode: RunMode::Reprocess,
            processed: 1,
            skipped: 0,
            manual_review: 0,
            failures: Vec::new(),
            export_path: None,
            timestamp: Utc::now(),
            duration_seconds: 0.2,
            rate_limit_remaining: None,
            rate_limit_reset: None,
            transition: Some(StatusTransition {
                previous: Some(LinkStatus::ManualReview),
                current: LinkStatus::Processed,
            }),
        };

        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["transition"]["previous"], "manual_review");
        assert_eq!(json["transition"]["current"], "processed");
    }
}

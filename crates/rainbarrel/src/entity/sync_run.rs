//! Sync run audit records.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::run_mode::RunMode;

/// One row per sync invocation, ordered by start time. Append-only; a retried
/// write with the same run id overwrites rather than duplicates.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_runs")]
pub struct Model {
    /// Unique per invocation.
    #[sea_orm(primary_key, auto_increment = false)]
    pub run_id: Uuid,
    /// How candidates were selected.
    pub mode: RunMode,

    // ─── Timing ──────────────────────────────────────────────────────────────
    pub started_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,

    // ─── Counters ────────────────────────────────────────────────────────────
    pub processed: i32,
    pub skipped: i32,
    pub manual_review: i32,
    pub failures: i32,

    // ─── Rate-limit telemetry (best-effort, from response headers) ───────────
    pub rate_limit_limit: Option<i64>,
    pub rate_limit_remaining: Option<i64>,
    pub rate_limit_reset: Option<i64>,

    /// Path of the snapshot written by this run.
    pub export_path: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

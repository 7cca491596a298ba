//! Progress reporting for sync runs.
//!
//! Telemetry is an explicit callback passed into the engine (and forwarded
//! from the retry runner) rather than a global sink, so tests can assert on
//! emitted events without shared state.

/// Progress events emitted during a sync run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Collections listing completed.
    CollectionsFetched {
        /// Number of collections observed.
        count: usize,
    },

    /// Starting to fetch raindrops for a collection.
    FetchingRaindrops {
        collection_id: i64,
        title: String,
        /// Whether an incremental cursor bounds this fetch.
        incremental: bool,
    },

    /// Finished fetching raindrops for a collection.
    FetchedRaindrops {
        collection_id: i64,
        count: usize,
    },

    /// Diffing completed; enrichment is about to start.
    DiffComplete {
        candidates: usize,
        skipped: usize,
    },

    /// Content fetch succeeded for one candidate.
    LinkEnriched {
        raindrop_id: i64,
    },

    /// Content fetch or tagging failed for one candidate (run continues).
    LinkEnrichmentFailed {
        raindrop_id: i64,
        reason: String,
    },

    /// Tagging a batch of enriched documents.
    TaggingBatch {
        count: usize,
    },

    /// A candidate was persisted.
    LinkPersisted {
        raindrop_id: i64,
    },

    /// A remote request is backing off before a retry.
    RetryBackoff {
        /// 1-based index of the failed attempt.
        attempt: u32,
        delay_ms: u64,
        /// Server-supplied wait, if one was present.
        retry_after_ms: Option<u64>,
    },

    /// The snapshot file was written (or found unchanged).
    SnapshotWritten {
        path: String,
        links: usize,
        changed: bool,
    },

    /// The audit record was stored.
    RunRecorded {
        run_id: uuid::Uuid,
    },
}

/// Callback for progress updates during sync runs.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

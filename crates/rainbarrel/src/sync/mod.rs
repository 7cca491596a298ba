//! The synchronization engine.
//!
//! # Module Structure
//!
//! - [`types`] - `SyncOptions`, `RunSummary`, failure records, defaults
//! - [`progress`] - `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`diff`] - candidate classification for full/incremental/reprocess runs
//! - [`engine`] - the orchestrator tying client, diff, enrichment, store, and
//!   export together

pub mod diff;
pub mod engine;
mod progress;
mod types;

pub use diff::Decision;
pub use engine::{SyncEngine, SyncError};
pub use progress::{emit, ProgressCallback, SyncProgress};
pub use types::{
    LinkFailure, RunSummary, StatusTransition, SyncOptions, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_MAX_TAGS,
};

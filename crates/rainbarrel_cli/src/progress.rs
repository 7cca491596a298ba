//! Progress reporting for sync runs.
//!
//! Interactive mode (TTY) drives an indicatif spinner; non-TTY output (CI,
//! pipes) falls back to structured tracing lines.

use std::sync::Arc;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use rainbarrel::sync::{ProgressCallback, SyncProgress};

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    Interactive(InteractiveReporter),
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter)
        }
    }

    /// Handle a progress event.
    pub fn handle(&self, event: SyncProgress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// Convert to a ProgressCallback for the engine.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| {
            reporter.handle(event);
        })
    }

    /// Tear down any progress bars.
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}

/// Spinner-based reporter for TTYs.
pub struct InteractiveReporter {
    bar: ProgressBar,
}

impl InteractiveReporter {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Self { bar }
    }

    fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::CollectionsFetched { count } => {
                self.bar.set_message(format!("{count} collections"));
            }
            SyncProgress::FetchingRaindrops { title, incremental, .. } => {
                let kind = if incremental { "changes in" } else { "all of" };
                self.bar.set_message(format!("fetching {kind} \"{title}\""));
            }
            SyncProgress::FetchedRaindrops { count, .. } => {
                self.bar.set_message(format!("{count} raindrops fetched"));
            }
            SyncProgress::DiffComplete { candidates, skipped } => {
                self.bar
                    .set_message(format!("{candidates} to enrich, {skipped} unchanged"));
            }
            SyncProgress::LinkEnriched { raindrop_id } => {
                self.bar.set_message(format!("enriched {raindrop_id}"));
            }
            SyncProgress::LinkEnrichmentFailed { raindrop_id, reason } => {
                self.bar
                    .println(format!("! {raindrop_id} needs manual review: {reason}"));
            }
            SyncProgress::TaggingBatch { count } => {
                self.bar.set_message(format!("tagging {count} documents"));
            }
            SyncProgress::LinkPersisted { raindrop_id } => {
                self.bar.set_message(format!("saved {raindrop_id}"));
            }
            SyncProgress::RetryBackoff {
                attempt, delay_ms, ..
            } => {
                self.bar.set_message(format!(
                    "rate limited, retrying in {:.1}s (attempt {attempt})",
                    delay_ms as f64 / 1000.0
                ));
            }
            SyncProgress::SnapshotWritten { path, links, changed } => {
                let verb = if changed { "wrote" } else { "unchanged" };
                self.bar.println(format!("{verb} snapshot ({links} links) at {path}"));
            }
            SyncProgress::RunRecorded { .. } => {}
            _ => {}
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Tracing-based reporter for non-TTY output.
pub struct LoggingReporter;

impl LoggingReporter {
    fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::CollectionsFetched { count } => {
                tracing::info!(count, "collections fetched");
            }
            SyncProgress::FetchingRaindrops {
                collection_id,
                title,
                incremental,
            } => {
                tracing::info!(collection_id, %title, incremental, "fetching raindrops");
            }
            SyncProgress::FetchedRaindrops { collection_id, count } => {
                tracing::info!(collection_id, count, "raindrops fetched");
            }
            SyncProgress::DiffComplete { candidates, skipped } => {
                tracing::info!(candidates, skipped, "diff complete");
            }
            SyncProgress::LinkEnriched { raindrop_id } => {
                tracing::debug!(raindrop_id, "link enriched");
            }
            SyncProgress::LinkEnrichmentFailed { raindrop_id, reason } => {
                tracing::warn!(raindrop_id, %reason, "link routed to manual review");
            }
            SyncProgress::TaggingBatch { count } => {
                tracing::info!(count, "tagging batch");
            }
            SyncProgress::LinkPersisted { raindrop_id } => {
                tracing::debug!(raindrop_id, "link persisted");
            }
            SyncProgress::RetryBackoff {
                attempt,
                delay_ms,
                retry_after_ms,
            } => {
                tracing::warn!(attempt, delay_ms, ?retry_after_ms, "backing off before retry");
            }
            SyncProgress::SnapshotWritten { path, links, changed } => {
                tracing::info!(%path, links, changed, "snapshot written");
            }
            SyncProgress::RunRecorded { run_id } => {
                tracing::info!(%run_id, "sync run recorded");
            }
            _ => {}
        }
    }
}

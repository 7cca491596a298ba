//! Sync orchestrator.
//!
//! A run moves through collecting, diffing, enriching, persisting, and
//! exporting before returning a summary; any fatal error (remote listing
//! failure, persistence failure) aborts the run immediately, while per-item
//! enrichment failures are recovered locally as manual-review records.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, Set};
use thiserror::Error;
use uuid::Uuid;

use crate::api::{ApiError, RaindropPayload, RateLimitSnapshot, RemoteClient};
use crate::enrich::{
    content_hash, filter_suggestions, ContentFetcher, TagBatch, TagDocument, Tagger,
};
use crate::entity::link_status::LinkStatus;
use crate::entity::run_mode::RunMode;
use crate::entity::{collection, link, sync_run, tag_suggestion};
use crate::export::{self, ExportError};
use crate::store::{self, StoreError};

use super::diff::{self, Decision};
use super::progress::{emit, ProgressCallback, SyncProgress};
use super::types::{LinkFailure, RunSummary, StatusTransition, SyncOptions};

/// Fatal errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote API failure: {0}")]
    Api(#[from] ApiError),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    #[error("export failure: {0}")]
    Export(#[from] ExportError),

    #[error("{0} runs must go through reprocess()")]
    UnsupportedMode(RunMode),
}

/// A remote item selected for enrichment, with the collection it was
/// observed in.
struct Candidate {
    payload: RaindropPayload,
    collection_id: Option<i64>,
}

/// A candidate after the enrichment step resolved.
struct EnrichedCandidate {
    payload: RaindropPayload,
    collection_id: Option<i64>,
    content_hash: Option<String>,
    /// Failure reason when the candidate fell to manual review.
    failure: Option<String>,
    tags: Vec<crate::enrich::SuggestedTag>,
}

impl EnrichedCandidate {
    fn status(&self) -> LinkStatus {
        if self.failure.is_none() {
            LinkStatus::Processed
        } else {
            LinkStatus::ManualReview
        }
    }
}

/// Composes the client, diff engine, enrichment capabilities, store, and
/// exporter into full/incremental/reprocess runs.
pub struct SyncEngine<'a, C, F, T> {
    db: &'a DatabaseConnection,
    client: &'a C,
    fetcher: &'a F,
    tagger: &'a T,
    options: SyncOptions,
    on_progress: Option<&'a ProgressCallback>,
}

impl<'a, C, F, T> SyncEngine<'a, C, F, T>
where
    C: RemoteClient,
    F: ContentFetcher,
    T: Tagger,
{
    pub fn new(
        db: &'a DatabaseConnection,
        client: &'a C,
        fetcher: &'a F,
        tagger: &'a T,
        options: SyncOptions,
        on_progress: Option<&'a ProgressCallback>,
    ) -> Self {
        Self {
            db,
            client,
            fetcher,
            tagger,
            options,
            on_progress,
        }
    }

    /// Run a full or incremental sync over every collection.
    pub async fn run(&self, mode: RunMode) -> Result<RunSummary, SyncError> {
        if mode == RunMode::Reprocess {
            return Err(SyncError::UnsupportedMode(mode));
        }

        let run_id = Uuid::new_v4();
        let started = Utc::now();
        tracing::info!(%run_id, %mode, dry_run = self.options.dry_run, "starting sync run");

        // ── collecting ──
        let (collections, mut telemetry) = self.client.list_collections().await?;
        emit(
            self.on_progress,
            SyncProgress::CollectionsFetched {
                count: collections.len(),
            },
        );

        let mut skipped = 0usize;
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut seen: HashSet<i64> = HashSet::new();
        let mut newest_per_collection: HashMap<i64, DateTime<Utc>> = HashMap::new();

        for remote_collection in &collections {
            let stored = store::collections::get(self.db, remote_collection.id).await?;
            if !self.options.dry_run {
                store::collections::upsert(
                    self.db,
                    collection::ActiveModel {
                        id: Set(remote_collection.id),
                        title: Set(remote_collection.title.clone()),
                        color: Set(remote_collection.color.clone()),
                        parent_id: Set(remote_collection.parent_id()),
                        last_update: Set(remote_collection
                            .last_update
                            .map(|ts| ts.fixed_offset())),
                        last_synced_at: sea_orm::ActiveValue::NotSet,
                    },
                )
                .await?;
            }

            // Cursor precedence: explicit override, then the stored
            // per-collection cursor (incremental only), then a full fetch.
            let cursor = self.options.cursor_override.or_else(|| {
                if mode == RunMode::Incremental {
                    stored
                        .as_ref()
                        .and_then(|c| c.last_synced_at)
                        .map(|ts| ts.with_timezone(&Utc))
                } else {
                    None
                }
            });

            emit(
                self.on_progress,
                SyncProgress::FetchingRaindrops {
                    collection_id: remote_collection.id,
                    title: remote_collection.title.clone(),
                    incremental: cursor.is_some(),
                },
            );

            let (items, snapshot) = self
                .client
                .list_raindrops(remote_collection.id, cursor, self.options.page_size)
                .await?;
            if !snapshot.is_empty() {
                telemetry = snapshot;
            }
            emit(
                self.on_progress,
                SyncProgress::FetchedRaindrops {
                    collection_id: remote_collection.id,
                    count: items.len(),
                },
            );

            // ── diffing ──
            for item in items {
                if !item.is_active() {
                    tracing::debug!(raindrop_id = item.id, "discarding flagged or invalid payload");
                    continue;
                }
                if let Some(ts) = item.last_update {
                    newest_per_collection
                        .entry(remote_collection.id)
                        .and_modify(|newest| {
                            if ts > *newest {
                                *newest = ts;
                            }
                        })
                        .or_insert(ts);
                }

                let existing = store::links::get(self.db, item.id).await?;
                match diff::classify(mode, &item, existing.as_ref()) {
                    Decision::Enrich => {
                        // Each raindrop id is written at most once per run.
                        if seen.insert(item.id) {
                            candidates.push(Candidate {
                                collection_id: Some(remote_collection.id),
                                payload: item,
                            });
                        }
                    }
                    Decision::Skip => skipped += 1,
                }
            }
        }

        emit(
            self.on_progress,
            SyncProgress::DiffComplete {
                candidates: candidates.len(),
                skipped,
            },
        );

        // ── enriching / persisting ──
        let enriched = self.enrich(candidates).await;
        self.persist(&enriched).await?;

        // ── exporting ──
        let export_path = self.finalize(run_id, mode, started, &enriched, skipped, &telemetry)
            .await?;

        if !self.options.dry_run {
            for (collection_id, newest) in newest_per_collection {
                store::collections::set_cursor(self.db, collection_id, newest.fixed_offset())
                    .await?;
            }
        }

        Ok(self.summarize(
            run_id,
            mode,
            started,
            &enriched,
            skipped,
            export_path,
            &telemetry,
            None,
        ))
    }

    /// Re-enrich a single link regardless of timestamps, reporting its
    /// previous status alongside the new one.
    pub async fn reprocess(&self, raindrop_id: i64) -> Result<RunSummary, SyncError> {
        let run_id = Uuid::new_v4();
        let started = Utc::now();
        tracing::info!(%run_id, raindrop_id, "starting reprocess run");

        let previous = store::links::get(self.db, raindrop_id)
            .await?
            .map(|l| l.status);

        let (item, telemetry) = self.client.fetch_raindrop(raindrop_id).await?;
        let candidates = vec![Candidate {
            collection_id: item.owning_collection(),
            payload: item,
        }];

        let enriched = self.enrich(candidates).await;
        self.persist(&enriched).await?;

        let export_path = self
            .finalize(run_id, RunMode::Reprocess, started, &enriched, 0, &telemetry)
            .await?;

        let transition = enriched.first().map(|e| StatusTransition {
            previous,
            current: e.status(),
        });

        Ok(self.summarize(
            run_id,
            RunMode::Reprocess,
            started,
            &enriched,
            0,
            export_path,
            &telemetry,
            transition,
        ))
    }

    /// Step 3: content fetch plus batched tagging. Per-item failures land in
    /// the result as manual-review outcomes; nothing here aborts the run.
    async fn enrich(&self, candidates: Vec<Candidate>) -> Vec<EnrichedCandidate> {
        let mut enriched: Vec<EnrichedCandidate> = Vec::with_capacity(candidates.len());
        let mut documents: Vec<TagDocument> = Vec::new();

        for candidate in candidates {
            match self.fetcher.fetch(&candidate.payload.link).await {
                Ok(content) => {
                    let digest = content_hash(&content);
                    documents.push(TagDocument {
                        id: candidate.payload.id,
                        url: candidate.payload.link.clone(),
                        title: candidate.payload.title.clone(),
                        content,
                        created_at: candidate.payload.created,
                    });
                    emit(
                        self.on_progress,
                        SyncProgress::LinkEnriched {
                            raindrop_id: candidate.payload.id,
                        },
                    );
                    enriched.push(EnrichedCandidate {
                        payload: candidate.payload,
                        collection_id: candidate.collection_id,
                        content_hash: Some(digest),
                        failure: None,
                        tags: Vec::new(),
                    });
                }
                Err(err) => {
                    let reason = err.to_string();
                    tracing::warn!(
                        raindrop_id = candidate.payload.id,
                        error = %reason,
                        "content fetch failed, routing to manual review"
                    );
                    emit(
                        self.on_progress,
                        SyncProgress::LinkEnrichmentFailed {
                            raindrop_id: candidate.payload.id,
                            reason: reason.clone(),
                        },
                    );
                    enriched.push(EnrichedCandidate {
                        payload: candidate.payload,
                        collection_id: candidate.collection_id,
                        content_hash: None,
                        failure: Some(reason),
                        tags: Vec::new(),
                    });
                }
            }
        }

        let batch = if documents.is_empty() {
            TagBatch::default()
        } else {
            emit(
                self.on_progress,
                SyncProgress::TaggingBatch {
                    count: documents.len(),
                },
            );
            self.tagger.generate(&documents).await
        };

        for item in &mut enriched {
            if item.failure.is_some() {
                continue;
            }
            let id = item.payload.id;
            if let Some(reason) = batch.failures.get(&id) {
                tracing::warn!(
                    raindrop_id = id,
                    error = %reason,
                    "tagging failed, routing to manual review"
                );
                emit(
                    self.on_progress,
                    SyncProgress::LinkEnrichmentFailed {
                        raindrop_id: id,
                        reason: reason.clone(),
                    },
                );
                item.failure = Some(reason.clone());
            } else if let Some(suggestions) = batch.suggestions.get(&id) {
                item.tags = filter_suggestions(
                    suggestions.clone(),
                    self.options.confidence_threshold,
                    self.options.max_tags,
                );
            }
        }

        enriched
    }

    /// Step 4: one upsert per candidate. Any store failure is fatal.
    async fn persist(&self, enriched: &[EnrichedCandidate]) -> Result<(), SyncError> {
        if self.options.dry_run {
            return Ok(());
        }

        for item in enriched {
            let status = item.status();
            let now = Utc::now().fixed_offset();

            let record = link::ActiveModel {
                raindrop_id: Set(item.payload.id),
                url: Set(item.payload.link.clone()),
                title: Set(item.payload.title.clone()),
                description: Set(item.payload.description().map(String::from)),
                created_at: Set(item.payload.created.map(|ts| ts.fixed_offset())),
                updated_at: Set(item.payload.last_update.map(|ts| ts.fixed_offset())),
                processed_at: Set((status == LinkStatus::Processed).then_some(now)),
                content_hash: Set(item.content_hash.clone()),
                status: Set(status),
                llm_version: Set(
                    (status == LinkStatus::Processed).then(|| self.tagger.version())
                ),
            };

            let tags: Vec<tag_suggestion::ActiveModel> = item
                .tags
                .iter()
                .map(|tag| tag_suggestion::ActiveModel {
                    id: sea_orm::ActiveValue::NotSet,
                    link_id: Set(item.payload.id),
                    tag: Set(tag.tag.clone()),
                    confidence: Set(tag.confidence),
                    source: Set(tag.source),
                    suggested_at: Set(now),
                })
                .collect();

            let collection_ids: Vec<i64> = item.collection_id.into_iter().collect();
            store::links::upsert(self.db, record, &collection_ids, tags).await?;
            emit(
                self.on_progress,
                SyncProgress::LinkPersisted {
                    raindrop_id: item.payload.id,
                },
            );
        }

        Ok(())
    }

    /// Step 5: snapshot export plus the audit record. Skipped entirely in
    /// dry-run mode.
    async fn finalize(
        &self,
        run_id: Uuid,
        mode: RunMode,
        started: DateTime<Utc>,
        enriched: &[EnrichedCandidate],
        skipped: usize,
        telemetry: &RateLimitSnapshot,
    ) -> Result<Option<String>, SyncError> {
        if self.options.dry_run {
            return Ok(None);
        }

        let (links, changed) = export::export_to_path(self.db, &self.options.export_path).await?;
        let export_path = self.options.export_path.display().to_string();
        emit(
            self.on_progress,
            SyncProgress::SnapshotWritten {
                path: export_path.clone(),
                links,
                changed,
            },
        );

        let (processed, manual_review, failures) = tally(enriched);
        store::runs::record(
            self.db,
            sync_run::ActiveModel {
                run_id: Set(run_id),
                mode: Set(mode),
                started_at: Set(started.fixed_offset()),
                completed_at: Set(Some(Utc::now().fixed_offset())),
                processed: Set(processed as i32),
                skipped: Set(skipped as i32),
                manual_review: Set(manual_review as i32),
                failures: Set(failures.len() as i32),
                rate_limit_limit: Set(telemetry.limit),
                rate_limit_remaining: Set(telemetry.remaining),
                rate_limit_reset: Set(telemetry.reset_epoch),
                export_path: Set(Some(export_path.clone())),
            },
        )
        .await?;
        emit(self.on_progress, SyncProgress::RunRecorded { run_id });

        Ok(Some(export_path))
    }

    #[allow(clippy::too_many_arguments)]
    fn summarize(
        &self,
        run_id: Uuid,
        mode: RunMode,
        started: DateTime<Utc>,
        enriched: &[EnrichedCandidate],
        skipped: usize,
        export_path: Option<String>,
        telemetry: &RateLimitSnapshot,
        transition: Option<StatusTransition>,
    ) -> RunSummary {
        let (processed, manual_review, failures) = tally(enriched);
        let completed = Utc::now();
        let duration = (completed - started)
            .to_std()
            .unwrap_or_default()
            .as_secs_f64();

        tracing::info!(
            %run_id,
            %mode,
            processed,
            skipped,
            manual_review,
            failures = failures.len(),
            "sync run complete"
        );

        RunSummary {
            run_id,
            mode,
            processed,
            skipped,
            manual_review,
            failures,
            export_path,
            timestamp: completed,
            duration_seconds: duration,
            rate_limit_remaining: telemetry.remaining,
            rate_limit_reset: telemetry.reset_epoch,
            transition,
        }
    }
}

fn tally(enriched: &[EnrichedCandidate]) -> (usize, usize, Vec<LinkFailure>) {
    let mut processed = 0usize;
    let mut manual_review = 0usize;
    let mut failures = Vec::new();

    for item in enriched {
        match &item.failure {
            None => processed += 1,
            Some(reason) => {
                manual_review += 1;
                failures.push(LinkFailure {
                    link_id: item.payload.id,
                    reason: reason.clone(),
                });
            }
        }
    }

    (processed, manual_review, failures)
}

//! The `sync` command: full or incremental mirror of the remote account.

use std::sync::Arc;
use std::time::Duration;

use console::style;
use rainbarrel::api::{RaindropClient, RequestPacer};
use rainbarrel::enrich::{HtmlContentFetcher, MetadataTagger};
use rainbarrel::http::ReqwestTransport;
use rainbarrel::retry::RetryEvent;
use rainbarrel::sync::{RunSummary, SyncEngine, SyncOptions, SyncProgress};
use rainbarrel::RunMode;

use super::{open_db, require_token, EXIT_FATAL, EXIT_OK};
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::SyncArgs;

pub async fn run(config: &Config, args: &SyncArgs) -> i32 {
    let db = match open_db(config).await {
        Ok(db) => db,
        Err(code) => return code,
    };
    let token = match require_token(config) {
        Ok(token) => token,
        Err(code) => return code,
    };

    let transport = match ReqwestTransport::with_timeout(Duration::from_secs(30)) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("error: failed to build HTTP client: {e}");
            return EXIT_FATAL;
        }
    };

    let reporter = Arc::new(ProgressReporter::new());

    let mut client = RaindropClient::new(transport.clone(), token);
    if let Some(base_url) = &config.raindrop.base_url {
        client = client.with_base_url(base_url);
    }
    if !args.no_rate_limit && config.raindrop.requests_per_minute > 0 {
        client = client.with_pacer(RequestPacer::per_minute(config.raindrop.requests_per_minute));
    }
    let retry_reporter = Arc::clone(&reporter);
    client = client.with_retry_callback(Box::new(move |event: RetryEvent| {
        retry_reporter.handle(SyncProgress::RetryBackoff {
            attempt: event.attempt,
            delay_ms: event.delay.as_millis() as u64,
            retry_after_ms: event.retry_after.map(|d| d.as_millis() as u64),
        });
    }));

    let fetcher = HtmlContentFetcher::new(transport);
    let tagger = MetadataTagger;

    let options = SyncOptions {
        dry_run: args.dry_run,
        page_size: args.page_size.unwrap_or(config.sync.page_size),
        cursor_override: args.since,
        confidence_threshold: config.sync.confidence_threshold,
        max_tags: config.sync.max_tags,
        export_path: args
            .export
            .clone()
            .unwrap_or_else(|| config.export_path()),
    };
    let mode = if args.full {
        RunMode::Full
    } else {
        RunMode::Incremental
    };

    let callback = reporter.as_callback();
    let engine = SyncEngine::new(&db, &client, &fetcher, &tagger, options, Some(&callback));
    let result = engine.run(mode).await;
    reporter.finish();

    match result {
        Ok(summary) => {
            print_summary(&summary, args.json);
            EXIT_OK
        }
        Err(e) => {
            eprintln!("error: sync failed: {e}");
            EXIT_FATAL
        }
    }
}

/// Shared summary printer for sync and reprocess.
pub(crate) fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(body) => println!("{body}"),
            Err(e) => eprintln!("error: failed to serialize summary: {e}"),
        }
        return;
    }

    println!(
        "{} run {} finished in {:.1}s",
        summary.mode,
        summary.run_id,
        summary.duration_seconds
    );
    println!(
        "  {} processed, {} skipped, {} manual review",
        style(summary.processed).green(),
        summary.skipped,
        if summary.manual_review > 0 {
            style(summary.manual_review).yellow()
        } else {
            style(summary.manual_review).dim()
        }
    );
    if let Some(transition) = &summary.transition {
        let previous = transition
            .previous
            .map(|s| s.to_string())
            .unwrap_or_else(|| "absent".to_string());
        println!("  status: {} -> {}", previous, transition.current);
    }
    for failure in &summary.failures {
        println!(
            "  {} {}: {}",
            style("failed").red(),
            failure.link_id,
            failure.reason
        );
    }
    if let Some(path) = &summary.export_path {
        println!("  snapshot: {path}");
    }
    if let Some(remaining) = summary.rate_limit_remaining {
        println!("  rate limit remaining: {remaining}");
    }
}

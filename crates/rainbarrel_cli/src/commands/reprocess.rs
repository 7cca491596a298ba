//! The `reprocess` command: re-enrich a single link regardless of timestamps.

use std::sync::Arc;
use std::time::Duration;

use rainbarrel::api::{RaindropClient, RequestPacer};
use rainbarrel::enrich::{HtmlContentFetcher, MetadataTagger};
use rainbarrel::http::ReqwestTransport;
use rainbarrel::sync::{SyncEngine, SyncOptions};

use super::sync::print_summary;
use super::{open_db, require_token, EXIT_FATAL, EXIT_OK};
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::ReprocessArgs;

pub async fn run(config: &Config, args: &ReprocessArgs) -> i32 {
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

    let mut client = RaindropClient::new(transport.clone(), token);
    if let Some(base_url) = &config.raindrop.base_url {
        client = client.with_base_url(base_url);
    }
    if config.raindrop.requests_per_minute > 0 {
        client = client.with_pacer(RequestPacer::per_minute(config.raindrop.requests_per_minute));
    }

    let fetcher = HtmlContentFetcher::new(transport);
    let tagger = MetadataTagger;

    let options = SyncOptions {
        confidence_threshold: config.sync.confidence_threshold,
        max_tags: config.sync.max_tags,
        export_path: args
            .export
            .clone()
            .unwrap_or_else(|| config.export_path()),
        ..SyncOptions::default()
    };

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let engine = SyncEngine::new(&db, &client, &fetcher, &tagger, options, Some(&callback));
    let result = engine.reprocess(args.id).await;
    reporter.finish();

    match result {
        Ok(summary) => {
            print_summary(&summary, args.json);
            EXIT_OK
        }
        Err(e) => {
            eprintln!("error: reprocess failed: {e}");
            EXIT_FATAL
        }
    }
}

//! The `runs` command: list the sync audit log.

use rainbarrel::store;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{open_db, EXIT_FATAL, EXIT_OK};
use crate::config::Config;
use crate::RunsArgs;

#[derive(Tabled)]
struct RunRow {
    #[tabled(rename = "run id")]
    run_id: String,
    mode: String,
    started: String,
    processed: i32,
    skipped: i32,
    #[tabled(rename = "manual review")]
    manual_review: i32,
    failures: i32,
}

pub async fn run(config: &Config, args: &RunsArgs) -> i32 {
    let db = match open_db(config).await {
        Ok(db) => db,
        Err(code) => return code,
    };

    let runs = match store::runs::list(&db, args.limit).await {
        Ok(runs) => runs,
        Err(e) => {
            eprintln!("error: failed to list runs: {e}");
            return EXIT_FATAL;
        }
    };

    if runs.is_empty() {
        println!("no sync runs recorded yet");
        return EXIT_OK;
    }

    let rows: Vec<RunRow> = runs
        .into_iter()
        .map(|run| RunRow {
            run_id: run.run_id.to_string(),
            mode: run.mode.to_string(),
            started: run.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            processed: run.processed,
            skipped: run.skipped,
            manual_review: run.manual_review,
            failures: run.failures,
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::sharp()));
    EXIT_OK
}

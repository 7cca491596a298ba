//! CLI command implementations.

pub mod export;
pub mod login;
pub mod migrate;
pub mod reprocess;
pub mod runs;
pub mod sync;

use rainbarrel::connect_and_migrate;
use sea_orm::DatabaseConnection;

use crate::config::Config;

/// Run completed (possibly with degraded items).
pub const EXIT_OK: i32 = 0;
/// A fatal error aborted the command.
pub const EXIT_FATAL: i32 = 1;
/// Configuration or usage problem.
pub const EXIT_USAGE: i32 = 2;

/// Open the store, creating the database file and running migrations.
pub(crate) async fn open_db(config: &Config) -> Result<DatabaseConnection, i32> {
    let Some(url) = config.database_url() else {
        eprintln!("error: could not determine a database path; set [database].url");
        return Err(EXIT_USAGE);
    };

    ensure_sqlite_parent_dir(&url);

    match connect_and_migrate(&url).await {
        Ok(db) => Ok(db),
        Err(e) => {
            eprintln!("error: failed to open database at {url}: {e}");
            Err(EXIT_FATAL)
        }
    }
}

/// SQLite can create the file but not its parent directories.
fn ensure_sqlite_parent_dir(url: &str) {
    if let Some(rest) = url.strip_prefix("sqlite://") {
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() || path.starts_with(':') {
            return;
        }
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
    }
}

/// Resolve the API token or explain how to configure one.
pub(crate) fn require_token(config: &Config) -> Result<String, i32> {
    match config.raindrop.token.as_deref() {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => {
            eprintln!(
                "error: no Raindrop API token configured; \
                 set RAINBARREL_RAINDROP_TOKEN or run `rainbarrel login <token>`"
            );
            Err(EXIT_USAGE)
        }
    }
}

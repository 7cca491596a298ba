//! The `migrate` command: manage the store schema.

use rainbarrel::connect;
use rainbarrel::migration::{Migrator, MigratorTrait};

use crate::config::Config;
use crate::MigrateAction;

use super::{EXIT_FATAL, EXIT_OK, EXIT_USAGE};

pub async fn run(config: &Config, action: &MigrateAction) -> i32 {
    let Some(url) = config.database_url() else {
        eprintln!("error: could not determine a database path; set [database].url");
        return EXIT_USAGE;
    };
    super::ensure_sqlite_parent_dir(&url);

    let db = match connect(&url).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("error: failed to open database at {url}: {e}");
            return EXIT_FATAL;
        }
    };

    let result = match action {
        MigrateAction::Up => Migrator::up(&db, None).await,
        MigrateAction::Status => {
            return match Migrator::get_pending_migrations(&db).await {
                Ok(pending) if pending.is_empty() => {
                    println!("schema is up to date");
                    EXIT_OK
                }
                Ok(pending) => {
                    println!("{} pending migration(s)", pending.len());
                    EXIT_OK
                }
                Err(e) => {
                    eprintln!("error: migration status failed: {e}");
                    EXIT_FATAL
                }
            };
        }
        MigrateAction::Fresh => Migrator::fresh(&db).await,
    };

    match result {
        Ok(()) => {
            println!("migrations applied");
            EXIT_OK
        }
        Err(e) => {
            eprintln!("error: migration failed: {e}");
            EXIT_FATAL
        }
    }
}

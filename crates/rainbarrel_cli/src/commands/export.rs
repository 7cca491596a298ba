//! The `export` command: write a snapshot from the local store only.

use rainbarrel::export;

use super::{open_db, EXIT_FATAL, EXIT_OK};
use crate::config::Config;
use crate::ExportArgs;

pub async fn run(config: &Config, args: &ExportArgs) -> i32 {
    let db = match open_db(config).await {
        Ok(db) => db,
        Err(code) => return code,
    };

    let path = args.output.clone().unwrap_or_else(|| config.export_path());
    match export::export_to_path(&db, &path).await {
        Ok((links, changed)) => {
            if changed {
                println!("wrote {links} links to {}", path.display());
            } else {
                println!("snapshot unchanged ({links} links) at {}", path.display());
            }
            EXIT_OK
        }
        Err(e) => {
            eprintln!("error: export failed: {e}");
            EXIT_FATAL
        }
    }
}

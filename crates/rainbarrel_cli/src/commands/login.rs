//! The `login` command: persist the API token with restricted permissions.

use crate::config::Config;

use super::{EXIT_FATAL, EXIT_OK};

pub fn run(token: &str) -> i32 {
    match Config::save_token(token) {
        Ok(path) => {
            println!("token saved to {}", path.display());
            EXIT_OK
        }
        Err(e) => {
            eprintln!("error: failed to save token: {e}");
            EXIT_FATAL
        }
    }
}

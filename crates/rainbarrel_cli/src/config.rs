//! Configuration file support.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `RAINBARREL_`, e.g.,
//!    `RAINBARREL_RAINDROP_TOKEN`)
//! 3. Config file (~/.config/rainbarrel/config.toml or ./rainbarrel.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to a SQLite file in the XDG state directory.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/rainbarrel/rainbarrel.db"  # optional
//!
//! [raindrop]
//! token = "..."             # or RAINBARREL_RAINDROP_TOKEN
//! requests_per_minute = 120
//!
//! [sync]
//! page_size = 50
//! confidence_threshold = 0.6
//! max_tags = 10
//! export_path = "raindrops.json"
//! ```

use std::path::PathBuf;
use std::{fs, io};

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Raindrop API configuration.
    pub raindrop: RaindropConfig,
    /// Default sync options.
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL. Defaults to a SQLite file in the XDG state
    /// directory when unset.
    pub url: Option<String>,
}

/// Raindrop API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RaindropConfig {
    /// API token. Can also be set via RAINBARREL_RAINDROP_TOKEN.
    pub token: Option<String>,
    /// API base URL override (testing, proxies).
    pub base_url: Option<String>,
    /// Proactive request budget per minute. 0 disables the pacer.
    pub requests_per_minute: u32,
}

impl Default for RaindropConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: None,
            requests_per_minute: 120,
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Listing page size.
    pub page_size: u32,
    /// Minimum confidence for stored tag suggestions.
    pub confidence_threshold: f64,
    /// Cap on stored tag suggestions per link.
    pub max_tags: usize,
    /// Snapshot path. Defaults to the XDG data directory when unset.
    pub export_path: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            confidence_threshold: 0.6,
            max_tags: 10,
            export_path: None,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "rainbarrel") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("rainbarrel.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./rainbarrel.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("RAINBARREL")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("rainbarrel.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Get the snapshot path, falling back to the default data directory.
    pub fn export_path(&self) -> PathBuf {
        self.sync
            .export_path
            .clone()
            .map(PathBuf::from)
            .or_else(|| {
                ProjectDirs::from("", "", "rainbarrel")
                    .map(|dirs| dirs.data_dir().join("rainbarrel-export.json"))
            })
            .unwrap_or_else(|| PathBuf::from("rainbarrel-export.json"))
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rainbarrel").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux this is `$XDG_STATE_HOME/rainbarrel` or
    /// `~/.local/state/rainbarrel`; macOS/Windows fall back to the data dir.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rainbarrel").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }

    /// Save the Raindrop token to the config file.
    ///
    /// Creates the file and parent directories if missing, updates only the
    /// `[raindrop]` section of an existing file, and restricts the file to
    /// owner read/write.
    pub fn save_token(token: &str) -> io::Result<PathBuf> {
        use toml_edit::{value, DocumentMut};

        let config_path = Self::default_config_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = if config_path.exists() {
            fs::read_to_string(&config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = content.parse().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Invalid TOML: {}", e))
        })?;

        if !doc.contains_key("raindrop") {
            doc["raindrop"] = toml_edit::table();
        }
        doc["raindrop"]["token"] = value(token);

        fs::write(&config_path, doc.to_string())?;
        restrict_permissions(&config_path)?;
        Ok(config_path)
    }
}

/// Restrict a secret-bearing file to owner read/write (0600).
#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.database.url.is_none());
        assert!(config.raindrop.token.is_none());
        assert_eq!(config.raindrop.requests_per_minute, 120);
        assert_eq!(config.sync.page_size, 50);
        assert_eq!(config.sync.confidence_threshold, 0.6);
        assert_eq!(config.sync.max_tags, 10);
    }

    #[test]
    fn test_config_parsing_from_toml() {
        let toml_content = r#"
            [database]
            url = "sqlite:///tmp/test.db"

            [raindrop]
            token = "rd_test123"
            requests_per_minute = 60

            [sync]
            page_size = 25
            confidence_threshold = 0.8
            max_tags = 5
            export_path = "out.json"
        "#;

        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(toml_content, FileFormat::Toml))
            .build()
            .unwrap();

        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(
            config.database.url,
            Some("sqlite:///tmp/test.db".to_string())
        );
        assert_eq!(config.raindrop.token, Some("rd_test123".to_string()));
        assert_eq!(config.raindrop.requests_per_minute, 60);
        assert_eq!(config.sync.page_size, 25);
        assert_eq!(config.sync.confidence_threshold, 0.8);
        assert_eq!(config.sync.max_tags, 5);
        assert_eq!(config.export_path(), PathBuf::from("out.json"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let toml_content = r#"
            [sync]
            page_size = 10
        "#;

        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(toml_content, FileFormat::Toml))
            .build()
            .unwrap();

        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(config.sync.page_size, 10);
        assert_eq!(config.sync.max_tags, 10);
        assert_eq!(config.raindrop.requests_per_minute, 120);
    }

    #[test]
    fn test_database_url_defaults_to_state_dir() {
        let config = Config::default();
        let db_url = config.database_url().expect("default url");
        assert!(db_url.starts_with("sqlite://"));
        assert!(db_url.contains("rainbarrel.db"));
        assert!(db_url.ends_with("?mode=rwc"));
    }

    #[test]
    fn test_database_url_respects_configured_value() {
        let toml_content = r#"
            [database]
            url = "sqlite:///tmp/custom.db"
        "#;

        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(toml_content, FileFormat::Toml))
            .build()
            .unwrap();

        let config: Config = settings.try_deserialize().unwrap();
        assert_eq!(
            config.database_url(),
            Some("sqlite:///tmp/custom.db".to_string())
        );
    }

    #[test]
    fn test_export_path_has_a_fallback() {
        let config = Config::default();
        let path = config.export_path();
        assert!(path.to_string_lossy().contains("rainbarrel"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let invalid_toml = r#"
            [sync
            page_size = 10
        "#;

        let result = ConfigBuilder::builder()
            .add_source(config::File::from_str(invalid_toml, FileFormat::Toml))
            .build();
        assert!(result.is_err());
    }
}

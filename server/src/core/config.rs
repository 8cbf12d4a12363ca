use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{ProjectDirs, UserDirs};
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, APP_NAME_LOWER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT,
    SQLITE_DB_FILENAME,
};

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Absolute path of the SQLite database file
    pub path: PathBuf,
}

/// Fully resolved application configuration.
///
/// Precedence: defaults < config file (profile dir, then local/CLI path) <
/// environment < CLI flags. Environment variables are applied by clap's
/// `env` attributes, so by the time `load` runs they are part of [`CliConfig`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ServerFileConfig {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseFileConfig {
    path: Option<String>,
}

/// Shape of `refdata.json`. All fields optional; unknown keys are collected
/// and warned about rather than rejected.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server: Option<ServerFileConfig>,
    database: Option<DatabaseFileConfig>,

    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl FileConfig {
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if !self.extra.is_empty() {
            let keys: Vec<&str> = self.extra.keys().map(|k| k.as_str()).collect();
            tracing::warn!(
                fields = %keys.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                current.host = server.host;
            }
            if server.port.is_some() {
                current.port = server.port;
            }
        }

        if let Some(database) = other.database {
            let current = self.database.get_or_insert_with(DatabaseFileConfig::default);
            if database.path.is_some() {
                current.path = database.path;
            }
        }
    }
}

impl AppConfig {
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();

        // 1. Profile dir (~/.refdata/refdata.json) - skip if not present
        if let Some(profile_path) = profile_config_path()
            && profile_path.exists()
        {
            let profile = FileConfig::load_from_file(&profile_path)?;
            profile.warn_unknown_fields();
            file_config.merge(profile);
        }

        // 2. CLI-specified path OR a refdata.json in the working directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay = FileConfig::load_from_file(&path)?;
            overlay.warn_unknown_fields();
            file_config.merge(overlay);
        }

        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let database = DatabaseConfig {
            path: cli
                .db
                .as_ref()
                .map(|p| expand_path(&p.to_string_lossy()))
                .or_else(|| file_database.path.as_deref().map(expand_path))
                .unwrap_or_else(default_db_path),
        };

        tracing::debug!(
            host = %server.host,
            port = server.port,
            db = %database.path.display(),
            "Configuration resolved"
        );

        Ok(Self { server, database })
    }
}

/// `~/.refdata/refdata.json`
fn profile_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Platform data directory fallback for the database file.
fn default_db_path() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME_LOWER)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SQLITE_DB_FILENAME)
}

/// Expand `~` and relative segments into an absolute path.
fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    let expanded = if path == "~" {
        UserDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        match UserDirs::new() {
            Some(dirs) => dirs.home_dir().join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    }
}

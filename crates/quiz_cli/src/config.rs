//! CLI configuration: optional `quizkit.toml` plus command-line overrides.

use anyhow::{Context, Result};
use quiz_core::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "quizkit.toml";
const DEFAULT_DATABASE: &str = "quizkit.db";
const DEFAULT_LOG_DIR: &str = "logs";

/// Contents of `quizkit.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizkitConfig {
    pub database: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Mirror warnings and errors to stderr.
    pub log_stderr: bool,
}

/// Values given on the command line; these win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: PathBuf,
    /// Always absolute.
    pub log_dir: PathBuf,
    pub log_level: String,
    pub log_stderr: bool,
}

/// Loads the config from `path`, or from `./quizkit.toml` when present.
///
/// An explicit path that does not exist is an error; a missing default file
/// yields the default config.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizkitConfig> {
    let config_path = match path {
        Some(path) if path.exists() => Some(path.to_path_buf()),
        Some(path) => anyhow::bail!("config file not found: {}", path.display()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            local.exists().then_some(local)
        }
    };

    match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizkitConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))
        }
        None => Ok(QuizkitConfig::default()),
    }
}

impl Settings {
    pub fn resolve(config: QuizkitConfig, overrides: Overrides) -> Result<Self> {
        let database = overrides
            .database
            .or(config.database)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));
        let log_dir = overrides
            .log_dir
            .or(config.log_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));
        let log_dir = if log_dir.is_absolute() {
            log_dir
        } else {
            std::env::current_dir()
                .context("failed to resolve current directory for log_dir")?
                .join(log_dir)
        };
        let log_level = overrides
            .log_level
            .or(config.log_level)
            .unwrap_or_else(|| default_log_level().to_string());

        Ok(Self {
            database,
            log_dir,
            log_level,
            log_stderr: config.log_stderr,
        })
    }
}

/// Starter config written by `quizkit init`.
pub const SAMPLE_CONFIG: &str = r#"# quizkit configuration

database = "quizkit.db"
log_dir = "logs"
log_level = "info"
log_stderr = false
"#;

//! Logging for quizkit processes.
//!
//! # Responsibility
//! - Write `event=... module=... status=...` lines to size-rotated files
//!   under the configured directory, optionally echoing warnings to stderr.
//! - Record panics before the default hook prints them.
//!
//! # Invariants
//! - One logger per process. Asking again with the same target is a no-op;
//!   asking with any other target fails with [`LoggingError::Conflict`].
//! - Nothing here panics.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Once;

const FILE_BASENAME: &str = "quizkit";
const ROTATE_AT_BYTES: u64 = 8 * 1024 * 1024;
const KEEP_FILES: usize = 7;
/// Panic messages can echo submitted answers or emails.
const PANIC_MESSAGE_LIMIT: usize = 120;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `off`, `error`, `warn` (or `warning`), `info`, `debug` or `trace`.
    pub level: String,
    /// Must be absolute; created when missing.
    pub log_dir: PathBuf,
    pub mirror_to_stderr: bool,
}

impl LoggingConfig {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level: default_log_level().to_string(),
            log_dir: log_dir.into(),
            mirror_to_stderr: false,
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_stderr(mut self, mirror: bool) -> Self {
        self.mirror_to_stderr = mirror;
        self
    }

    fn target(&self) -> Result<Target, LoggingError> {
        Ok(Target {
            level: parse_level(&self.level)?,
            dir: checked_dir(&self.log_dir)?,
            mirror_to_stderr: self.mirror_to_stderr,
        })
    }
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    RelativeLogDir(PathBuf),
    CreateDir { path: PathBuf, source: std::io::Error },
    Backend(flexi_logger::FlexiLoggerError),
    /// A logger with a different target is already running.
    Conflict { active: String, requested: String },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(f, "unknown log level `{level}`"),
            Self::RelativeLogDir(path) => {
                write!(f, "log directory must be absolute: `{}`", path.display())
            }
            Self::CreateDir { path, source } => {
                write!(f, "cannot create log directory `{}`: {source}", path.display())
            }
            Self::Backend(err) => write!(f, "logger failed to start: {err}"),
            Self::Conflict { active, requested } => {
                write!(f, "logging already runs as {active}; cannot switch to {requested}")
            }
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Resolved, comparable form of a [`LoggingConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    level: LevelFilter,
    dir: PathBuf,
    mirror_to_stderr: bool,
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "level={} dir={} stderr={}",
            level_name(self.level),
            self.dir.display(),
            self.mirror_to_stderr
        )
    }
}

struct ActiveLogger {
    target: Target,
    _handle: LoggerHandle,
}

/// Starts the process logger.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let requested = config.target()?;
    let active = ACTIVE.get_or_try_init(|| start(&requested))?;
    if active.target != requested {
        return Err(LoggingError::Conflict {
            active: active.target.to_string(),
            requested: requested.to_string(),
        });
    }
    Ok(())
}

fn start(target: &Target) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&target.dir).map_err(|source| LoggingError::CreateDir {
        path: target.dir.clone(),
        source,
    })?;

    let handle = Logger::try_with_str(level_name(target.level))
        .map_err(LoggingError::Backend)?
        .log_to_file(
            FileSpec::default()
                .directory(&target.dir)
                .basename(FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_FILES),
        )
        .duplicate_to_stderr(if target.mirror_to_stderr {
            Duplicate::Warn
        } else {
            Duplicate::None
        })
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Backend)?;

    PANIC_HOOK.call_once(install_panic_hook);
    info!(
        "event=logging_init module=logging status=ok version={} os={} {}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        target
    );

    Ok(ActiveLogger {
        target: target.clone(),
        _handle: handle,
    })
}

/// Level name and directory of the running logger.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (level_name(active.target.level), active.target.dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(value: &str) -> Result<LevelFilter, LoggingError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("warning") {
        return Ok(LevelFilter::Warn);
    }
    LevelFilter::from_str(value).map_err(|_| LoggingError::UnsupportedLevel(value.to_string()))
}

fn level_name(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

fn checked_dir(dir: &Path) -> Result<PathBuf, LoggingError> {
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Err(LoggingError::RelativeLogDir(dir.to_path_buf()))
    }
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let location = panic
            .location()
            .map_or_else(|| "unknown".to_string(), |at| format!("{}:{}", at.file(), at.line()));
        let message = panic
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string payload>");
        error!(
            "event=panic module=logging status=error location={location} message={}",
            one_line(message, PANIC_MESSAGE_LIMIT)
        );
        default_hook(panic);
    }));
}

/// Flattens `text` to one line of at most `limit` characters plus `...`.
fn one_line(text: &str, limit: usize) -> String {
    let mut flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(limit)
        .collect();
    if text.chars().count() > limit {
        flat.push_str("...");
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, one_line, parse_level, LoggingConfig, LoggingError};
    use log::LevelFilter;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level(" warning ").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
        assert!(matches!(
            parse_level("chatty"),
            Err(LoggingError::UnsupportedLevel(_))
        ));
    }

    #[test]
    fn relative_log_dir_is_rejected_before_starting() {
        let err = init_logging(&LoggingConfig::new("logs")).unwrap_err();
        assert!(matches!(err, LoggingError::RelativeLogDir(_)));
    }

    #[test]
    fn panic_messages_are_flattened_and_capped() {
        assert_eq!(one_line("a\nb\rc", 10), "a b c");
        assert_eq!(one_line("abcdef", 3), "abc...");
    }

    #[test]
    fn second_init_must_match_the_first() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let config = LoggingConfig::new(dir.path()).with_level("info");

        init_logging(&config).unwrap();
        init_logging(&config.clone().with_level("INFO")).unwrap();

        for conflicting in [
            config.clone().with_level("debug"),
            config.clone().with_stderr(true),
            LoggingConfig::new(other.path()).with_level("info"),
        ] {
            let err = init_logging(&conflicting).unwrap_err();
            assert!(matches!(err, LoggingError::Conflict { .. }), "{err}");
        }

        let (level, active_dir) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(active_dir, dir.path());
    }
}

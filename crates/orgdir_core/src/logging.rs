//! Process-wide logging bootstrap for directory front ends.
//!
//! # Responsibility
//! - Start rolling file logs once per process.
//! - Optionally mirror records to stderr for interactive use.
//! - Capture panics as sanitized, metadata-only log events.
//!
//! # Invariants
//! - Initialization is idempotent for an identical [`LoggingConfig`].
//! - A second initialization with a different config is rejected.
//! - Initialization never panics.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "orgdir";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

/// Normalized logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: &'static str,
    pub log_dir: PathBuf,
    pub duplicate_to_stderr: bool,
}

impl LoggingConfig {
    /// Validates raw level and directory input.
    ///
    /// # Errors
    /// - [`LoggingError::UnsupportedLevel`] for unknown levels.
    /// - [`LoggingError::InvalidDirectory`] for blank or relative paths.
    pub fn new(level: &str, log_dir: impl AsRef<Path>) -> Result<Self, LoggingError> {
        Ok(Self {
            level: normalize_level(level)?,
            log_dir: normalize_log_dir(log_dir.as_ref())?,
            duplicate_to_stderr: false,
        })
    }

    pub fn with_stderr(mut self, enabled: bool) -> Self {
        self.duplicate_to_stderr = enabled;
        self
    }
}

/// Logging bootstrap failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(String),
    /// Logging is already active with another config.
    Conflict {
        active: String,
        requested: String,
    },
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(message) => write!(f, "invalid log directory: {message}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already initialized with {active}; refusing to switch to {requested}"
            ),
            Self::Backend(message) => write!(f, "logger backend failed: {message}"),
        }
    }
}

impl Error for LoggingError {}

struct ActiveLogger {
    config: LoggingConfig,
    _handle: LoggerHandle,
}

/// Starts logging for the process.
///
/// # Errors
/// - [`LoggingError::Conflict`] when already started with another config.
/// - [`LoggingError::InvalidDirectory`] when the directory cannot be created.
/// - [`LoggingError::Backend`] when `flexi_logger` fails to start.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(config))?;
    if &active.config != config {
        return Err(LoggingError::Conflict {
            active: describe(&active.config),
            requested: describe(config),
        });
    }
    Ok(())
}

/// Returns the active config, or `None` before initialization.
pub fn logging_status() -> Option<LoggingConfig> {
    ACTIVE_LOGGER.get().map(|active| active.config.clone())
}

/// Default log level for the current build mode.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(config: &LoggingConfig) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&config.log_dir).map_err(|err| {
        LoggingError::InvalidDirectory(format!(
            "failed to create `{}`: {err}",
            config.log_dir.display()
        ))
    })?;

    let duplicate = if config.duplicate_to_stderr {
        Duplicate::All
    } else {
        Duplicate::None
    };

    let handle = Logger::try_with_str(config.level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(config.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .duplicate_to_stderr(duplicate)
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook_once();

    info!(
        "event=logging_init module=logging status=ok platform={} level={} log_dir={} stderr={} version={}",
        std::env::consts::OS,
        config.level,
        config.log_dir.display(),
        config.duplicate_to_stderr,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        config: config.clone(),
        _handle: handle,
    })
}

fn describe(config: &LoggingConfig) -> String {
    format!(
        "level `{}` dir `{}` stderr={}",
        config.level,
        config.log_dir.display(),
        config.duplicate_to_stderr
    )
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn normalize_log_dir(log_dir: &Path) -> Result<PathBuf, LoggingError> {
    if log_dir.as_os_str().is_empty() {
        return Err(LoggingError::InvalidDirectory(
            "path cannot be empty".to_string(),
        ));
    }
    if !log_dir.is_absolute() {
        return Err(LoggingError::InvalidDirectory(format!(
            "path must be absolute, got `{}`",
            log_dir.display()
        )));
    }
    Ok(log_dir.to_path_buf())
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "event=panic_captured module=logging status=error location={} payload={}",
            location,
            panic_payload_summary(panic_info)
        );
        previous_hook(panic_info);
    }));
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

// Payloads may carry organization names or phone numbers.
fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, logging_status, sanitize_message, LoggingConfig, LoggingError,
    };

    #[test]
    fn config_normalizes_level_aliases() {
        let dir = std::env::temp_dir();
        assert_eq!(LoggingConfig::new(" WARNING ", &dir).unwrap().level, "warn");
        assert_eq!(LoggingConfig::new("Info", &dir).unwrap().level, "info");
        assert!(matches!(
            LoggingConfig::new("loud", &dir),
            Err(LoggingError::UnsupportedLevel(_))
        ));
    }

    #[test]
    fn config_rejects_relative_and_empty_directories() {
        assert!(matches!(
            LoggingConfig::new("info", "logs/dev"),
            Err(LoggingError::InvalidDirectory(_))
        ));
        assert!(matches!(
            LoggingConfig::new("info", ""),
            Err(LoggingError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn sanitize_message_flattens_lines_and_truncates_by_chars() {
        let sanitized = sanitize_message("Кофемания\nАрбат\r18", 9);
        assert_eq!(sanitized, "Кофемания...");
        assert_eq!(sanitize_message("short", 10), "short");
    }

    #[test]
    fn init_is_idempotent_and_rejects_other_configs() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig::new("info", dir.path()).unwrap();

        init_logging(&config).unwrap();
        init_logging(&config).unwrap();

        let other_level = LoggingConfig::new("debug", dir.path()).unwrap();
        assert!(matches!(
            init_logging(&other_level),
            Err(LoggingError::Conflict { .. })
        ));
        let with_stderr = config.clone().with_stderr(true);
        assert!(matches!(
            init_logging(&with_stderr),
            Err(LoggingError::Conflict { .. })
        ));

        assert_eq!(logging_status(), Some(config));
    }
}

//! Transport-agnostic async API over the directory core.
//!
//! Front ends (CLI today) call [`DirectoryApi`]; each call opens its own
//! SQLite connection on tokio's blocking pool and returns serde-ready value
//! objects or an [`ApiError`] carrying an HTTP-like status code.

pub mod config;
mod directory;
pub mod error;
mod params;

pub use config::ApiConfig;
pub use directory::DirectoryApi;
pub use error::{ApiError, ApiResult};
pub use params::{MAX_DEPTH_RANGE, SEARCH_LIMIT_RANGE};

use orgdir_core::{init_logging, LoggingError};

/// Starts file logging when `config.log_dir` is set.
///
/// Returns `Ok(false)` when logging stays disabled.
pub fn init_logging_from_config(config: &ApiConfig, to_stderr: bool) -> Result<bool, LoggingError> {
    match config.logging_config()? {
        Some(logging) => {
            init_logging(&logging.with_stderr(to_stderr))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

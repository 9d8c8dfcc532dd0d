//! Error classification for directory API callers.

use orgdir_core::{DbError, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type ApiResult<T> = Result<T, ApiError>;

/// API-level error with an HTTP-like status classification.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Caller supplied an out-of-range or malformed parameter.
    InvalidParameter {
        name: &'static str,
        message: String,
    },
    /// Single-entity lookup found nothing.
    NotFound { entity: &'static str, id: i64 },
    /// Storage open, schema or query failure, kept intact as the source.
    Storage(Arc<RepoError>),
    /// Blocking worker was cancelled or panicked.
    Worker(String),
}

impl ApiError {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidParameter { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Storage(_) | Self::Worker(_) => 500,
        }
    }

    /// Stable machine-readable code for logs and JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::NotFound { .. } => "not_found",
            Self::Storage(_) => "storage_error",
            Self::Worker(_) => "worker_error",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter { name, message } => write!(f, "invalid `{name}`: {message}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
            Self::Worker(message) => write!(f, "worker failure: {message}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err.as_ref()),
            Self::InvalidParameter { .. } | Self::NotFound { .. } | Self::Worker(_) => None,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Validation(err) => Self::invalid("input", err.to_string()),
            other => Self::Storage(Arc::new(other)),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::Storage(Arc::new(RepoError::Db(value)))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Worker(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use orgdir_core::{DbError, RepoError, ValidationError};
    use std::error::Error;

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(ApiError::invalid("limit", "too large").status_code(), 400);
        assert_eq!(
            ApiError::NotFound {
                entity: "organization",
                id: 1
            }
            .status_code(),
            404
        );
        assert_eq!(
            ApiError::from(RepoError::InvalidData("disk".into())).status_code(),
            500
        );
        assert_eq!(ApiError::Worker("panic".into()).status_code(), 500);
    }

    #[test]
    fn repo_errors_map_to_api_classes() {
        let not_found = ApiError::from(RepoError::NotFound {
            entity: "occupation",
            id: 3,
        });
        assert!(matches!(
            not_found,
            ApiError::NotFound {
                entity: "occupation",
                id: 3
            }
        ));

        let invalid = ApiError::from(RepoError::from(ValidationError::LatitudeOutOfRange(91.0)));
        assert_eq!(invalid.code(), "invalid_parameter");

        let storage = ApiError::from(RepoError::InvalidData("bad row".into()));
        assert_eq!(storage.code(), "storage_error");
    }

    #[test]
    fn storage_errors_keep_the_underlying_fault_as_source() {
        let err = ApiError::from(DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 2,
        });

        let source = err.source().unwrap();
        let repo_err = source.downcast_ref::<RepoError>().unwrap();
        assert!(matches!(
            repo_err,
            RepoError::Db(DbError::UnsupportedSchemaVersion { db_version: 9, .. })
        ));
        assert!(err.to_string().contains("newer than supported"));
        assert!(ApiError::invalid("limit", "too large").source().is_none());
    }
}

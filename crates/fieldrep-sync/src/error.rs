//! # Pull Errors
//!
//! | Source        | Variants                                        |
//! |---------------|-------------------------------------------------|
//! | fieldrep.toml | `InvalidConfig`, `ConfigLoadFailed`, `ConfigSaveFailed` |
//! | settings row  | `InvalidUrl`, `InvalidConfig`                   |
//! | HTTP          | `ConnectionFailed`, `Timeout`, `HttpStatus`     |
//! | database      | `DatabaseError`                                 |
//!
//! HTTP errors stop at [`crate::http::HttpFetcher::fetch`], which logs them
//! and hands the pull an empty body. Only `try_fetch` callers see them.

use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sync server address is missing or malformed.
    #[error("Invalid sync URL: {0}")]
    InvalidUrl(String),

    #[error("Cannot read fieldrep.toml: {0}")]
    ConfigLoadFailed(String),

    #[error("Cannot write fieldrep.toml: {0}")]
    ConfigSaveFailed(String),

    #[error("Sync server unreachable: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// A repository call failed while applying pulled records.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A blocking fetch task panicked or was cancelled.
    #[error("Fetch task failed: {0}")]
    Internal(String),
}

impl From<fieldrep_db::DbError> for SyncError {
    fn from(err: fieldrep_db::DbError) -> Self {
        SyncError::DatabaseError(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for SyncError {
    fn from(err: tokio::task::JoinError) -> Self {
        SyncError::Internal(err.to_string())
    }
}

impl SyncError {
    /// Returns true if re-running the pull later may succeed.
    ///
    /// Nothing in this crate retries; the flag is for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::ConnectionFailed(_) | SyncError::Timeout(_) => true,
            SyncError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The local config or the settings row needs fixing.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}

//! # Store Errors
//!
//! What a repository call can fail with.
//!
//! ```text
//! build (fieldrep-core)       execute (sqlx)            import file
//!   QueryError ──┐              sqlx::Error ──┐           csv / io ──┐
//!                ▼                            ▼                      ▼
//!          DbError::Query        Unique/ForeignKey/NotNull     ImportFailed
//!                                QueryFailed/PoolExhausted
//! ```
//!
//! Every failure reaches the caller as `Err`; nothing here panics.

use fieldrep_core::{ImportKind, QueryError, ValidationError};
use sqlx::error::ErrorKind;
use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    /// An update or lookup by identity matched no row.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// `target` is the `table.column` SQLite names in its message.
    #[error("Duplicate value for {target}")]
    UniqueViolation { target: String },

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Missing required value: {0}")]
    NotNullViolation(String),

    /// The database file could not be opened or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The store rejected a statement for any other reason.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// BEGIN or COMMIT failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("No free database connection")]
    PoolExhausted,

    /// The statement was rejected before reaching the store.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// An import row or a date did not validate.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Bound value count differs from the statement's placeholders.
    #[error("{table}: statement expects {expected} values, got {found}")]
    ArityMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    /// Reading an import file failed.
    #[error("Import failed: {0}")]
    ImportFailed(String),

    /// A worker for this import kind is still running.
    #[error("Import of {0} is already running")]
    ImportInProgress(ImportKind),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    // "UNIQUE constraint failed: customer.account"
                    ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        target: message
                            .rsplit(": ")
                            .next()
                            .unwrap_or(message.as_str())
                            .to_string(),
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation(message),
                    ErrorKind::NotNullViolation => DbError::NotNullViolation(message),
                    _ => DbError::QueryFailed(message),
                }
            }
            sqlx::Error::RowNotFound => DbError::not_found("row", "?"),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<csv::Error> for DbError {
    fn from(err: csv::Error) -> Self {
        DbError::ImportFailed(err.to_string())
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::ImportFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_pass_through_unchanged() {
        let err: DbError = QueryError::UnsupportedOperator("~".to_string()).into();
        assert_eq!(err.to_string(), "Unsupported comparison operator '~'");
    }

    #[test]
    fn test_not_found_formats_numeric_ids() {
        assert_eq!(
            DbError::not_found("contact", 42).to_string(),
            "contact not found: 42"
        );
        assert_eq!(
            DbError::ImportInProgress(ImportKind::Visits).to_string(),
            "Import of visits is already running"
        );
    }

    #[tokio::test]
    async fn test_store_rejections_are_classified() {
        use fieldrep_core::Value;

        use crate::repository::test_support::memory_db;

        let db = memory_db().await;
        // contact.name is NOT NULL
        let err = db
            .contacts()
            .insert(vec![
                Value::Null,
                7.into(),
                Value::Null,
                Value::Null,
                Value::Null,
                Value::Null,
                Value::Null,
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotNullViolation(_)), "{:?}", err);

        let insert = "INSERT INTO contact (contactid, customerid, name) VALUES (5, 7, 'Jane')";
        db.executor().execute_sql(insert, &[]).await.unwrap();
        let err = db.executor().execute_sql(insert, &[]).await.unwrap_err();
        match err {
            DbError::UniqueViolation { target } => assert_eq!(target, "contact.contactid"),
            other => panic!("unexpected {:?}", other),
        }
    }
}

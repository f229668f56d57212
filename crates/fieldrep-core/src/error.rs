//! # Error Types
//!
//! Error types for statement construction and import validation.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fieldrep-core errors (this file)                                      │
//! │  ├── QueryError       - Malformed or unsupported statement requests    │
//! │  └── ValidationError  - Import rows that do not fit a descriptor       │
//! │                                                                         │
//! │  fieldrep-db errors (separate crate)                                   │
//! │  └── DbError          - Store failures, wraps both of the above        │
//! │                                                                         │
//! │  Flow: QueryError → DbError → caller checks the Result                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `QueryError` is always produced before anything reaches the store:
//! the façade rejects the request and the executor is never called.

use thiserror::Error;

use crate::query::QueryKind;

// =============================================================================
// Query Error
// =============================================================================

/// Statement construction errors.
///
/// Returned by the builders and the façade instead of panicking, so callers
/// get a typed error result carrying the table that was being addressed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The statement kind tag is not one the façade knows.
    #[error("Unknown query kind '{kind}' for table {table}")]
    UnknownKind { kind: String, table: String },

    /// UPDATE or DELETE requested without any filter.
    ///
    /// ## When This Occurs
    /// - A repository forgot to filter by identity
    /// - A caller passed an empty filter list on purpose
    ///
    /// Unbounded writes are never built.
    #[error("{operation} on {table} requires at least one filter")]
    MissingFilter { operation: QueryKind, table: String },

    /// UPDATE requested with an empty field list.
    #[error("UPDATE on {table} requires at least one field to set")]
    MissingUpdateFields { table: String },

    /// UPDATE tried to set the identity field.
    #[error("UPDATE on {table} cannot set identity field {field}")]
    IdentityUpdate { table: String, field: String },

    /// A filter clause other than the last one has no AND/OR.
    ///
    /// ## Example
    /// ```text
    /// [(customerid, =, None), (name, LIKE, None)]
    ///                  ^^^^ position 0 needs a conjunction
    /// ```
    #[error("Filter clause {position} on {table} needs a conjunction")]
    MissingConjunction { table: String, position: usize },

    /// Comparison operator outside the supported set.
    #[error("Unsupported comparison operator '{0}'")]
    UnsupportedOperator(String),

    /// Conjunction other than AND/OR.
    #[error("Unsupported conjunction '{0}'")]
    UnsupportedConjunction(String),

    /// A filter, update, or sort field is not part of the descriptor.
    #[error("Table {table} has no field {field}")]
    UnknownField { table: String, field: String },

    /// Descriptor field and type lists are not aligned.
    #[error("Table {table} declares {fields} fields but {types} types")]
    MalformedModel {
        table: String,
        fields: usize,
        types: usize,
    },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Import row validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A delimited record has the wrong number of columns.
    #[error("Line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A date field could not be parsed.
    #[error("{field} has invalid date '{value}'")]
    InvalidDate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with QueryError.
pub type CoreResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueryError::MissingFilter {
            operation: QueryKind::Delete,
            table: "contact".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "DELETE on contact requires at least one filter"
        );

        let err = QueryError::UnknownKind {
            kind: "merge".to_string(),
            table: "visit".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown query kind 'merge' for table visit");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::ColumnCount {
            line: 3,
            expected: 7,
            found: 6,
        };
        assert_eq!(err.to_string(), "Line 3: expected 7 columns, found 6");
    }
}

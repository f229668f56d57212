//! # Statement Executor
//!
//! Binds, runs, and normalizes the outcome of a built statement.
//!
//! ## One call, one scoped connection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  execute(stmt, values)                                                  │
//! │       │                                                                 │
//! │       ├── values.len() != placeholders ──► DbError::ArityMismatch       │
//! │       ▼                                                                 │
//! │  pool.begin()            ← connection checked out                       │
//! │       │                                                                 │
//! │       ├── bind values positionally                                      │
//! │       ├── SELECT  → fetch_all → Rows(Vec<Vec<Value>>)                   │
//! │       ├── INSERT  → execute   → Inserted(last_insert_rowid)             │
//! │       └── other   → execute   → Done { rows_affected }                  │
//! │       │                                                                 │
//! │  commit()                ← connection back in the pool                  │
//! │                                                                         │
//! │  Any sqlx error: transaction dropped (rollback), DbError returned       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Ok(ExecResult)` and `Err(DbError)` are the two halves of the
//! executor's outcome; a store error never escapes as a panic.

use fieldrep_core::query::{QueryKind, Statement};
use fieldrep_core::Value;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row as _, Sqlite, SqlitePool, TypeInfo, ValueRef};
use tracing::debug;

use crate::error::{DbError, DbResult};

// =============================================================================
// Result Shape
// =============================================================================

/// Successful outcome of one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecResult {
    /// SELECT: tuples aligned with the projected columns.
    Rows(Vec<Vec<Value>>),

    /// INSERT: identity assigned to the new row.
    Inserted(i64),

    /// CREATE, DROP, UPDATE, DELETE.
    Done { rows_affected: u64 },
}

impl ExecResult {
    /// Row tuples, empty for anything but a SELECT.
    pub fn into_rows(self) -> Vec<Vec<Value>> {
        match self {
            ExecResult::Rows(rows) => rows,
            _ => Vec::new(),
        }
    }

    pub fn inserted_id(&self) -> Option<i64> {
        match self {
            ExecResult::Inserted(id) => Some(*id),
            _ => None,
        }
    }

    pub fn rows_affected(&self) -> u64 {
        match self {
            ExecResult::Done { rows_affected } => *rows_affected,
            ExecResult::Inserted(_) => 1,
            ExecResult::Rows(_) => 0,
        }
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Runs statements against a pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Executor {
    pool: SqlitePool,
}

impl Executor {
    pub fn new(pool: SqlitePool) -> Self {
        Executor { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Executes a structured statement with positional values.
    ///
    /// ## Returns
    /// * `Ok(ExecResult::Rows(..))` - SELECT, possibly empty
    /// * `Ok(ExecResult::Inserted(id))` - INSERT
    /// * `Ok(ExecResult::Done { .. })` - everything else
    /// * `Err(DbError::ArityMismatch)` - wrong number of values, nothing ran
    /// * `Err(..)` - the store rejected the statement
    pub async fn execute(&self, stmt: &Statement, values: &[Value]) -> DbResult<ExecResult> {
        let expected = stmt.placeholder_count();
        if values.len() != expected {
            return Err(DbError::ArityMismatch {
                table: stmt.table().to_string(),
                expected,
                found: values.len(),
            });
        }

        let sql = stmt.to_sql();
        self.run(stmt.kind(), &sql, values).await
    }

    /// Executes raw SQL text, choosing the result shape from its leading
    /// keyword.
    pub async fn execute_sql(&self, sql: &str, values: &[Value]) -> DbResult<ExecResult> {
        let kind = QueryKind::from_sql(sql)
            .ok_or_else(|| DbError::QueryFailed(format!("Unrecognized statement: {}", sql)))?;
        self.run(kind, sql, values).await
    }

    async fn run(&self, kind: QueryKind, sql: &str, values: &[Value]) -> DbResult<ExecResult> {
        debug!(kind = %kind, sql = %sql, params = values.len(), "Executing statement");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let query = bind_values(sqlx::query(sql), values);

        let result = match kind {
            QueryKind::Select => {
                let rows = query.fetch_all(&mut *tx).await?;
                let decoded = rows.iter().map(decode_row).collect::<DbResult<Vec<_>>>()?;
                ExecResult::Rows(decoded)
            }
            QueryKind::Insert => {
                let done = query.execute(&mut *tx).await?;
                ExecResult::Inserted(done.last_insert_rowid())
            }
            QueryKind::Create | QueryKind::Drop | QueryKind::Update | QueryKind::Delete => {
                let done = query.execute(&mut *tx).await?;
                ExecResult::Done {
                    rows_affected: done.rows_affected(),
                }
            }
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(result)
    }
}

// =============================================================================
// Binding & Decoding
// =============================================================================

fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: &'q [Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            Value::Null => query.bind(None::<i64>),
            Value::Integer(i) => query.bind(*i),
            Value::Real(r) => query.bind(*r),
            Value::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}

fn decode_row(row: &SqliteRow) -> DbResult<Vec<Value>> {
    (0..row.len()).map(|index| decode_column(row, index)).collect()
}

/// Decodes by the runtime storage class, not the declared column type.
fn decode_column(row: &SqliteRow, index: usize) -> DbResult<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage = raw.type_info().name().to_string();

    let value = match storage.as_str() {
        "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" | "NUMERIC" => Value::Real(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            Value::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Value::Text(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}

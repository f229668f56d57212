//! # Repository Module
//!
//! Per-entity data access built from one descriptor, the query façade and
//! an executor.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  caller                                                                 │
//! │       │  contacts.load_for_customer(7)                                  │
//! │       ▼                                                                 │
//! │  ContactRepository  (domain helpers)                                    │
//! │       │  Deref                                                          │
//! │       ▼                                                                 │
//! │  Repository { model: &CONTACT, executor, cache }                        │
//! │       │                                                                 │
//! │       ├── build(kind, model, params)   fieldrep-core façade             │
//! │       └── executor.execute(stmt, values)                                │
//! │              │                                                          │
//! │              ▼                                                          │
//! │        SQLite Database                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Current row / current list
//! Each repository instance owns a cache holding the last row and the last
//! list it loaded, keyed by the `(field, value)` they were loaded with.
//! Loading the same key again is served from the cache; a different key
//! re-queries. The cache is dropped by [`Repository::clear`],
//! [`Repository::recreate_table`] and [`Repository::delete`]. Writes made
//! through other repository instances are not seen until then.
//!
//! ## Available Repositories
//!
//! - [`contact::ContactRepository`]
//! - [`customer::CustomerRepository`]
//! - [`employee::EmployeeRepository`]
//! - [`product::ProductRepository`]
//! - [`visit::VisitRepository`]
//! - [`detail::DetailRepository`] - order lines
//! - [`report::ReportRepository`]
//! - [`calculator::CalculatorRepository`] - monthly totals
//! - [`settings::SettingsRepository`]

pub mod calculator;
pub mod contact;
pub mod customer;
pub mod detail;
pub mod employee;
pub mod product;
pub mod report;
pub mod settings;
pub mod visit;

use chrono::NaiveDate;
use fieldrep_core::import::coerce_field;
use fieldrep_core::query::{build, Filter, QueryKind, QueryParams, Statement};
use fieldrep_core::{QueryError, Row, TableModel, ValidationError, Value, DATE_FORMAT};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::executor::Executor;

// =============================================================================
// Row Cache
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    field: String,
    value: Value,
}

impl CacheKey {
    fn new(field: &str, value: &Value) -> Self {
        CacheKey {
            field: field.to_string(),
            value: value.clone(),
        }
    }

    fn matches(&self, field: &str, value: &Value) -> bool {
        self.field == field && &self.value == value
    }
}

/// Last loaded row and list of one repository instance.
#[derive(Debug, Clone, Default)]
struct RowCache {
    row: Option<(CacheKey, Option<Row>)>,
    list: Option<(CacheKey, Vec<Row>)>,
}

impl RowCache {
    fn clear(&mut self) {
        self.row = None;
        self.list = None;
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Generic repository over one descriptor.
#[derive(Debug, Clone)]
pub struct Repository {
    model: &'static TableModel,
    executor: Executor,
    cache: RowCache,
}

impl Repository {
    pub fn new(model: &'static TableModel, executor: Executor) -> Self {
        Repository {
            model,
            executor,
            cache: RowCache::default(),
        }
    }

    pub fn model(&self) -> &'static TableModel {
        self.model
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Identity field, falling back to the first field.
    pub fn id_field(&self) -> &'static str {
        self.model
            .id_field
            .or_else(|| self.model.fields.first().copied())
            .unwrap_or_default()
    }

    /// A row with every field at its empty value: NULL identity, zero for
    /// numeric columns with a default, empty text otherwise.
    pub fn blank_row(&self) -> Row {
        let values = self
            .model
            .types
            .iter()
            .map(|decl| coerce_field(decl, ""))
            .collect();
        Row::zip(self.model.fields, values)
    }

    fn statement(&self, kind: QueryKind, params: &QueryParams) -> DbResult<Statement> {
        Ok(build(kind, self.model, params)?)
    }

    // -------------------------------------------------------------------------
    // Schema
    // -------------------------------------------------------------------------

    /// `CREATE TABLE IF NOT EXISTS`, safe to call on every startup.
    pub async fn create_table(&self) -> DbResult<()> {
        let stmt = self.statement(QueryKind::Create, &QueryParams::new())?;
        self.executor.execute(&stmt, &[]).await?;
        Ok(())
    }

    /// Drops and recreates the table, discarding every row and the cache.
    pub async fn recreate_table(&mut self) -> DbResult<()> {
        debug!(table = %self.model.name, "Recreating table");
        let drop = self.statement(QueryKind::Drop, &QueryParams::new())?;
        self.executor.execute(&drop, &[]).await?;
        self.create_table().await?;
        self.cache.clear();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Inserts one row given every field's value in descriptor order.
    ///
    /// Bind `Value::Null` for the identity to get a new rowid.
    pub async fn insert(&self, values: Vec<Value>) -> DbResult<i64> {
        if values.len() != self.model.width() {
            return Err(DbError::ArityMismatch {
                table: self.model.name.to_string(),
                expected: self.model.width(),
                found: values.len(),
            });
        }
        let stmt = self.statement(QueryKind::Insert, &QueryParams::new())?;
        let result = self.executor.execute(&stmt, &values).await?;
        result
            .inserted_id()
            .ok_or_else(|| DbError::Internal(format!("INSERT into {} returned no id", self.model.name)))
    }

    /// Inserts a row, taking missing fields as NULL.
    pub async fn insert_row(&self, row: &Row) -> DbResult<i64> {
        self.insert(row.values_of(self.model.fields)).await
    }

    /// Sets `fields` on the row with identity `id`.
    ///
    /// ## Returns
    /// * `Ok(())` - Row updated
    /// * `Err(DbError::NotFound)` - No row has that identity
    pub async fn update(&self, id: i64, fields: &[&str], mut values: Vec<Value>) -> DbResult<()> {
        let id_field = self.id_field();
        let params = QueryParams::new()
            .set(fields)
            .filter(Filter::eq(id_field));
        let stmt = self.statement(QueryKind::Update, &params)?;

        values.push(Value::Integer(id));
        let result = self.executor.execute(&stmt, &values).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found(self.model.name, id));
        }
        Ok(())
    }

    /// Writes every non-identity field of `row` to the row it identifies.
    pub async fn update_row(&self, row: &Row) -> DbResult<()> {
        let id_field = self.id_field();
        let id = row
            .get_i64(id_field)
            .ok_or_else(|| DbError::not_found(self.model.name, "<no identity>"))?;
        let fields = self.model.value_fields();
        self.update(id, &fields, row.values_of(&fields)).await
    }

    /// Deletes rows matching `filters`; returns how many went.
    ///
    /// Drops the cache.
    pub async fn delete_where(&mut self, filters: Vec<Filter>, values: &[Value]) -> DbResult<u64> {
        let stmt = self.statement(QueryKind::Delete, &QueryParams::new().filters(filters))?;
        let result = self.executor.execute(&stmt, values).await?;
        self.cache.clear();
        Ok(result.rows_affected())
    }

    /// Deletes the row with identity `id`.
    pub async fn delete(&mut self, id: i64) -> DbResult<u64> {
        let id_field = self.id_field();
        self.delete_where(vec![Filter::eq(id_field)], &[Value::Integer(id)])
            .await
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Runs a SELECT and zips each tuple against the projected labels.
    pub async fn find(&self, params: &QueryParams, values: &[Value]) -> DbResult<Vec<Row>> {
        let stmt = self.statement(QueryKind::Select, params)?;
        let labels = stmt.result_labels();
        let rows = self.executor.execute(&stmt, values).await?.into_rows();
        Ok(rows
            .into_iter()
            .map(|tuple| Row::zip(&labels, tuple))
            .collect())
    }

    /// Rows where `field = value`, ordered by identity.
    pub async fn find_by(&self, field: &str, value: impl Into<Value>) -> DbResult<Vec<Row>> {
        let params = QueryParams::new()
            .filter(Filter::eq(field))
            .order_by(self.id_field(), "ASC");
        self.find(&params, &[value.into()]).await
    }

    /// The row with identity `id`, if any.
    pub async fn find_by_id(&self, id: i64) -> DbResult<Option<Row>> {
        Ok(self.find_by(self.id_field(), id).await?.into_iter().next())
    }

    /// Every row, ordered by identity.
    pub async fn all(&self) -> DbResult<Vec<Row>> {
        let params = QueryParams::new().order_by(self.id_field(), "ASC");
        self.find(&params, &[]).await
    }

    /// Evaluates aggregate expressions, e.g. `sum(po_total) AS total`.
    ///
    /// Returns a single row labelled by the expressions' aliases.
    pub async fn aggregate(
        &self,
        expressions: &[&str],
        filters: Vec<Filter>,
        values: &[Value],
    ) -> DbResult<Row> {
        let params = expressions
            .iter()
            .fold(QueryParams::new().filters(filters), |p, e| p.aggregate(*e));
        Ok(self.find(&params, values).await?.into_iter().next().unwrap_or_default())
    }

    /// Number of rows in the table.
    pub async fn count(&self) -> DbResult<i64> {
        let row = self.aggregate(&["count(*) AS n"], Vec::new(), &[]).await?;
        Ok(row.get_i64("n").unwrap_or(0))
    }

    // -------------------------------------------------------------------------
    // Cached current row / list
    // -------------------------------------------------------------------------

    /// Loads the first row where `field = value` into the cache.
    ///
    /// Served from the cache when the same key was loaded last.
    pub async fn load(&mut self, field: &str, value: impl Into<Value>) -> DbResult<Option<&Row>> {
        self.model.require_field(field)?;
        let value = value.into();

        let cached = matches!(&self.cache.row, Some((key, _)) if key.matches(field, &value));
        if !cached {
            let row = self.find_by(field, value.clone()).await?.into_iter().next();
            self.cache.row = Some((CacheKey::new(field, &value), row));
        }
        Ok(self.current())
    }

    /// Loads by identity.
    pub async fn load_by_id(&mut self, id: i64) -> DbResult<Option<&Row>> {
        let id_field = self.id_field();
        self.load(id_field, id).await
    }

    /// Loads every row where `field = value` into the cached list.
    pub async fn load_list(&mut self, field: &str, value: impl Into<Value>) -> DbResult<&[Row]> {
        self.model.require_field(field)?;
        let value = value.into();

        let cached = matches!(&self.cache.list, Some((key, _)) if key.matches(field, &value));
        if !cached {
            let rows = self.find_by(field, value.clone()).await?;
            debug!(table = %self.model.name, field, rows = rows.len(), "Loaded list");
            self.cache.list = Some((CacheKey::new(field, &value), rows));
        }
        Ok(self.current_list())
    }

    /// The cached current row.
    pub fn current(&self) -> Option<&Row> {
        self.cache.row.as_ref().and_then(|(_, row)| row.as_ref())
    }

    /// The cached current list, empty when nothing was loaded.
    pub fn current_list(&self) -> &[Row] {
        self.cache
            .list
            .as_ref()
            .map(|(_, rows)| rows.as_slice())
            .unwrap_or(&[])
    }

    /// Changes one field of the cached current row, without writing it.
    pub fn set_current_field(&mut self, field: &str, value: impl Into<Value>) -> DbResult<()> {
        self.model.require_field(field)?;
        if Some(field) == self.model.id_field {
            return Err(QueryError::IdentityUpdate {
                table: self.model.name.to_string(),
                field: field.to_string(),
            }
            .into());
        }
        let table = self.model.name;
        let row = self
            .cache
            .row
            .as_mut()
            .and_then(|(_, row)| row.as_mut())
            .ok_or_else(|| DbError::not_found(table, "<no current row>"))?;
        row.set(field, value);
        Ok(())
    }

    /// Writes the cached current row back to the store.
    pub async fn update_current(&self) -> DbResult<()> {
        let row = self
            .current()
            .ok_or_else(|| DbError::not_found(self.model.name, "<no current row>"))?;
        self.update_row(row).await
    }

    /// Forgets the cached row and list.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// Parses a `YYYY-MM-DD` date column value.
pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        }
    })
}

// =============================================================================
// Entity Repository Newtypes
// =============================================================================

/// Declares a repository newtype over [`Repository`] for one descriptor.
///
/// The newtype derefs to the generic repository, so every generic
/// operation is available next to the entity's own helpers.
macro_rules! entity_repository {
    ($(#[$meta:meta])* $name:ident, $model:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(crate::repository::Repository);

        impl $name {
            pub fn new(executor: crate::executor::Executor) -> Self {
                $name(crate::repository::Repository::new(&$model, executor))
            }
        }

        impl std::ops::Deref for $name {
            type Target = crate::repository::Repository;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}

pub(crate) use entity_repository;

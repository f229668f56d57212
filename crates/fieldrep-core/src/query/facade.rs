//! # Query Façade
//!
//! Single entry point turning "kind + descriptor + parameters" into a
//! [`Statement`].
//!
//! ## Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  build(kind, model, params)                                             │
//! │       │                                                                 │
//! │       ├── UPDATE/DELETE with no filters? ──► QueryError::MissingFilter  │
//! │       │                                                                 │
//! │       ├── sort_order → uppercase → ASC | DESC | (dropped)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  builder::{create, drop, insert, select, update, delete}                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Statement (unchanged)                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreResult, QueryError};
use crate::model::TableModel;
use crate::query::builder;
use crate::query::filter::Filter;
use crate::query::statement::{QueryKind, SortOrder, Statement};

/// Statement-specific parameters. Every field is optional.
///
/// ## Example
/// ```rust
/// use fieldrep_core::query::{build, Filter, QueryKind, QueryParams};
/// use fieldrep_core::schema::CONTACT;
///
/// let params = QueryParams::new()
///     .filter(Filter::eq("customerid"))
///     .order_by("name", "asc");
/// let stmt = build(QueryKind::Select, &CONTACT, &params).unwrap();
/// assert!(stmt.to_sql().ends_with("WHERE customerid = ? ORDER BY name ASC"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// Field used for `ORDER BY`. Defaults to the identity field.
    pub selection: Option<String>,

    /// Fields an UPDATE sets, aligned with the bound values.
    pub update_fields: Vec<String>,

    /// Literal aggregate expressions replacing the field projection.
    pub aggregates: Vec<String>,

    /// WHERE clauses.
    pub filters: Vec<Filter>,

    /// `ASC`/`DESC` in any case; anything else is ignored.
    pub sort_order: Option<String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter clause.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replaces the filter list.
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters = filters.into_iter().collect();
        self
    }

    /// Sets the UPDATE field list.
    pub fn set<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.update_fields = fields.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    /// Appends an aggregate expression.
    pub fn aggregate(mut self, expr: impl Into<String>) -> Self {
        self.aggregates.push(expr.into());
        self
    }

    /// Orders by `field` in `order` direction.
    pub fn order_by(mut self, field: impl Into<String>, order: impl Into<String>) -> Self {
        self.selection = Some(field.into());
        self.sort_order = Some(order.into());
        self
    }
}

/// Builds a statement of `kind` for `model`.
pub fn build(kind: QueryKind, model: &TableModel, params: &QueryParams) -> CoreResult<Statement> {
    if matches!(kind, QueryKind::Update | QueryKind::Delete) && params.filters.is_empty() {
        return Err(QueryError::MissingFilter {
            operation: kind,
            table: model.name.to_string(),
        });
    }

    match kind {
        QueryKind::Create => builder::create(model),
        QueryKind::Drop => builder::drop(model),
        QueryKind::Insert => builder::insert(model),
        QueryKind::Select => {
            let order = params
                .sort_order
                .as_deref()
                .and_then(SortOrder::normalize)
                .map(|order| (sort_field(model, params), order));
            builder::select(model, &params.aggregates, &params.filters, order)
        }
        QueryKind::Update => builder::update(model, &params.update_fields, &params.filters),
        QueryKind::Delete => builder::delete(model, &params.filters),
    }
}

/// Builds from a textual kind tag such as `"select"`.
///
/// Unknown tags come back as [`QueryError::UnknownKind`] naming the table.
pub fn build_tagged(tag: &str, model: &TableModel, params: &QueryParams) -> CoreResult<Statement> {
    let kind = QueryKind::parse(tag).ok_or_else(|| QueryError::UnknownKind {
        kind: tag.to_string(),
        table: model.name.to_string(),
    })?;
    build(kind, model, params)
}

fn sort_field<'a>(model: &'a TableModel, params: &'a QueryParams) -> &'a str {
    params
        .selection
        .as_deref()
        .or(model.id_field)
        .unwrap_or(model.fields.first().copied().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CONTACT, REPORT};

    #[test]
    fn test_unknown_kind_names_the_table() {
        assert_eq!(
            build_tagged("upsert", &CONTACT, &QueryParams::new()),
            Err(QueryError::UnknownKind {
                kind: "upsert".to_string(),
                table: "contact".to_string(),
            })
        );
        assert!(build_tagged("SELECT", &CONTACT, &QueryParams::new()).is_ok());
    }

    #[test]
    fn test_writes_without_filters_are_rejected() {
        let params = QueryParams::new().set(&["name"]);
        for kind in [QueryKind::Update, QueryKind::Delete] {
            assert_eq!(
                build(kind, &CONTACT, &params),
                Err(QueryError::MissingFilter {
                    operation: kind,
                    table: "contact".to_string(),
                })
            );
        }
    }

    #[test]
    fn test_sort_order_is_normalized_or_dropped() {
        let desc = QueryParams::new().order_by("rep_date", "desc");
        assert!(build(QueryKind::Select, &REPORT, &desc)
            .unwrap()
            .to_sql()
            .ends_with("FROM report ORDER BY rep_date DESC"));

        let bogus = QueryParams::new().order_by("rep_date", "sideways");
        assert!(build(QueryKind::Select, &REPORT, &bogus)
            .unwrap()
            .to_sql()
            .ends_with("FROM report"));
    }

    #[test]
    fn test_sort_defaults_to_identity_field() {
        let params = QueryParams {
            sort_order: Some("Asc".to_string()),
            ..QueryParams::default()
        };
        assert!(build(QueryKind::Select, &CONTACT, &params)
            .unwrap()
            .to_sql()
            .ends_with("ORDER BY contactid ASC"));
    }

    #[test]
    fn test_filter_chain_produces_n_predicates() {
        let params = QueryParams::new().filters([
            Filter::eq("customerid").and(),
            Filter::like("name").or(),
            Filter::eq("email"),
        ]);
        let stmt = build(QueryKind::Delete, &CONTACT, &params).unwrap();
        assert_eq!(
            stmt.to_sql(),
            "DELETE FROM contact WHERE customerid = ? AND name LIKE ? OR email = ?"
        );
        assert_eq!(stmt.placeholder_count(), 3);
    }
}

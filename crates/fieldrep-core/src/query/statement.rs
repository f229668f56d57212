//! # Statements
//!
//! Structured form of every statement the builders produce. Text is only
//! produced by [`Statement::to_sql`], which the executor calls right before
//! handing the statement to the store.
//!
//! ## Statement grammar
//! ```text
//! CREATE TABLE IF NOT EXISTS t (f1 T1, f2 T2, ...)
//! DROP TABLE IF EXISTS t
//! INSERT INTO t (f1, f2, ...) VALUES (?, ?, ...)
//! SELECT f1, f2, ... FROM t [WHERE p] [ORDER BY f ASC|DESC]
//! SELECT agg1, agg2 FROM t [WHERE p] [ORDER BY f ASC|DESC]
//! UPDATE t SET f1=?, f2=? WHERE p
//! DELETE FROM t WHERE p
//! ```

use std::fmt;

use crate::query::filter::Predicate;

// =============================================================================
// Query Kind
// =============================================================================

/// Statement kinds the façade dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Create,
    Drop,
    Insert,
    Select,
    Update,
    Delete,
}

impl QueryKind {
    /// Parses a textual kind tag, case-insensitively.
    pub fn parse(tag: &str) -> Option<QueryKind> {
        match tag.trim().to_lowercase().as_str() {
            "create" => Some(QueryKind::Create),
            "drop" => Some(QueryKind::Drop),
            "insert" => Some(QueryKind::Insert),
            "select" => Some(QueryKind::Select),
            "update" => Some(QueryKind::Update),
            "delete" => Some(QueryKind::Delete),
            _ => None,
        }
    }

    /// Derives the kind from the leading keyword of a SQL string.
    pub fn from_sql(sql: &str) -> Option<QueryKind> {
        let keyword = sql.split_whitespace().next()?;
        QueryKind::parse(keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Create => "CREATE",
            QueryKind::Drop => "DROP",
            QueryKind::Insert => "INSERT",
            QueryKind::Select => "SELECT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sort Order
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Uppercases `order` and accepts exactly `ASC` or `DESC`.
    ///
    /// Anything else means "no ordering", not an error.
    pub fn normalize(order: &str) -> Option<SortOrder> {
        match order.to_uppercase().as_str() {
            "ASC" => Some(SortOrder::Asc),
            "DESC" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// `ORDER BY field ASC|DESC`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: &'static str,
    pub order: SortOrder,
}

// =============================================================================
// Projection
// =============================================================================

/// SELECT column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Every descriptor field, in descriptor order. Never `*`.
    Fields(Vec<&'static str>),

    /// Literal aggregate expressions, e.g. `sum(po_total) AS total`.
    Aggregates(Vec<String>),
}

impl Projection {
    /// Labels a fetched tuple is zipped against.
    ///
    /// Aggregates are labelled by their `AS` alias, or by the bare
    /// expression when there is none.
    pub fn labels(&self) -> Vec<String> {
        match self {
            Projection::Fields(fields) => fields.iter().map(|f| f.to_string()).collect(),
            Projection::Aggregates(exprs) => exprs.iter().map(|e| aggregate_label(e)).collect(),
        }
    }
}

fn aggregate_label(expr: &str) -> String {
    match top_level_alias(expr) {
        Some(pos) => expr[pos + 4..].trim().to_string(),
        None => expr.trim().to_string(),
    }
}

/// Byte offset of the last ` AS ` outside parentheses.
fn top_level_alias(expr: &str) -> Option<usize> {
    let bytes = expr.as_bytes();
    let mut depth = 0usize;
    let mut found = None;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b' ' if depth == 0
                && bytes.len() >= i + 4
                && bytes[i..i + 4].eq_ignore_ascii_case(b" AS ") =>
            {
                found = Some(i);
            }
            _ => {}
        }
    }
    found
}

// =============================================================================
// Statement
// =============================================================================

/// A fully validated, single-table statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable {
        table: &'static str,
        columns: Vec<(&'static str, &'static str)>,
    },
    DropTable {
        table: &'static str,
    },
    Insert {
        table: &'static str,
        fields: Vec<&'static str>,
    },
    Select {
        table: &'static str,
        projection: Projection,
        filter: Option<Predicate>,
        order: Option<OrderBy>,
    },
    Update {
        table: &'static str,
        set: Vec<&'static str>,
        filter: Predicate,
    },
    Delete {
        table: &'static str,
        filter: Predicate,
    },
}

impl Statement {
    pub fn kind(&self) -> QueryKind {
        match self {
            Statement::CreateTable { .. } => QueryKind::Create,
            Statement::DropTable { .. } => QueryKind::Drop,
            Statement::Insert { .. } => QueryKind::Insert,
            Statement::Select { .. } => QueryKind::Select,
            Statement::Update { .. } => QueryKind::Update,
            Statement::Delete { .. } => QueryKind::Delete,
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Statement::CreateTable { table, .. }
            | Statement::DropTable { table }
            | Statement::Insert { table, .. }
            | Statement::Select { table, .. }
            | Statement::Update { table, .. }
            | Statement::Delete { table, .. } => *table,
        }
    }

    /// Number of `?` placeholders, i.e. how many values must be bound.
    pub fn placeholder_count(&self) -> usize {
        match self {
            Statement::CreateTable { .. } | Statement::DropTable { .. } => 0,
            Statement::Insert { fields, .. } => fields.len(),
            Statement::Select { filter, .. } => filter.as_ref().map_or(0, Predicate::len),
            Statement::Update { set, filter, .. } => set.len() + filter.len(),
            Statement::Delete { filter, .. } => filter.len(),
        }
    }

    /// Labels of the result columns. Empty for non-SELECT statements.
    pub fn result_labels(&self) -> Vec<String> {
        match self {
            Statement::Select { projection, .. } => projection.labels(),
            _ => Vec::new(),
        }
    }

    /// Serializes to SQL text.
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::CreateTable { table, columns } => {
                let defs: Vec<String> = columns
                    .iter()
                    .map(|(field, ty)| format!("{} {}", field, ty))
                    .collect();
                write!(f, "CREATE TABLE IF NOT EXISTS {} ({})", table, defs.join(", "))
            }
            Statement::DropTable { table } => write!(f, "DROP TABLE IF EXISTS {}", table),
            Statement::Insert { table, fields } => {
                let placeholders = vec!["?"; fields.len()].join(", ");
                write!(
                    f,
                    "INSERT INTO {} ({}) VALUES ({})",
                    table,
                    fields.join(", "),
                    placeholders
                )
            }
            Statement::Select {
                table,
                projection,
                filter,
                order,
            } => {
                let columns = match projection {
                    Projection::Fields(fields) => fields.join(", "),
                    Projection::Aggregates(exprs) => exprs.join(", "),
                };
                write!(f, "SELECT {} FROM {}", columns, table)?;
                if let Some(filter) = filter {
                    write!(f, " WHERE {}", filter)?;
                }
                if let Some(order) = order {
                    write!(f, " ORDER BY {} {}", order.field, order.order.as_str())?;
                }
                Ok(())
            }
            Statement::Update { table, set, filter } => {
                let assignments: Vec<String> = set.iter().map(|f| format!("{}=?", f)).collect();
                write!(
                    f,
                    "UPDATE {} SET {} WHERE {}",
                    table,
                    assignments.join(", "),
                    filter
                )
            }
            Statement::Delete { table, filter } => {
                write!(f, "DELETE FROM {} WHERE {}", table, filter)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!(QueryKind::parse("Select"), Some(QueryKind::Select));
        assert_eq!(QueryKind::parse("merge"), None);
        assert_eq!(
            QueryKind::from_sql("  insert INTO x (a) VALUES (?)"),
            Some(QueryKind::Insert)
        );
        assert_eq!(QueryKind::from_sql(""), None);
    }

    #[test]
    fn test_sort_order_normalize() {
        assert_eq!(SortOrder::normalize("desc"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::normalize("Asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::normalize(" asc "), None);
        assert_eq!(SortOrder::normalize("ascending"), None);
    }

    #[test]
    fn test_aggregate_labels() {
        let projection = Projection::Aggregates(vec![
            "sum(po_total) AS total".to_string(),
            "count(visitid) as visits".to_string(),
            "max(rep_no)".to_string(),
        ]);
        assert_eq!(projection.labels(), vec!["total", "visits", "max(rep_no)"]);
    }

    #[test]
    fn test_cast_inside_aggregate_is_not_an_alias() {
        let projection = Projection::Aggregates(vec![
            "sum(CAST(pcs AS REAL))".to_string(),
            "sum(CAST(pcs AS REAL)) AS pieces".to_string(),
        ]);
        assert_eq!(projection.labels(), vec!["sum(CAST(pcs AS REAL))", "pieces"]);
    }
}

//! # Filter Grammar
//!
//! Filters are what callers hand in; predicates are what statements hold.
//!
//! ## From filters to a predicate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  [ (customerid, "=", Some(AND)), (name, "like", None) ]                 │
//! │        │                                                                │
//! │        ▼  Predicate::from_filters (checks fields + conjunctions)        │
//! │  first: customerid = ?                                                  │
//! │  rest:  [ (AND, name LIKE ?) ]                                          │
//! │        │                                                                │
//! │        ▼  render                                                        │
//! │  "customerid = ? AND name LIKE ?"                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A predicate stores the conjunction *between* two comparisons, so a
//! rendered clause can never contain two comparisons with nothing between
//! them. A non-terminal filter without a conjunction is rejected while
//! building; a conjunction on the last filter is ignored.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreResult, QueryError};
use crate::model::TableModel;

// =============================================================================
// Operator
// =============================================================================

/// Comparison operators accepted in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl Operator {
    /// SQL spelling, always uppercase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Like => "LIKE",
        }
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "=" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "LIKE" => Ok(Operator::Like),
            _ => Err(QueryError::UnsupportedOperator(s.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Conjunction
// =============================================================================

/// Boolean conjunction between two filter clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

impl FromStr for Conjunction {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AND" => Ok(Conjunction::And),
            "OR" => Ok(Conjunction::Or),
            _ => Err(QueryError::UnsupportedConjunction(s.to_string())),
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Filter
// =============================================================================

/// One filter clause as supplied by a caller.
///
/// ## Example
/// ```rust
/// use fieldrep_core::query::Filter;
///
/// let filters = vec![Filter::eq("customerid").and(), Filter::like("name")];
/// assert_eq!(filters.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub op: Operator,
    /// Joins this clause to the next one. Required on all but the last.
    pub conjunction: Option<Conjunction>,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: Operator) -> Self {
        Filter {
            field: field.into(),
            op,
            conjunction: None,
        }
    }

    /// `field = ?`
    pub fn eq(field: impl Into<String>) -> Self {
        Filter::new(field, Operator::Eq)
    }

    /// `field LIKE ?`
    pub fn like(field: impl Into<String>) -> Self {
        Filter::new(field, Operator::Like)
    }

    /// Parses textual operator/conjunction, uppercasing both.
    pub fn parse(field: &str, op: &str, conjunction: Option<&str>) -> CoreResult<Self> {
        Ok(Filter {
            field: field.to_string(),
            op: op.parse()?,
            conjunction: conjunction.map(str::parse).transpose()?,
        })
    }

    /// Chains the next clause with AND.
    pub fn and(mut self) -> Self {
        self.conjunction = Some(Conjunction::And);
        self
    }

    /// Chains the next clause with OR.
    pub fn or(mut self) -> Self {
        self.conjunction = Some(Conjunction::Or);
        self
    }
}

// =============================================================================
// Predicate
// =============================================================================

/// `field OP ?`, with the field resolved against a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub field: &'static str,
    pub op: Operator,
}

/// A validated WHERE clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    first: Comparison,
    rest: Vec<(Conjunction, Comparison)>,
}

impl Predicate {
    /// Validates filters against `model` and links them.
    ///
    /// Returns `Ok(None)` for an empty filter list.
    pub fn from_filters(model: &TableModel, filters: &[Filter]) -> CoreResult<Option<Self>> {
        let mut comparisons = Vec::with_capacity(filters.len());
        for filter in filters {
            let index = model
                .field_index(&filter.field)
                .ok_or_else(|| QueryError::UnknownField {
                    table: model.name.to_string(),
                    field: filter.field.clone(),
                })?;
            comparisons.push(Comparison {
                field: model.fields[index],
                op: filter.op,
            });
        }

        let mut iter = comparisons.into_iter();
        let first = match iter.next() {
            Some(first) => first,
            None => return Ok(None),
        };

        // Clause i joins to clause i + 1 through filters[i].conjunction
        let mut rest = Vec::with_capacity(filters.len() - 1);
        for (position, comparison) in iter.enumerate() {
            let conjunction =
                filters[position]
                    .conjunction
                    .ok_or_else(|| QueryError::MissingConjunction {
                        table: model.name.to_string(),
                        position,
                    })?;
            rest.push((conjunction, comparison));
        }

        Ok(Some(Predicate { first, rest }))
    }

    /// Number of comparisons, which is also the number of placeholders.
    /// Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// Comparisons in order.
    pub fn comparisons(&self) -> impl Iterator<Item = &Comparison> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, c)| c))
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ?", self.field, self.op)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (conjunction, comparison) in &self.rest {
            write!(f, " {} {}", conjunction, comparison)?;
        }
        Ok(())
    }
}

//! # Query Construction
//!
//! The statement builders and the façade that dispatches to them.
//!
//! ## Layers
//! - [`filter`] - Filter clauses and validated WHERE predicates
//! - [`statement`] - Structured statements, serialized to SQL on demand
//! - [`builder`] - One pure builder per statement kind
//! - [`facade`] - Kind dispatch plus parameter validation

pub mod builder;
pub mod facade;
pub mod filter;
pub mod statement;

pub use facade::{build, build_tagged, QueryParams};
pub use filter::{Comparison, Conjunction, Filter, Operator, Predicate};
pub use statement::{OrderBy, Projection, QueryKind, SortOrder, Statement};

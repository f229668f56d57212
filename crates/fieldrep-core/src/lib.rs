//! # fieldrep-core: Descriptors and Statement Construction
//!
//! This crate holds everything about fieldrep's tables that does not need a
//! database: the per-entity table models, the statement builders, the
//! façade that dispatches on statement kind, and the rules for turning
//! delimited import records into typed values.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        fieldrep Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          fieldrep-sync (settings-driven HTTP pull)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │     fieldrep-db (executor, repositories, CSV import, workers)   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ fieldrep-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   model   │  │  schema   │  │   query   │  │  import   │   │   │
//! │  │   │TableModel │  │ 9 tables  │  │ builders  │  │ coercion  │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`model`] - Table-model descriptor (name, identity, fields, types)
//! - [`schema`] - The nine entity descriptors
//! - [`query`] - Filters, statements, builders and the façade
//! - [`value`] - Dynamically typed column values and rows
//! - [`import`] - Import kinds, formats and field coercion
//! - [`error`] - Query and validation errors
//!
//! ## Example Usage
//!
//! ```rust
//! use fieldrep_core::query::{build, Filter, QueryKind, QueryParams};
//! use fieldrep_core::schema::CONTACT;
//!
//! let params = QueryParams::new().filter(Filter::eq("customerid"));
//! let stmt = build(QueryKind::Select, &CONTACT, &params).unwrap();
//!
//! assert_eq!(
//!     stmt.to_sql(),
//!     "SELECT contactid, customerid, name, department, email, phone, infotext \
//!      FROM contact WHERE customerid = ?"
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod import;
pub mod model;
pub mod query;
pub mod schema;
pub mod value;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreResult, QueryError, ValidationError};
pub use import::{ImportFormat, ImportKind, ImportSpec};
pub use model::TableModel;
pub use schema::Entity;
pub use value::{Row, Value};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Row id of the single settings record.
pub const SETTINGS_ROW_ID: i64 = 1;

/// Date format used by report and visit date columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

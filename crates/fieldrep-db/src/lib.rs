//! # fieldrep-db: Database Layer for fieldrep
//!
//! This crate runs the statements built by `fieldrep-core` against a local
//! SQLite database, using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        fieldrep Data Flow                               │
//! │                                                                         │
//! │  caller (import CLI, sync agent)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  fieldrep-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │   Import     │   │   │
//! │  │   │   (pool.rs)   │    │ (repository/) │    │ (import.rs,  │   │   │
//! │  │   │               │    │               │    │  workers.rs) │   │   │
//! │  │   │ SqlitePool    │◄───│ Executor      │◄───│ csv records  │   │   │
//! │  │   │ schema setup  │    │ row caches    │    │ one per kind │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, schema setup, repository access
//! - [`executor`] - Binds and runs statements, normalizes results
//! - [`repository`] - Generic and per-entity repositories
//! - [`import`] - Destructive CSV reimport
//! - [`workers`] - Background import workers
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fieldrep_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/fieldrep.db")).await?;
//!
//! let mut contacts = db.contacts();
//! for contact in contacts.load_for_customer(7).await? {
//!     println!("{}", contact.get_str("name").unwrap_or_default());
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod executor;
pub mod import;
pub mod pool;
pub mod repository;
pub mod workers;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use executor::{ExecResult, Executor};
pub use pool::{Database, DbConfig};
pub use workers::ImportWorkers;

// Repository re-exports for convenience
pub use repository::calculator::CalculatorRepository;
pub use repository::contact::{ContactRepository, NewContact};
pub use repository::customer::CustomerRepository;
pub use repository::detail::{DetailRepository, NewLine, VisitTotals};
pub use repository::employee::EmployeeRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::settings::SettingsRepository;
pub use repository::visit::{NewVisit, VisitRepository};
pub use repository::Repository;

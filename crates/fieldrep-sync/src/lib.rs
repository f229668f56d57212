//! # fieldrep-sync: Catalog Pull for fieldrep
//!
//! Downloads the customer and product files published by the sync server
//! and applies them to the local database.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Pull Architecture                              │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                       SyncAgent                                  │  │
//! │  │  pull_customers(rep)         pull_products()                     │  │
//! │  └────────────┬───────────────────────────┬─────────────────────────┘  │
//! │               │                           │                             │
//! │               ▼                           ▼                             │
//! │  ┌────────────────────┐  ┌────────────────────┐  ┌──────────────────┐  │
//! │  │   SyncEndpoint     │  │   HttpFetcher      │  │    records       │  │
//! │  │                    │  │                    │  │                  │  │
//! │  │ URL template from  │  │ ureq GET, short    │  │ CRLF/`|` split,  │  │
//! │  │ the settings row   │  │ timeouts, failure  │  │ rep filter,      │  │
//! │  │                    │  │ ⇒ empty body       │  │ descriptor order │  │
//! │  └────────────────────┘  └────────────────────┘  └──────────────────┘  │
//! │                                                                         │
//! │  fieldrep-db repositories: customers (upsert), products (replace),     │
//! │  settings (sync stamps)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`agent`] - `SyncAgent` pulls
//! - [`config`] - Local TOML configuration
//! - [`endpoint`] - Download URL template
//! - [`http`] - Blocking HTTP fetch on a worker thread
//! - [`records`] - Record splitting and reshaping
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fieldrep_db::{Database, DbConfig};
//! use fieldrep_sync::{HttpFetcher, SyncAgent, SyncConfig};
//!
//! let config = SyncConfig::load_or_default(None);
//! let db = Database::new(DbConfig::new(&config.database.path)).await?;
//!
//! let agent = SyncAgent::new(db, HttpFetcher::new(&config.http))
//!     .with_base_url(config.http.base_url.clone());
//! let summary = agent.pull_products().await?;
//! println!("{} products", summary.inserted);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod records;

// =============================================================================
// Re-exports
// =============================================================================

pub use agent::{PullSummary, SyncAgent};
pub use config::{HttpSettings, SyncConfig};
pub use endpoint::SyncEndpoint;
pub use error::{SyncError, SyncResult};
pub use http::{Fetcher, HttpFetcher};

//! # Sync Agent
//!
//! Pulls customer and product files from the sync server into the local
//! database.
//!
//! ## Pull Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  settings row ──► SyncEndpoint ──► url                                  │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                              Fetcher::fetch  (failure ⇒ empty)          │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                   sanitize ► split_records ► customer/product rows      │
//! │                                     │                                   │
//! │              no records ◄───────────┤                                   │
//! │              (nothing touched)      ▼                                   │
//! │                    customers: upsert by account                         │
//! │                    products:  drop + reinsert                           │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                    stamp last_customer_sync / last_product_sync         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use fieldrep_core::Value;
use fieldrep_db::Database;
use serde::Serialize;
use tracing::{info, warn};

use crate::endpoint::SyncEndpoint;
use crate::error::SyncResult;
use crate::http::{Fetcher, HttpFetcher};
use crate::records::{customer_rows, product_rows, sanitize, split_records};

const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of one pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PullSummary {
    /// Records in the downloaded file.
    pub records: usize,
    pub inserted: usize,
    pub updated: usize,
}

impl PullSummary {
    /// True when the pull changed nothing.
    pub fn is_empty(&self) -> bool {
        self.inserted == 0 && self.updated == 0
    }
}

pub struct SyncAgent<F = HttpFetcher> {
    db: Database,
    fetcher: F,
    base_url: Option<String>,
}

impl<F: Fetcher> SyncAgent<F> {
    pub fn new(db: Database, fetcher: F) -> Self {
        SyncAgent {
            db,
            fetcher,
            base_url: None,
        }
    }

    /// Overrides the server base stored in the settings row.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Endpoint for the next pull, read fresh from the settings row.
    pub async fn endpoint(&self) -> SyncResult<SyncEndpoint> {
        let row = self.db.settings().get().await?;
        let mut endpoint = SyncEndpoint::from_settings(&row);
        if let Some(base) = &self.base_url {
            endpoint = endpoint.with_base(base.as_str());
        }
        endpoint.validate()?;
        Ok(endpoint)
    }

    /// Upserts the customers of `salesrep` from the customer file.
    ///
    /// Customers are matched on `account`; new ones are linked to the
    /// employee with the same rep code when there is one.
    pub async fn pull_customers(&self, salesrep: &str) -> SyncResult<PullSummary> {
        let url = self.endpoint().await?.customers_url();
        let records = split_records(&sanitize(&self.fetcher.fetch(&url).await));

        let mut summary = PullSummary {
            records: records.len(),
            ..PullSummary::default()
        };
        if records.is_empty() {
            warn!(url = %url, "Customer pull got no records");
            return Ok(summary);
        }

        let employeeid = self
            .db
            .employees()
            .find_by_salesrep(salesrep)
            .await?
            .and_then(|row| row.get_i64("employeeid"));

        let customers = self.db.customers();
        for mut values in customer_rows(&records, salesrep) {
            if let Some(id) = employeeid {
                values[1] = Value::Integer(id);
            }
            let (_, inserted) = customers.upsert_by_account(values).await?;
            if inserted {
                summary.inserted += 1;
            } else {
                summary.updated += 1;
            }
        }

        self.stamp("last_customer_sync").await?;
        info!(
            salesrep = %salesrep,
            records = summary.records,
            inserted = summary.inserted,
            updated = summary.updated,
            "Customers pulled"
        );
        Ok(summary)
    }

    /// Replaces the product catalog with the product file.
    pub async fn pull_products(&self) -> SyncResult<PullSummary> {
        let url = self.endpoint().await?.products_url();
        let records = split_records(&sanitize(&self.fetcher.fetch(&url).await));

        let mut summary = PullSummary {
            records: records.len(),
            ..PullSummary::default()
        };
        let rows = product_rows(&records);
        if rows.is_empty() {
            warn!(url = %url, records = records.len(), "Product pull got no usable records");
            return Ok(summary);
        }

        summary.inserted = self.db.products().replace_all(rows).await?;

        self.stamp("last_product_sync").await?;
        info!(
            records = summary.records,
            products = summary.inserted,
            "Products pulled"
        );
        Ok(summary)
    }

    async fn stamp(&self, field: &str) -> SyncResult<()> {
        let now = Utc::now().format(STAMP_FORMAT).to_string();
        self.db.settings().stamp(field, now).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use fieldrep_core::schema::PRODUCT;
    use fieldrep_core::Row;
    use fieldrep_db::DbConfig;

    use super::*;

    const BASE: &str = "https://sync.example.com";

    /// Serves canned bodies; unknown URLs are "unreachable".
    #[derive(Default)]
    struct CannedFetcher {
        bodies: HashMap<String, Vec<u8>>,
        requested: Mutex<Vec<String>>,
    }

    impl CannedFetcher {
        fn serve(mut self, path: &str, body: &str) -> Self {
            self.bodies
                .insert(format!("{}{}", BASE, path), body.as_bytes().to_vec());
            self
        }
    }

    impl Fetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Vec<u8> {
            self.requested.lock().unwrap().push(url.to_string());
            self.bodies.get(url).cloned().unwrap_or_default()
        }
    }

    fn stamped(settings: &Row, field: &str) -> bool {
        settings.get_str(field).is_some_and(|s| !s.is_empty())
    }

    async fn agent(fetcher: CannedFetcher) -> SyncAgent<CannedFetcher> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        SyncAgent::new(db, fetcher).with_base_url(Some(BASE.to_string()))
    }

    #[tokio::test]
    async fn test_pull_customers_upserts_rep_records() {
        let fetcher = CannedFetcher::default().serve(
            "/dk/customers.txt",
            "1001|Acme|Main St 1||8000|Aarhus|DK|R7|555-1||DK1|a@acme.dk|1|\r\n\
             1002|Beta|Side St 2||9000|Aalborg|DK|R8|555-2||DK2|b@beta.dk|1|\r\n",
        );
        let agent = agent(fetcher).await;
        agent
            .db
            .employees()
            .insert(vec![
                Value::Null,
                "R7".into(),
                "Rita Seven".into(),
                Value::Null,
                Value::Null,
                0.into(),
            ])
            .await
            .unwrap();

        let first = agent.pull_customers("R7").await.unwrap();
        assert_eq!(
            first,
            PullSummary {
                records: 2,
                inserted: 1,
                updated: 0
            }
        );

        let again = agent.pull_customers("R7").await.unwrap();
        assert_eq!(again.updated, 1);
        assert_eq!(again.inserted, 0);

        let customers = agent.db.customers();
        assert_eq!(customers.count().await.unwrap(), 1);
        let acme = customers.find_by_account("1001").await.unwrap().unwrap();
        assert_eq!(acme.get_i64("employeeid"), Some(1));
        assert!(customers.find_by_account("1002").await.unwrap().is_none());

        let settings = agent.db.settings().get().await.unwrap();
        assert!(stamped(&settings, "last_customer_sync"));
        assert!(!stamped(&settings, "last_product_sync"));
    }

    #[tokio::test]
    async fn test_pull_products_replaces_catalog() {
        let fetcher = CannedFetcher::default().serve(
            "/dk/products.txt",
            "SKU-1|Widget|||W|9,95|||||||||||\nSKU-2|Gadget|||G|5|||||||||||\n",
        );
        let agent = agent(fetcher).await;

        let summary = agent.pull_products().await.unwrap();
        assert_eq!(summary.inserted, 2);
        let widget = agent.db.products().find_by_sku("SKU-1").await.unwrap().unwrap();
        assert_eq!(widget.get_f64("price"), Some(9.95));

        // A second pull replaces rather than appends
        agent.pull_products().await.unwrap();
        assert_eq!(agent.db.products().count().await.unwrap(), 2);
        let settings = agent.db.settings().get().await.unwrap();
        assert!(stamped(&settings, "last_product_sync"));
    }

    #[tokio::test]
    async fn test_unreachable_server_changes_nothing() {
        let agent = agent(CannedFetcher::default()).await;
        let mut keep = vec![Value::Null; PRODUCT.width()];
        keep[1] = "KEEP".into();
        agent.db.products().insert(keep).await.unwrap();

        assert!(agent.pull_products().await.unwrap().is_empty());
        assert!(agent.pull_customers("R7").await.unwrap().is_empty());
        assert_eq!(agent.db.products().count().await.unwrap(), 1);

        let settings = agent.db.settings().get().await.unwrap();
        assert!(!stamped(&settings, "last_product_sync"));
        assert_eq!(
            agent.fetcher.requested.lock().unwrap().as_slice(),
            [
                format!("{}/dk/products.txt", BASE),
                format!("{}/dk/customers.txt", BASE)
            ]
        );
    }

    #[tokio::test]
    async fn test_unconfigured_server_is_an_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let agent = SyncAgent::new(db, CannedFetcher::default());

        let err = agent.pull_products().await.unwrap_err();
        assert!(err.is_config_error());
        assert!(agent.fetcher.requested.lock().unwrap().is_empty());
    }
}

//! # Product Repository
//!
//! The product catalog is never edited locally: it is replaced wholesale
//! by every product pull.

use fieldrep_core::query::QueryParams;
use fieldrep_core::schema::PRODUCT;
use fieldrep_core::{Row, Value};
use tracing::info;

use crate::error::DbResult;
use crate::repository::entity_repository;

entity_repository!(
    /// Repository for the `product` table.
    ProductRepository,
    PRODUCT
);

impl ProductRepository {
    pub async fn find_by_sku(&self, sku: &str) -> DbResult<Option<Row>> {
        Ok(self.find_by("sku", sku).await?.into_iter().next())
    }

    /// The whole catalog ordered by SKU.
    pub async fn load_catalog(&self) -> DbResult<Vec<Row>> {
        self.find(&QueryParams::new().order_by("sku", "ASC"), &[])
            .await
    }

    /// Drops the catalog and inserts `rows` (descriptor order).
    ///
    /// Stops at the first row the store rejects; rows before it stay.
    pub async fn replace_all(&mut self, rows: Vec<Vec<Value>>) -> DbResult<usize> {
        self.recreate_table().await?;
        let mut inserted = 0;
        for values in rows {
            self.insert(values).await?;
            inserted += 1;
        }
        info!(products = inserted, "Product catalog replaced");
        Ok(inserted)
    }
}

//! # Sync Endpoint
//!
//! Builds download URLs from the settings row:
//!
//! ```text
//! <http>/<usercountry>/<file_prefix><file code><file_suffix>
//!
//! http          = https://sync.example.com
//! usercountry   = dk
//! file_prefix   = fr_
//! file_suffix   = .txt
//! customer_file = customers
//!
//! ──► https://sync.example.com/dk/fr_customers.txt
//! ```

use fieldrep_core::Row;

use crate::error::{SyncError, SyncResult};

const DEFAULT_CUSTOMER_FILE: &str = "customers";
const DEFAULT_PRODUCT_FILE: &str = "products";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEndpoint {
    pub base: String,
    pub country: String,
    pub prefix: String,
    pub suffix: String,
    pub customer_file: String,
    pub product_file: String,
}

impl SyncEndpoint {
    /// Reads the endpoint fields of a settings row. Missing fields are empty;
    /// the two file codes fall back to `customers` and `products`.
    pub fn from_settings(row: &Row) -> Self {
        let text = |field: &str| row.get_str(field).unwrap_or_default().trim().to_string();
        let or_default = |value: String, default: &str| {
            if value.is_empty() {
                default.to_string()
            } else {
                value
            }
        };

        SyncEndpoint {
            base: text("http"),
            country: text("usercountry"),
            prefix: text("file_prefix"),
            suffix: text("file_suffix"),
            customer_file: or_default(text("customer_file"), DEFAULT_CUSTOMER_FILE),
            product_file: or_default(text("product_file"), DEFAULT_PRODUCT_FILE),
        }
    }

    /// Replaces the server base, e.g. from the local config file.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Fails when the base has no scheme or no host. The stock settings row
    /// carries a bare `https://`, so a fresh install fails here.
    pub fn validate(&self) -> SyncResult<()> {
        let host = self
            .base
            .strip_prefix("https://")
            .or_else(|| self.base.strip_prefix("http://"))
            .ok_or_else(|| SyncError::InvalidUrl(format!("no http(s) scheme: '{}'", self.base)))?;

        if host.trim_matches('/').is_empty() {
            return Err(SyncError::InvalidUrl(format!(
                "no sync server configured: '{}'",
                self.base
            )));
        }
        if self.country.is_empty() {
            return Err(SyncError::InvalidConfig("usercountry is empty".into()));
        }
        Ok(())
    }

    pub fn url_for(&self, file_code: &str) -> String {
        format!(
            "{}/{}/{}{}{}",
            self.base.trim_end_matches('/'),
            self.country,
            self.prefix,
            file_code,
            self.suffix
        )
    }

    pub fn customers_url(&self) -> String {
        self.url_for(&self.customer_file)
    }

    pub fn products_url(&self) -> String {
        self.url_for(&self.product_file)
    }
}

#[cfg(test)]
mod tests {
    use fieldrep_core::schema::SETTINGS;
    use fieldrep_core::Value;

    use super::*;

    fn settings(http: &str, prefix: &str, customer_file: &str) -> Row {
        let mut row = Row::zip(SETTINGS.fields, vec![Value::Null; SETTINGS.width()]);
        row.set("http", http);
        row.set("usercountry", "dk");
        row.set("file_prefix", prefix);
        row.set("file_suffix", ".txt");
        row.set("customer_file", customer_file);
        row
    }

    #[test]
    fn test_url_template() {
        let endpoint = SyncEndpoint::from_settings(&settings("https://sync.example.com/", "fr_", "kunder"));
        assert!(endpoint.validate().is_ok());
        assert_eq!(
            endpoint.customers_url(),
            "https://sync.example.com/dk/fr_kunder.txt"
        );
        assert_eq!(
            endpoint.products_url(),
            "https://sync.example.com/dk/fr_products.txt"
        );
        assert_eq!(endpoint.url_for("x"), "https://sync.example.com/dk/fr_x.txt");
    }

    #[test]
    fn test_bare_scheme_is_rejected() {
        let endpoint = SyncEndpoint::from_settings(&settings("https://", "", ""));
        assert!(matches!(endpoint.validate(), Err(SyncError::InvalidUrl(_))));

        let endpoint = endpoint.with_base("http://localhost:8080");
        assert!(endpoint.validate().is_ok());
        assert_eq!(endpoint.customers_url(), "http://localhost:8080/dk/customers.txt");
    }

    #[test]
    fn test_missing_scheme_is_rejected() {
        let endpoint = SyncEndpoint::from_settings(&settings("sync.example.com", "", ""));
        assert!(matches!(endpoint.validate(), Err(SyncError::InvalidUrl(_))));
    }
}

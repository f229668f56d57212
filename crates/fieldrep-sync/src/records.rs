//! # Record Reshaping
//!
//! Turns a downloaded body into descriptor-ordered tuples.
//!
//! ```text
//! bytes ──sanitize──► text ──split_records──► [[field, ..], ..]
//!                                                   │
//!                     customer_rows(records, rep) ◄─┤ (filtered by rep code)
//!                     product_rows(records)       ◄─┘
//! ```
//!
//! Feed layouts (no identity column, `|` separated):
//! - customers: account, company, address1, address2, zipcode, city,
//!   country, salesrep, phone1, phone2, vat, email, factor, infotext
//! - products: every product column after `productid`

use std::iter;

use fieldrep_core::import::coerce_record;
use fieldrep_core::schema::{CUSTOMER, PRODUCT};
use fieldrep_core::Value;
use tracing::debug;

/// Customer feed columns, in feed order.
pub const CUSTOMER_FEED: [&str; 14] = [
    "account", "company", "address1", "address2", "zipcode", "city", "country", "salesrep",
    "phone1", "phone2", "vat", "email", "factor", "infotext",
];

const FEED_SALESREP: usize = 7;

/// Decodes a body, dropping a byte-order mark and NUL bytes.
pub fn sanitize(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    text.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| *c != '\0')
        .collect()
}

/// Splits text into records: one per line (CRLF or LF), fields on `|`,
/// each field trimmed. Blank lines are dropped.
pub fn split_records(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('|').map(|f| f.trim().to_string()).collect())
        .collect()
}

/// Customer tuples for the records of one sales rep.
///
/// `customerid` and `employeeid` come back NULL, `modified` 0. Short
/// records are skipped; extra trailing fields are ignored. The rep code
/// match ignores case.
pub fn customer_rows(records: &[Vec<String>], salesrep: &str) -> Vec<Vec<Value>> {
    let salesrep = salesrep.trim();
    records
        .iter()
        .filter(|record| {
            if record.len() < CUSTOMER_FEED.len() {
                debug!(fields = record.len(), "Skipping short customer record");
                return false;
            }
            record[FEED_SALESREP].eq_ignore_ascii_case(salesrep)
        })
        .map(|record| {
            let fields = iter::once("")
                .chain(iter::once(""))
                .chain(record[..CUSTOMER_FEED.len()].iter().map(String::as_str))
                .chain(iter::once("0"));
            coerce_record(&CUSTOMER, fields)
        })
        .collect()
}

/// Product tuples with a NULL `productid`. Short records are skipped.
pub fn product_rows(records: &[Vec<String>]) -> Vec<Vec<Value>> {
    let width = PRODUCT.width() - 1;
    records
        .iter()
        .filter(|record| {
            let keep = record.len() >= width;
            if !keep {
                debug!(fields = record.len(), "Skipping short product record");
            }
            keep
        })
        .map(|record| {
            let fields = iter::once("").chain(record[..width].iter().map(String::as_str));
            coerce_record(&PRODUCT, fields)
        })
        .collect()
}

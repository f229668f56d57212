//! # Order Line Repository
//!
//! Order lines ("details", "salelines" in import files) of a visit.
//! Discounts are percentages; `sas` lines count towards the
//! sale-and-service total instead of the plain sale.

use fieldrep_core::query::Filter;
use fieldrep_core::schema::ORDERLINE;
use fieldrep_core::{Row, Value};

use crate::error::DbResult;
use crate::repository::entity_repository;

entity_repository!(
    /// Repository for the `orderline` table.
    DetailRepository,
    ORDERLINE
);

/// Fields of an order line to be created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewLine {
    pub visitid: i64,
    pub pcs: i64,
    pub sku: String,
    pub text: String,
    pub price: f64,
    pub sas: bool,
    pub discount: f64,
    pub linetype: String,
    pub linenote: String,
    pub item: String,
}

/// Sums over the order lines of one visit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisitTotals {
    pub lines: i64,
    pub pieces: i64,
    /// Net amount of ordinary lines.
    pub sale: f64,
    /// Net amount of sale-and-service lines.
    pub sas: f64,
}

impl VisitTotals {
    pub fn total(&self) -> f64 {
        self.sale + self.sas
    }
}

const NET: &str = "pcs * price * (100 - discount) / 100.0";

impl DetailRepository {
    /// Lines of one visit, cached as the current list.
    pub async fn load_for_visit(&mut self, visitid: i64) -> DbResult<&[Row]> {
        self.load_list("visitid", visitid).await
    }

    pub async fn add_line(&self, line: &NewLine) -> DbResult<i64> {
        self.insert(vec![
            Value::Null,
            line.visitid.into(),
            line.pcs.into(),
            line.sku.as_str().into(),
            line.text.as_str().into(),
            line.price.into(),
            line.sas.into(),
            line.discount.into(),
            line.linetype.as_str().into(),
            line.linenote.as_str().into(),
            line.item.as_str().into(),
        ])
        .await
    }

    /// Line count, pieces and net amounts of one visit.
    pub async fn visit_totals(&self, visitid: i64) -> DbResult<VisitTotals> {
        let sale = format!("sum(CASE WHEN sas = 0 THEN {} ELSE 0 END) AS sale", NET);
        let sas = format!("sum(CASE WHEN sas != 0 THEN {} ELSE 0 END) AS sas", NET);
        let row = self
            .aggregate(
                &["count(lineid) AS lines", "sum(pcs) AS pieces", sale.as_str(), sas.as_str()],
                vec![Filter::eq("visitid")],
                &[visitid.into()],
            )
            .await?;

        Ok(VisitTotals {
            lines: row.get_i64("lines").unwrap_or(0),
            pieces: row.get_i64("pieces").unwrap_or(0),
            sale: row.get_f64("sale").unwrap_or(0.0),
            sas: row.get_f64("sas").unwrap_or(0.0),
        })
    }

    /// Removes every line of one visit.
    pub async fn delete_for_visit(&mut self, visitid: i64) -> DbResult<u64> {
        self.delete_where(vec![Filter::eq("visitid")], &[visitid.into()])
            .await
    }
}

//! # Visit Repository
//!
//! A visit is one customer call on a day report. Order data (`po_*`) is
//! filled in from the visit's order lines and flagged `po_sent` once the
//! order has gone out.

use chrono::NaiveDate;
use fieldrep_core::schema::VISIT;
use fieldrep_core::{Row, DATE_FORMAT};

use crate::error::{DbError, DbResult};
use crate::repository::detail::VisitTotals;
use crate::repository::entity_repository;

entity_repository!(
    /// Repository for the `visit` table.
    VisitRepository,
    VISIT
);

/// Fields of a visit to be created. Order fields start empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVisit {
    pub reportid: i64,
    pub employeeid: i64,
    pub customerid: i64,
    pub visit_date: NaiveDate,
    pub visit_type: String,
    pub visit_note: String,
}

impl VisitRepository {
    /// Visits of one day report, cached as the current list.
    pub async fn load_for_report(&mut self, reportid: i64) -> DbResult<&[Row]> {
        self.load_list("reportid", reportid).await
    }

    /// Visit history of one customer.
    pub async fn load_for_customer(&self, customerid: i64) -> DbResult<Vec<Row>> {
        self.find_by("customerid", customerid).await
    }

    pub async fn add_visit(&self, visit: &NewVisit) -> DbResult<i64> {
        let mut row = self.blank_row();
        row.set("reportid", visit.reportid);
        row.set("employeeid", visit.employeeid);
        row.set("customerid", visit.customerid);
        row.set("visit_date", visit.visit_date.format(DATE_FORMAT).to_string());
        row.set("visit_type", visit.visit_type.as_str());
        row.set("visit_note", visit.visit_note.as_str());
        self.insert_row(&row).await
    }

    /// Copies order-line totals onto the visit.
    pub async fn apply_totals(&self, visitid: i64, totals: &VisitTotals) -> DbResult<()> {
        self.update(
            visitid,
            &["po_sale", "po_sas", "po_total"],
            vec![totals.sale.into(), totals.sas.into(), totals.total().into()],
        )
        .await
    }

    /// Flags the visit's order as sent.
    pub async fn mark_sent(&mut self, visitid: i64) -> DbResult<()> {
        self.update(visitid, &["po_sent"], vec![true.into()]).await?;
        // A cached copy would still say unsent
        self.clear();
        Ok(())
    }

    /// Visits whose order has not been sent yet.
    pub async fn unsent(&self) -> DbResult<Vec<Row>> {
        self.find_by("po_sent", 0).await
    }

    /// Fails with NotFound unless the visit exists.
    pub async fn require(&self, visitid: i64) -> DbResult<Row> {
        self.find_by_id(visitid)
            .await?
            .ok_or_else(|| DbError::not_found("visit", visitid))
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::memory_db;

    use super::*;

    fn visit(reportid: i64, customerid: i64) -> NewVisit {
        NewVisit {
            reportid,
            employeeid: 1,
            customerid,
            visit_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            visit_type: "recall".to_string(),
            visit_note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_visits_by_report_and_customer() {
        let db = memory_db().await;
        let mut visits = db.visits();
        visits.add_visit(&visit(1, 7)).await.unwrap();
        visits.add_visit(&visit(1, 8)).await.unwrap();
        visits.add_visit(&visit(2, 7)).await.unwrap();

        let day = visits.load_for_report(1).await.unwrap();
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].get_str("visit_date"), Some("2024-03-05"));
        assert_eq!(visits.load_for_customer(7).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mark_sent_and_totals() {
        let db = memory_db().await;
        let mut visits = db.visits();
        let id = visits.add_visit(&visit(1, 7)).await.unwrap();
        assert_eq!(visits.unsent().await.unwrap().len(), 1);

        let totals = VisitTotals {
            lines: 2,
            pieces: 3,
            sale: 100.0,
            sas: 20.0,
        };
        visits.apply_totals(id, &totals).await.unwrap();
        visits.mark_sent(id).await.unwrap();

        let row = visits.require(id).await.unwrap();
        assert_eq!(row.get_i64("po_sent"), Some(1));
        assert_eq!(row.get_f64("po_total"), Some(120.0));
        assert!(visits.unsent().await.unwrap().is_empty());
        assert!(matches!(
            visits.mark_sent(999).await,
            Err(DbError::NotFound { .. })
        ));
    }
}

//! # Report Repository
//!
//! One day report per employee and date. Reports are numbered per
//! employee (`rep_no`), counting up from 1.

use fieldrep_core::query::{Filter, QueryParams};
use fieldrep_core::schema::REPORT;
use fieldrep_core::{Row, DATE_FORMAT};
use tracing::info;

use crate::error::DbResult;
use crate::repository::{entity_repository, parse_date};

entity_repository!(
    /// Repository for the `report` table.
    ReportRepository,
    REPORT
);

impl ReportRepository {
    /// The employee's report for `date` (`YYYY-MM-DD`), cached as the
    /// current row.
    pub async fn load_for_date(&mut self, employeeid: i64, date: &str) -> DbResult<Option<Row>> {
        let date = parse_date("rep_date", date)?.format(DATE_FORMAT).to_string();
        let params = QueryParams::new()
            .filters([Filter::eq("employeeid").and(), Filter::eq("rep_date")]);
        let found = self
            .find(&params, &[employeeid.into(), date.into()])
            .await?
            .into_iter()
            .next();

        match found {
            Some(row) => {
                let id = row.get_i64("reportid").unwrap_or_default();
                Ok(self.load_by_id(id).await?.cloned())
            }
            None => Ok(None),
        }
    }

    /// Returns the id of the employee's report for `date`, creating it
    /// with the next report number when there is none.
    pub async fn create_for_date(&mut self, employeeid: i64, date: &str) -> DbResult<i64> {
        if let Some(existing) = self.load_for_date(employeeid, date).await? {
            return Ok(existing.get_i64("reportid").unwrap_or_default());
        }

        let date = parse_date("rep_date", date)?;
        let rep_no = self.next_rep_no(employeeid).await?;

        let mut row = self.blank_row();
        row.set("employeeid", employeeid);
        row.set("rep_no", rep_no);
        row.set("rep_date", date.format(DATE_FORMAT).to_string());
        row.set("workday", true);
        let id = self.insert_row(&row).await?;

        info!(employeeid, rep_no, date = %date, "Day report created");
        Ok(id)
    }

    /// One more than the employee's highest report number.
    pub async fn next_rep_no(&self, employeeid: i64) -> DbResult<i64> {
        let row = self
            .aggregate(
                &["max(rep_no) AS last"],
                vec![Filter::eq("employeeid")],
                &[employeeid.into()],
            )
            .await?;
        Ok(row.get_i64("last").unwrap_or(0) + 1)
    }

    /// Flags the report as sent.
    pub async fn mark_sent(&mut self, reportid: i64) -> DbResult<()> {
        self.update(reportid, &["sent"], vec![true.into()]).await?;
        self.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::repository::test_support::memory_db;

    use fieldrep_core::ValidationError;

    #[tokio::test]
    async fn test_create_for_date_numbers_reports() {
        let db = memory_db().await;
        let mut reports = db.reports();

        let first = reports.create_for_date(1, "2024-03-04").await.unwrap();
        let second = reports.create_for_date(1, "2024-03-05").await.unwrap();
        let other_rep = reports.create_for_date(2, "2024-03-05").await.unwrap();

        // Same day again returns the existing report
        assert_eq!(reports.create_for_date(1, "2024-03-05").await.unwrap(), second);

        let rows = [first, second, other_rep];
        let mut numbers = Vec::new();
        for id in rows {
            let row = reports.find_by_id(id).await.unwrap().unwrap();
            numbers.push(row.get_i64("rep_no").unwrap());
        }
        assert_eq!(numbers, vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_load_for_date_and_mark_sent() {
        let db = memory_db().await;
        let mut reports = db.reports();
        let id = reports.create_for_date(1, "2024-03-04").await.unwrap();

        let row = reports.load_for_date(1, "2024-03-04").await.unwrap().unwrap();
        assert_eq!(row.get_i64("sent"), Some(0));
        assert!(reports.load_for_date(1, "2024-03-06").await.unwrap().is_none());

        reports.mark_sent(id).await.unwrap();
        let row = reports.load_for_date(1, "2024-03-04").await.unwrap().unwrap();
        assert_eq!(row.get_i64("sent"), Some(1));
    }

    #[tokio::test]
    async fn test_invalid_date_is_rejected() {
        let db = memory_db().await;
        let mut reports = db.reports();
        let err = reports.create_for_date(1, "2024-13-40").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::InvalidDate { .. })
        ));
    }
}

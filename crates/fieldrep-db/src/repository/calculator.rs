//! # Calculator Repository
//!
//! Monthly totals per employee, derived from that month's day reports.
//!
//! ```text
//! report rows (employeeid, rep_date LIKE 'YYYY-MM%')
//!        │  count / sum
//!        ▼
//! calculator row (employeeid, calc_month)   ← inserted or overwritten
//! ```

use fieldrep_core::query::{Filter, QueryParams};
use fieldrep_core::schema::{CALCULATOR, REPORT};
use fieldrep_core::Row;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{entity_repository, parse_date, Repository};

entity_repository!(
    /// Repository for the `calculator` table.
    CalculatorRepository,
    CALCULATOR
);

/// Report aggregates, in calculator column order after `calc_month`.
const TOTALS: [(&str, &str); 8] = [
    ("reports", "count(reportid) AS reports"),
    ("visits", "sum(newvisitday + recallvisitday) AS visits"),
    ("demos", "sum(newdemoday + recalldemoday + demoday) AS demos"),
    ("sales", "sum(newsaleday + recallsaleday + saleday) AS sales"),
    ("turnover", "sum(newturnoverday + recallturnoverday) AS turnover"),
    ("sas", "sum(sasday) AS sas"),
    ("sas_turnover", "sum(sasturnoverday) AS sas_turnover"),
    ("km", "sum(kmevening - kmmorning - kmprivate) AS km"),
];

impl CalculatorRepository {
    /// The stored totals row of one employee and month (`YYYY-MM`).
    pub async fn find_month(&self, employeeid: i64, month: &str) -> DbResult<Option<Row>> {
        let params = QueryParams::new()
            .filters([Filter::eq("employeeid").and(), Filter::eq("calc_month")]);
        Ok(self
            .find(&params, &[employeeid.into(), month.into()])
            .await?
            .into_iter()
            .next())
    }

    /// Recomputes one employee's totals for `month` (`YYYY-MM`) from the
    /// report table and stores them.
    pub async fn recalculate(&mut self, employeeid: i64, month: &str) -> DbResult<Row> {
        parse_date("calc_month", &format!("{}-01", month))?;

        let reports = Repository::new(&REPORT, self.executor().clone());
        let expressions: Vec<&str> = TOTALS.iter().map(|(_, expr)| *expr).collect();
        let sums = reports
            .aggregate(
                &expressions,
                vec![Filter::eq("employeeid").and(), Filter::like("rep_date")],
                &[employeeid.into(), format!("{}%", month).into()],
            )
            .await?;

        let mut totals = self.blank_row();
        totals.set("employeeid", employeeid);
        totals.set("calc_month", month);
        for (field, _) in TOTALS {
            // Empty months sum to NULL
            if let Some(value) = sums.get(field).filter(|v| !v.is_null()) {
                totals.set(field, value.clone());
            }
        }

        let id = match self.find_month(employeeid, month).await? {
            Some(existing) => {
                let id = existing.get_i64("calculatorid").unwrap_or_default();
                totals.set("calculatorid", id);
                self.update_row(&totals).await?;
                id
            }
            None => {
                let id = self.insert_row(&totals).await?;
                totals.set("calculatorid", id);
                id
            }
        };
        self.clear();

        debug!(employeeid, month, id, "Monthly totals recalculated");
        Ok(totals)
    }
}

//! # Employee Repository

use fieldrep_core::schema::EMPLOYEE;
use fieldrep_core::Row;

use crate::error::DbResult;
use crate::repository::entity_repository;

entity_repository!(
    /// Repository for the `employee` table.
    EmployeeRepository,
    EMPLOYEE
);

impl EmployeeRepository {
    /// The employee with the given sales rep code.
    pub async fn find_by_salesrep(&self, salesrep: &str) -> DbResult<Option<Row>> {
        Ok(self.find_by("salesrep", salesrep).await?.into_iter().next())
    }
}

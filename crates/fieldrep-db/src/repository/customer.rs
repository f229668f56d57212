//! # Customer Repository
//!
//! Customers are keyed by their `account` number in imports and syncs;
//! `customerid` is the local rowid.

use fieldrep_core::query::{Filter, QueryParams};
use fieldrep_core::schema::CUSTOMER;
use fieldrep_core::{Row, Value};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::entity_repository;

entity_repository!(
    /// Repository for the `customer` table.
    CustomerRepository,
    CUSTOMER
);

impl CustomerRepository {
    pub async fn find_by_account(&self, account: &str) -> DbResult<Option<Row>> {
        Ok(self.find_by("account", account).await?.into_iter().next())
    }

    /// Customers whose first or second phone number matches.
    pub async fn find_by_phone(&self, phone: &str) -> DbResult<Vec<Row>> {
        let params = QueryParams::new()
            .filters([Filter::eq("phone1").or(), Filter::eq("phone2")])
            .order_by("company", "ASC");
        self.find(&params, &[phone.into(), phone.into()]).await
    }

    /// Customers of one sales rep, cached as the current list.
    pub async fn load_for_salesrep(&mut self, salesrep: &str) -> DbResult<&[Row]> {
        self.load_list("salesrep", salesrep).await
    }

    /// Inserts `values` (descriptor order) or, when a customer with the
    /// same account exists, overwrites it keeping its id. A blank or NULL
    /// account never matches; the row is inserted as given.
    ///
    /// ## Returns
    /// The customer's id and whether it was newly inserted.
    pub async fn upsert_by_account(&self, mut values: Vec<Value>) -> DbResult<(i64, bool)> {
        let model = self.model();
        if values.len() != model.width() {
            return Err(DbError::ArityMismatch {
                table: model.name.to_string(),
                expected: model.width(),
                found: values.len(),
            });
        }

        let incoming = Row::zip(model.fields, values.clone());
        let account = incoming.get("account").map(Value::to_string).unwrap_or_default();
        let existing = if account.trim().is_empty() {
            None
        } else {
            self.find_by_account(&account).await?
        };

        match existing {
            Some(existing) => {
                let id = existing
                    .get_i64("customerid")
                    .ok_or_else(|| DbError::not_found("customer", &account))?;
                let fields = model.value_fields();
                self.update(id, &fields, incoming.values_of(&fields)).await?;
                debug!(account = %account, id, "Customer updated");
                Ok((id, false))
            }
            None => {
                values[0] = Value::Null;
                let id = self.insert(values).await?;
                debug!(account = %account, id, "Customer inserted");
                Ok((id, true))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::memory_db;

    use super::*;

    fn customer(account: &str, company: &str, salesrep: &str, phone1: &str) -> Vec<Value> {
        let mut values = vec![Value::Null; CUSTOMER.width()];
        values[2] = account.into();
        values[3] = company.into();
        values[9] = salesrep.into();
        values[10] = phone1.into();
        values
    }

    #[tokio::test]
    async fn test_upsert_updates_existing_account() {
        let db = memory_db().await;
        let customers = db.customers();

        let (id, inserted) = customers
            .upsert_by_account(customer("1001", "Acme", "R7", "555"))
            .await
            .unwrap();
        assert!(inserted);

        let (same, inserted) = customers
            .upsert_by_account(customer("1001", "Acme Ltd", "R7", "555"))
            .await
            .unwrap();
        assert_eq!(same, id);
        assert!(!inserted);

        let row = customers.find_by_account("1001").await.unwrap().unwrap();
        assert_eq!(row.get_str("company"), Some("Acme Ltd"));
        assert_eq!(customers.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_phone_and_salesrep_lookups() {
        let db = memory_db().await;
        let mut customers = db.customers();
        customers
            .upsert_by_account(customer("1", "B Co", "R7", "111"))
            .await
            .unwrap();
        customers
            .upsert_by_account(customer("2", "A Co", "R8", "222"))
            .await
            .unwrap();

        let by_phone = customers.find_by_phone("222").await.unwrap();
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].get_str("account"), Some("2"));

        let mine = customers.load_for_salesrep("R7").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].get_str("company"), Some("B Co"));
    }

    #[tokio::test]
    async fn test_blank_account_never_matches() {
        let db = memory_db().await;
        let customers = db.customers();

        let (first, inserted) = customers
            .upsert_by_account(customer("", "Walk-in", "R7", "111"))
            .await
            .unwrap();
        assert!(inserted);
        let (second, inserted) = customers
            .upsert_by_account(customer("", "Other", "R7", "222"))
            .await
            .unwrap();
        assert!(inserted);
        assert_ne!(first, second);

        let mut no_account = customer("", "Null Co", "R7", "333");
        no_account[2] = Value::Null;
        let err = customers.upsert_by_account(no_account).await.unwrap_err();
        assert!(matches!(err, DbError::NotNullViolation(_)));

        assert_eq!(customers.count().await.unwrap(), 2);
        let walk_in = customers.find_by_id(first).await.unwrap().unwrap();
        assert_eq!(walk_in.get_str("company"), Some("Walk-in"));
    }

    #[tokio::test]
    async fn test_upsert_rejects_short_rows() {
        let db = memory_db().await;
        let err = db
            .customers()
            .upsert_by_account(vec![Value::Null; 3])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ArityMismatch { .. }));
    }
}

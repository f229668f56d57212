//! # Contact Repository
//!
//! Contact persons of a customer.

use fieldrep_core::schema::CONTACT;
use fieldrep_core::{Row, Value};

use crate::error::DbResult;
use crate::repository::entity_repository;

entity_repository!(
    /// Repository for the `contact` table.
    ContactRepository,
    CONTACT
);

/// Fields of a contact to be created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewContact {
    pub customerid: i64,
    pub name: String,
    pub department: String,
    pub email: String,
    pub phone: String,
    pub infotext: String,
}

impl ContactRepository {
    /// Contacts of one customer, cached as the current list.
    pub async fn load_for_customer(&mut self, customerid: i64) -> DbResult<&[Row]> {
        self.load_list("customerid", customerid).await
    }

    /// Inserts a contact and returns its new id.
    pub async fn add_contact(&self, contact: &NewContact) -> DbResult<i64> {
        self.insert(vec![
            Value::Null,
            contact.customerid.into(),
            contact.name.as_str().into(),
            contact.department.as_str().into(),
            contact.email.as_str().into(),
            contact.phone.as_str().into(),
            contact.infotext.as_str().into(),
        ])
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::memory_db;

    use super::*;

    #[tokio::test]
    async fn test_add_and_load_for_customer() {
        let db = memory_db().await;
        let mut contacts = db.contacts();

        let id = contacts
            .add_contact(&NewContact {
                customerid: 7,
                name: "Jane Doe".to_string(),
                department: "Sales".to_string(),
                email: "j@x.com".to_string(),
                phone: "555-1000".to_string(),
                infotext: String::new(),
            })
            .await
            .unwrap();

        let rows = contacts.load_for_customer(7).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_i64("contactid"), Some(id));
        assert_eq!(rows[0].get_str("name"), Some("Jane Doe"));
        assert!(contacts.load_for_customer(8).await.unwrap().is_empty());
    }
}

//! # Entity Schema
//!
//! One [`TableModel`] per business entity. These field lists are the
//! on-disk contract shared with CSV import/export and the HTTP sync.
//!
//! ## Entities
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  employee ──< report ──< visit >── customer ──< contact                 │
//! │                            │                                            │
//! │                            └──< orderline (detail / saleline)           │
//! │                                                                         │
//! │  product      calculator (monthly totals)      settings (one row)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use crate::model::TableModel;

const ID: &str = "INTEGER PRIMARY KEY NOT NULL";

pub static CONTACT: TableModel = TableModel::new(
    "contact",
    Some("contactid"),
    &[
        "contactid",
        "customerid",
        "name",
        "department",
        "email",
        "phone",
        "infotext",
    ],
    &[ID, "INTEGER NOT NULL", "TEXT NOT NULL", "TEXT", "TEXT", "TEXT", "TEXT"],
);

pub static CUSTOMER: TableModel = TableModel::new(
    "customer",
    Some("customerid"),
    &[
        "customerid",
        "employeeid",
        "account",
        "company",
        "address1",
        "address2",
        "zipcode",
        "city",
        "country",
        "salesrep",
        "phone1",
        "phone2",
        "vat",
        "email",
        "factor",
        "infotext",
        "modified",
    ],
    &[
        ID,
        "INTEGER",
        "TEXT NOT NULL",
        "TEXT NOT NULL",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "REAL DEFAULT 0",
        "TEXT",
        "INTEGER DEFAULT 0",
    ],
);

pub static EMPLOYEE: TableModel = TableModel::new(
    "employee",
    Some("employeeid"),
    &["employeeid", "salesrep", "fullname", "email", "country", "sas"],
    &[ID, "TEXT NOT NULL", "TEXT", "TEXT", "TEXT", "INTEGER DEFAULT 0"],
);

pub static PRODUCT: TableModel = TableModel::new(
    "product",
    Some("productid"),
    &[
        "productid",
        "sku",
        "name1",
        "name2",
        "name3",
        "item",
        "price",
        "d2",
        "d4",
        "d6",
        "d8",
        "d12",
        "d24",
        "d48",
        "d96",
        "min_price",
        "net_price",
        "groups",
    ],
    &[
        ID,
        "TEXT NOT NULL",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "REAL",
        "REAL",
        "REAL",
        "REAL",
        "REAL",
        "REAL",
        "REAL",
        "REAL",
        "REAL",
        "REAL",
        "REAL",
        "TEXT",
    ],
);

pub static VISIT: TableModel = TableModel::new(
    "visit",
    Some("visitid"),
    &[
        "visitid",
        "reportid",
        "employeeid",
        "customerid",
        "visit_date",
        "visit_type",
        "po_sent",
        "po_number",
        "po_company",
        "po_address1",
        "po_address2",
        "po_postcode",
        "po_postoffice",
        "po_country",
        "prod_demo",
        "prod_sale",
        "po_sale",
        "po_sas",
        "po_service",
        "po_total",
        "visit_note",
    ],
    &[
        ID,
        "INTEGER NOT NULL",
        "INTEGER NOT NULL",
        "INTEGER NOT NULL",
        "TEXT NOT NULL",
        "TEXT",
        "INTEGER DEFAULT 0",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "REAL DEFAULT 0",
        "REAL DEFAULT 0",
        "REAL DEFAULT 0",
        "REAL DEFAULT 0",
        "TEXT",
    ],
);

/// Order line of a visit. Also called detail or saleline in import files.
pub static ORDERLINE: TableModel = TableModel::new(
    "orderline",
    Some("lineid"),
    &[
        "lineid", "visitid", "pcs", "sku", "text", "price", "sas", "discount", "linetype",
        "linenote", "item",
    ],
    &[
        ID,
        "INTEGER NOT NULL",
        "INTEGER DEFAULT 0",
        "TEXT",
        "TEXT",
        "REAL DEFAULT 0",
        "INTEGER DEFAULT 0",
        "REAL DEFAULT 0",
        "TEXT",
        "TEXT",
        "TEXT",
    ],
);

pub static REPORT: TableModel = TableModel::new(
    "report",
    Some("reportid"),
    &[
        "reportid",
        "employeeid",
        "rep_no",
        "rep_date",
        "newvisitday",
        "newdemoday",
        "newsaleday",
        "newturnoverday",
        "recallvisitday",
        "recalldemoday",
        "recallsaleday",
        "recallturnoverday",
        "sasday",
        "sasturnoverday",
        "demoday",
        "saleday",
        "kmmorning",
        "kmevening",
        "supervisor",
        "territory",
        "workday",
        "infotext",
        "sent",
        "offday",
        "offtext",
        "kmprivate",
    ],
    &[
        ID,
        "INTEGER NOT NULL",
        "INTEGER NOT NULL",
        "TEXT NOT NULL",
        "INTEGER DEFAULT 0",
        "INTEGER DEFAULT 0",
        "INTEGER DEFAULT 0",
        "REAL DEFAULT 0",
        "INTEGER DEFAULT 0",
        "INTEGER DEFAULT 0",
        "INTEGER DEFAULT 0",
        "REAL DEFAULT 0",
        "INTEGER DEFAULT 0",
        "REAL DEFAULT 0",
        "INTEGER DEFAULT 0",
        "INTEGER DEFAULT 0",
        "INTEGER DEFAULT 0",
        "INTEGER DEFAULT 0",
        "TEXT",
        "TEXT",
        "INTEGER DEFAULT 0",
        "TEXT",
        "INTEGER DEFAULT 0",
        "INTEGER DEFAULT 0",
        "TEXT",
        "INTEGER DEFAULT 0",
    ],
);

/// Monthly totals per employee, derived from reports.
pub static CALCULATOR: TableModel = TableModel::new(
    "calculator",
    Some("calculatorid"),
    &[
        "calculatorid",
        "employeeid",
        "calc_month",
        "reports",
        "visits",
        "demos",
        "sales",
        "turnover",
        "sas",
        "sas_turnover",
        "km",
    ],
    &[
        ID,
        "INTEGER NOT NULL",
        "TEXT NOT NULL",
        "INTEGER DEFAULT 0",
        "INTEGER DEFAULT 0",
        "INTEGER DEFAULT 0",
        "INTEGER DEFAULT 0",
        "REAL DEFAULT 0",
        "INTEGER DEFAULT 0",
        "REAL DEFAULT 0",
        "INTEGER DEFAULT 0",
    ],
);

/// Single-row configuration record.
pub static SETTINGS: TableModel = TableModel::new(
    "settings",
    Some("settingsid"),
    &[
        "settingsid",
        "usermail",
        "userpass",
        "usercountry",
        "http",
        "smtp",
        "port",
        "mailto",
        "mailserver",
        "mailport",
        "mailuser",
        "mailpass",
        "file_prefix",
        "file_suffix",
        "customer_file",
        "product_file",
        "last_customer_sync",
        "last_product_sync",
    ],
    &[
        ID,
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "INTEGER",
        "TEXT",
        "TEXT",
        "INTEGER",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
        "TEXT",
    ],
);

// =============================================================================
// Entity
// =============================================================================

/// Every persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Contact,
    Customer,
    Employee,
    Product,
    Visit,
    Detail,
    Report,
    Calculator,
    Settings,
}

impl Entity {
    /// All entities, in table creation order.
    pub const ALL: [Entity; 9] = [
        Entity::Employee,
        Entity::Customer,
        Entity::Contact,
        Entity::Product,
        Entity::Report,
        Entity::Visit,
        Entity::Detail,
        Entity::Calculator,
        Entity::Settings,
    ];

    /// The descriptor backing this entity.
    pub fn model(&self) -> &'static TableModel {
        match self {
            Entity::Contact => &CONTACT,
            Entity::Customer => &CUSTOMER,
            Entity::Employee => &EMPLOYEE,
            Entity::Product => &PRODUCT,
            Entity::Visit => &VISIT,
            Entity::Detail => &ORDERLINE,
            Entity::Report => &REPORT,
            Entity::Calculator => &CALCULATOR,
            Entity::Settings => &SETTINGS,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_models_are_well_formed() {
        for entity in Entity::ALL {
            let model = entity.model();
            assert!(model.validate().is_ok(), "{} is malformed", model.name);
            // Identity is always the first column
            assert_eq!(model.id_field, Some(model.fields[0]));
        }
    }

    #[test]
    fn test_table_names_are_unique() {
        let mut names: Vec<&str> = Entity::ALL.iter().map(|e| e.model().name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Entity::ALL.len());
    }

    #[test]
    fn test_contact_layout() {
        assert_eq!(CONTACT.width(), 7);
        assert_eq!(Entity::Detail.to_string(), "orderline");
    }
}

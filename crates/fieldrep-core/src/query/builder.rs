//! # Statement Builders
//!
//! One pure function per statement kind. Each takes a descriptor plus the
//! parameters that kind needs and returns a [`Statement`], never touching
//! the store.
//!
//! The builders validate everything they can before anything runs:
//! descriptor alignment, field names, conjunctions, and non-empty WHERE
//! clauses for writes.

use crate::error::{CoreResult, QueryError};
use crate::model::TableModel;
use crate::query::filter::{Filter, Predicate};
use crate::query::statement::{OrderBy, Projection, QueryKind, SortOrder, Statement};

/// `CREATE TABLE IF NOT EXISTS`, one column definition per field.
pub fn create(model: &TableModel) -> CoreResult<Statement> {
    model.validate()?;
    Ok(Statement::CreateTable {
        table: model.name,
        columns: model
            .fields
            .iter()
            .copied()
            .zip(model.types.iter().copied())
            .collect(),
    })
}

/// `DROP TABLE IF EXISTS`, paired with [`create`] for wholesale reimports.
pub fn drop(model: &TableModel) -> CoreResult<Statement> {
    model.validate()?;
    Ok(Statement::DropTable { table: model.name })
}

/// `INSERT` with one placeholder per field, identity included.
pub fn insert(model: &TableModel) -> CoreResult<Statement> {
    model.validate()?;
    Ok(Statement::Insert {
        table: model.name,
        fields: model.fields.to_vec(),
    })
}

/// `SELECT`, in one of four shapes.
///
/// ```text
/// aggregates empty?  filters empty?   shape
/// ─────────────────  ──────────────   ─────────────────────
/// yes                yes              projection
/// yes                no               projection + filter
/// no                 yes              aggregate
/// no                 no               aggregate + filter
/// ```
///
/// Each shape may carry an `ORDER BY`.
pub fn select(
    model: &TableModel,
    aggregates: &[String],
    filters: &[Filter],
    order: Option<(&str, SortOrder)>,
) -> CoreResult<Statement> {
    model.validate()?;

    let projection = if aggregates.is_empty() {
        Projection::Fields(model.fields.to_vec())
    } else {
        Projection::Aggregates(aggregates.to_vec())
    };

    let order = match order {
        Some((field, order)) => Some(OrderBy {
            field: resolve_field(model, field)?,
            order,
        }),
        None => None,
    };

    Ok(Statement::Select {
        table: model.name,
        projection,
        filter: Predicate::from_filters(model, filters)?,
        order,
    })
}

/// `UPDATE ... SET f=? ... WHERE ...`
///
/// Both the field list and the filter list must be non-empty. The builder
/// does not insist that the filter targets the identity field.
pub fn update(model: &TableModel, fields: &[String], filters: &[Filter]) -> CoreResult<Statement> {
    model.validate()?;

    if fields.is_empty() {
        return Err(QueryError::MissingUpdateFields {
            table: model.name.to_string(),
        });
    }

    let mut set = Vec::with_capacity(fields.len());
    for field in fields {
        if model.id_field == Some(field.as_str()) {
            return Err(QueryError::IdentityUpdate {
                table: model.name.to_string(),
                field: field.clone(),
            });
        }
        set.push(resolve_field(model, field)?);
    }

    let filter = required_filter(model, QueryKind::Update, filters)?;
    Ok(Statement::Update {
        table: model.name,
        set,
        filter,
    })
}

/// `DELETE FROM ... WHERE ...`
pub fn delete(model: &TableModel, filters: &[Filter]) -> CoreResult<Statement> {
    model.validate()?;
    let filter = required_filter(model, QueryKind::Delete, filters)?;
    Ok(Statement::Delete {
        table: model.name,
        filter,
    })
}

fn required_filter(
    model: &TableModel,
    operation: QueryKind,
    filters: &[Filter],
) -> CoreResult<Predicate> {
    Predicate::from_filters(model, filters)?.ok_or_else(|| QueryError::MissingFilter {
        operation,
        table: model.name.to_string(),
    })
}

fn resolve_field(model: &TableModel, field: &str) -> CoreResult<&'static str> {
    model
        .field_index(field)
        .map(|i| model.fields[i])
        .ok_or_else(|| QueryError::UnknownField {
            table: model.name.to_string(),
            field: field.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CONTACT, EMPLOYEE};

    #[test]
    fn test_create_lists_every_column_in_order() {
        let sql = create(&EMPLOYEE).unwrap().to_sql();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS employee (employeeid INTEGER PRIMARY KEY NOT NULL, \
             salesrep TEXT NOT NULL, fullname TEXT, email TEXT, country TEXT, \
             sas INTEGER DEFAULT 0)"
        );
    }

    #[test]
    fn test_insert_has_one_placeholder_per_field() {
        let stmt = insert(&CONTACT).unwrap();
        assert_eq!(stmt.placeholder_count(), CONTACT.width());
        assert_eq!(
            stmt.to_sql(),
            "INSERT INTO contact (contactid, customerid, name, department, email, phone, infotext) \
             VALUES (?, ?, ?, ?, ?, ?, ?)"
        );
    }

    #[test]
    fn test_select_shapes() {
        let all = select(&EMPLOYEE, &[], &[], None).unwrap();
        assert_eq!(
            all.to_sql(),
            "SELECT employeeid, salesrep, fullname, email, country, sas FROM employee"
        );

        let filtered = select(
            &EMPLOYEE,
            &[],
            &[Filter::eq("salesrep")],
            Some(("fullname", SortOrder::Desc)),
        )
        .unwrap();
        assert!(filtered
            .to_sql()
            .ends_with("FROM employee WHERE salesrep = ? ORDER BY fullname DESC"));

        let aggregated = select(
            &CONTACT,
            &["count(contactid) AS contacts".to_string()],
            &[Filter::eq("customerid")],
            None,
        )
        .unwrap();
        assert_eq!(
            aggregated.to_sql(),
            "SELECT count(contactid) AS contacts FROM contact WHERE customerid = ?"
        );
        assert_eq!(aggregated.result_labels(), vec!["contacts"]);
    }

    #[test]
    fn test_update_renders_assignments() {
        let stmt = update(
            &CONTACT,
            &["name".to_string(), "email".to_string()],
            &[Filter::eq("contactid")],
        )
        .unwrap();
        assert_eq!(
            stmt.to_sql(),
            "UPDATE contact SET name=?, email=? WHERE contactid = ?"
        );
        assert_eq!(stmt.placeholder_count(), 3);
    }

    #[test]
    fn test_update_rejects_identity_and_empty_lists() {
        assert!(matches!(
            update(&CONTACT, &["contactid".to_string()], &[Filter::eq("contactid")]),
            Err(QueryError::IdentityUpdate { .. })
        ));
        assert!(matches!(
            update(&CONTACT, &[], &[Filter::eq("contactid")]),
            Err(QueryError::MissingUpdateFields { .. })
        ));
        assert!(matches!(
            update(&CONTACT, &["name".to_string()], &[]),
            Err(QueryError::MissingFilter { .. })
        ));
    }

    #[test]
    fn test_delete_requires_filter() {
        assert_eq!(
            delete(&CONTACT, &[Filter::eq("contactid")]).unwrap().to_sql(),
            "DELETE FROM contact WHERE contactid = ?"
        );
        assert_eq!(
            delete(&CONTACT, &[]),
            Err(QueryError::MissingFilter {
                operation: QueryKind::Delete,
                table: "contact".to_string(),
            })
        );
    }

    #[test]
    fn test_malformed_model_surfaces_as_error() {
        static BROKEN: TableModel = TableModel::new("broken", None, &["a", "b"], &["TEXT"]);
        assert!(matches!(
            create(&BROKEN),
            Err(QueryError::MalformedModel { .. })
        ));
    }
}

//! # Table-Model Descriptor
//!
//! The static, declarative schema of one entity table.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TableModel "contact"                                                   │
//! │                                                                         │
//! │  id_field: contactid                                                    │
//! │                                                                         │
//! │  fields[i]     types[i]                                                 │
//! │  ───────────   ──────────────────────────────                           │
//! │  contactid     INTEGER PRIMARY KEY NOT NULL   ← identity, bound NULL    │
//! │  customerid    INTEGER NOT NULL                 on insert               │
//! │  name          TEXT NOT NULL                                            │
//! │  ...           ...                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field order is the contract: INSERT placeholders, SELECT projections
//! and row zipping all follow it, so it is never reordered.

use crate::error::{CoreResult, QueryError};

/// Declarative schema for one table.
///
/// Descriptors are `const`-constructible and live in statics
/// (see [`crate::schema`]), so they are built once and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableModel {
    /// Table identifier, unique across the schema.
    pub name: &'static str,

    /// Primary-key field. `None` for rowid-only legacy tables.
    pub id_field: Option<&'static str>,

    /// Ordered field names.
    pub fields: &'static [&'static str],

    /// SQL type/constraint declarations, aligned 1:1 with `fields`.
    pub types: &'static [&'static str],
}

impl TableModel {
    /// Creates a descriptor. Alignment is checked by [`TableModel::validate`].
    pub const fn new(
        name: &'static str,
        id_field: Option<&'static str>,
        fields: &'static [&'static str],
        types: &'static [&'static str],
    ) -> Self {
        TableModel {
            name,
            id_field,
            fields,
            types,
        }
    }

    /// Checks that `fields` and `types` line up.
    pub fn validate(&self) -> CoreResult<()> {
        if self.fields.len() != self.types.len() || self.fields.is_empty() {
            return Err(QueryError::MalformedModel {
                table: self.name.to_string(),
                fields: self.fields.len(),
                types: self.types.len(),
            });
        }
        Ok(())
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.fields.len()
    }

    /// Position of a field in descriptor order.
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    /// Returns true if the descriptor declares `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.field_index(field).is_some()
    }

    /// Errors with [`QueryError::UnknownField`] unless `field` is declared.
    pub fn require_field(&self, field: &str) -> CoreResult<()> {
        if self.has_field(field) {
            Ok(())
        } else {
            Err(QueryError::UnknownField {
                table: self.name.to_string(),
                field: field.to_string(),
            })
        }
    }

    /// All fields except the identity field, in descriptor order.
    ///
    /// This is the field list an UPDATE of a whole row sets.
    pub fn value_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .copied()
            .filter(|f| Some(*f) != self.id_field)
            .collect()
    }

    /// SQL type declaration of a field.
    pub fn type_of(&self, field: &str) -> Option<&'static str> {
        self.field_index(field).and_then(|i| self.types.get(i).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GOOD: TableModel = TableModel::new(
        "note",
        Some("noteid"),
        &["noteid", "text", "pinned"],
        &["INTEGER PRIMARY KEY NOT NULL", "TEXT", "INTEGER"],
    );

    static BAD: TableModel = TableModel::new("bad", None, &["a", "b"], &["TEXT"]);

    #[test]
    fn test_validate() {
        assert!(GOOD.validate().is_ok());
        assert_eq!(
            BAD.validate(),
            Err(QueryError::MalformedModel {
                table: "bad".to_string(),
                fields: 2,
                types: 1,
            })
        );
    }

    #[test]
    fn test_value_fields_skip_identity() {
        assert_eq!(GOOD.value_fields(), vec!["text", "pinned"]);
        assert_eq!(GOOD.field_index("pinned"), Some(2));
        assert_eq!(GOOD.type_of("text"), Some("TEXT"));
        assert!(GOOD.require_field("missing").is_err());
    }
}

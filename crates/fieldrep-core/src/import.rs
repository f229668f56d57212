//! # Import Rules
//!
//! Row-shape and field coercion rules for delimited bulk imports. Reading
//! the file is the database crate's job; this module only decides what a
//! record must look like and what values it turns into.
//!
//! ## Formats
//! ```text
//! ┌──────────────┬───────────┬────────────┬───────────────────────────────┐
//! │ Kind         │ Table     │ Default    │ Columns                       │
//! ├──────────────┼───────────┼────────────┼───────────────────────────────┤
//! │ contacts     │ contact   │ pipe  |    │ descriptor width (7)          │
//! │ customers    │ customer  │ legacy ,   │ descriptor width (17)         │
//! │ lines        │ orderline │ pipe  |    │ descriptor width (11)         │
//! │ reports      │ report    │ pipe  |    │ descriptor width (26)         │
//! │ visits       │ visit     │ pipe  |    │ descriptor width (21)         │
//! └──────────────┴───────────┴────────────┴───────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::model::TableModel;
use crate::schema::Entity;
use crate::value::Value;

// =============================================================================
// Import Kind
// =============================================================================

/// Entity kinds that can be bulk imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Contacts,
    Customers,
    Lines,
    Reports,
    Visits,
}

impl ImportKind {
    pub const ALL: [ImportKind; 5] = [
        ImportKind::Contacts,
        ImportKind::Customers,
        ImportKind::Lines,
        ImportKind::Reports,
        ImportKind::Visits,
    ];

    pub fn entity(&self) -> Entity {
        match self {
            ImportKind::Contacts => Entity::Contact,
            ImportKind::Customers => Entity::Customer,
            ImportKind::Lines => Entity::Detail,
            ImportKind::Reports => Entity::Report,
            ImportKind::Visits => Entity::Visit,
        }
    }

    pub fn model(&self) -> &'static TableModel {
        self.entity().model()
    }

    /// Customer files only ever came comma-delimited.
    pub fn default_format(&self) -> ImportFormat {
        match self {
            ImportKind::Customers => ImportFormat::Legacy,
            _ => ImportFormat::Pipe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Contacts => "contacts",
            ImportKind::Customers => "customers",
            ImportKind::Lines => "lines",
            ImportKind::Reports => "reports",
            ImportKind::Visits => "visits",
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "contacts" | "contact" => Ok(ImportKind::Contacts),
            "customers" | "customer" => Ok(ImportKind::Customers),
            "lines" | "details" | "salelines" | "orderlines" => Ok(ImportKind::Lines),
            "reports" | "report" => Ok(ImportKind::Reports),
            "visits" | "visit" | "orders" => Ok(ImportKind::Visits),
            other => Err(format!(
                "Unknown import kind: '{}'. Valid options: contacts, customers, lines, reports, visits",
                other
            )),
        }
    }
}

// =============================================================================
// Import Format
// =============================================================================

/// Field delimiter family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// `|` separated, current export format.
    Pipe,
    /// `,` separated, older exports.
    Legacy,
}

impl ImportFormat {
    pub fn delimiter(&self) -> u8 {
        match self {
            ImportFormat::Pipe => b'|',
            ImportFormat::Legacy => b',',
        }
    }
}

// =============================================================================
// Import Spec
// =============================================================================

/// What a single import run expects from its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSpec {
    pub kind: ImportKind,
    pub format: ImportFormat,
    pub has_header: bool,
}

impl ImportSpec {
    /// Default format for `kind`, no header row.
    pub fn new(kind: ImportKind) -> Self {
        ImportSpec {
            kind,
            format: kind.default_format(),
            has_header: false,
        }
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_format(mut self, format: ImportFormat) -> Self {
        self.format = format;
        self
    }

    /// Every record must have exactly this many columns.
    pub fn expected_columns(&self) -> usize {
        self.kind.model().width()
    }

    /// Rejects a record whose width differs from the descriptor.
    pub fn check_width(&self, line: usize, found: usize) -> Result<(), ValidationError> {
        let expected = self.expected_columns();
        if found != expected {
            return Err(ValidationError::ColumnCount {
                line,
                expected,
                found,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Coercion
// =============================================================================

/// Converts raw text fields into values typed by the descriptor.
///
/// ## Rules
/// - Text columns: trimmed
/// - INTEGER columns: integers, or `true/false/yes/no/ja/nej` as 1/0
/// - REAL columns: floats, comma decimal separator accepted
/// - Empty numeric: NULL for identity or nullable columns, 0 otherwise
/// - Unparseable numeric text is kept as text (SQLite stores it as is)
pub fn coerce_record<'a, I>(model: &TableModel, fields: I) -> Vec<Value>
where
    I: IntoIterator<Item = &'a str>,
{
    fields
        .into_iter()
        .zip(model.types.iter())
        .map(|(raw, decl)| coerce_field(decl, raw))
        .collect()
}

/// Coerces one field according to its SQL declaration.
pub fn coerce_field(decl: &str, raw: &str) -> Value {
    let text = raw.trim();
    let decl = decl.to_ascii_uppercase();

    if decl.starts_with("INTEGER") {
        if text.is_empty() {
            return empty_numeric(&decl, Value::Integer(0));
        }
        if let Ok(i) = text.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Some(flag) = parse_flag(text) {
            return Value::Integer(flag);
        }
        return Value::Text(text.to_string());
    }

    if decl.starts_with("REAL") {
        if text.is_empty() {
            return empty_numeric(&decl, Value::Real(0.0));
        }
        return match text.replace(',', ".").parse::<f64>() {
            Ok(r) => Value::Real(r),
            Err(_) => Value::Text(text.to_string()),
        };
    }

    Value::Text(text.to_string())
}

fn empty_numeric(decl: &str, zero: Value) -> Value {
    if decl.contains("PRIMARY KEY") {
        Value::Null
    } else if decl.contains("NOT NULL") || decl.contains("DEFAULT") {
        zero
    } else {
        Value::Null
    }
}

fn parse_flag(text: &str) -> Option<i64> {
    match text.to_lowercase().as_str() {
        "true" | "yes" | "y" | "ja" | "j" => Some(1),
        "false" | "no" | "n" | "nej" => Some(0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CONTACT, ORDERLINE};

    #[test]
    fn test_kind_parsing_and_formats() {
        assert_eq!("Details".parse::<ImportKind>().unwrap(), ImportKind::Lines);
        assert!("invoices".parse::<ImportKind>().is_err());
        assert_eq!(ImportKind::Customers.default_format().delimiter(), b',');
        assert_eq!(ImportKind::Visits.default_format().delimiter(), b'|');
    }

    #[test]
    fn test_check_width() {
        let spec = ImportSpec::new(ImportKind::Contacts);
        assert!(spec.check_width(1, 7).is_ok());
        assert_eq!(
            spec.check_width(4, 6),
            Err(ValidationError::ColumnCount {
                line: 4,
                expected: 7,
                found: 6,
            })
        );
    }

    #[test]
    fn test_coerce_contact_record() {
        let values = coerce_record(
            &CONTACT,
            ["", " 7 ", " Jane Doe ", "Sales", "j@x.com", "555-1000", ""],
        );
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Integer(7),
                Value::from("Jane Doe"),
                Value::from("Sales"),
                Value::from("j@x.com"),
                Value::from("555-1000"),
                Value::from(""),
            ]
        );
    }

    #[test]
    fn test_coerce_flags_and_decimals() {
        let values = coerce_record(
            &ORDERLINE,
            ["1", "3", "12", "SKU-1", "Widget", "19,95", "True", "", "N", "", "W1"],
        );
        assert_eq!(values[5], Value::Real(19.95));
        assert_eq!(values[6], Value::Integer(1));
        // DEFAULT 0 column left empty
        assert_eq!(values[7], Value::Real(0.0));
        assert_eq!(coerce_field("INTEGER", "no"), Value::Integer(0));
        assert_eq!(coerce_field("INTEGER", "n/a"), Value::from("n/a"));
        assert_eq!(coerce_field("INTEGER", ""), Value::Null);
    }
}

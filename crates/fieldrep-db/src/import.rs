//! # Bulk CSV Import
//!
//! Destructive reimport of one table from a delimited file.
//!
//! ## Import Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  import_csv(path, spec)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DROP TABLE + CREATE TABLE   ← replace, never merge                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  read records (blocking thread, `|` or `,`, optional header)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each record:                                                       │
//! │     width != descriptor width ──► abort (rows so far stay committed)    │
//! │     coerce fields (trim, 0/1 flags, decimals)                           │
//! │     repository insert                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ok(rows inserted)                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder};
use fieldrep_core::import::{coerce_record, ImportFormat, ImportSpec};
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::Repository;

/// One raw record with the file line it started on.
#[derive(Debug, Clone)]
struct RawRecord {
    line: usize,
    fields: Vec<String>,
}

impl Repository {
    /// Replaces the table's contents with the records of `path`.
    ///
    /// ## Returns
    /// * `Ok(n)` - every record was inserted
    /// * `Err(DbError::Validation(..))` - a record had the wrong width;
    ///   records before it remain in the table
    /// * `Err(DbError::ImportFailed(..))` - the file could not be read
    ///   (the table is left empty) or `spec` targets another table
    pub async fn import_csv(&mut self, path: impl AsRef<Path>, spec: &ImportSpec) -> DbResult<usize> {
        let model = self.model();
        if spec.kind.model().name != model.name {
            return Err(DbError::ImportFailed(format!(
                "{} import cannot target table {}",
                spec.kind, model.name
            )));
        }

        let path = path.as_ref().to_path_buf();
        info!(table = %model.name, path = %path.display(), kind = %spec.kind, "Starting import");

        self.recreate_table().await?;

        let records = read_records(path, spec.format, spec.has_header).await?;

        let mut inserted = 0;
        for record in &records {
            if let Err(err) = spec.check_width(record.line, record.fields.len()) {
                warn!(
                    table = %model.name,
                    line = record.line,
                    inserted,
                    "Import aborted on malformed record"
                );
                return Err(err.into());
            }
            let values = coerce_record(model, record.fields.iter().map(String::as_str));
            self.insert(values).await?;
            inserted += 1;
        }

        info!(table = %model.name, rows = inserted, "Import complete");
        Ok(inserted)
    }
}

async fn read_records(
    path: PathBuf,
    format: ImportFormat,
    has_header: bool,
) -> DbResult<Vec<RawRecord>> {
    tokio::task::spawn_blocking(move || read_records_blocking(&path, format, has_header))
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?
}

fn read_records_blocking(
    path: &Path,
    format: ImportFormat,
    has_header: bool,
) -> DbResult<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(format.delimiter())
        .has_headers(has_header)
        .flexible(true)
        // Pipe exports never quote; a stray `"` is data
        .quoting(format == ImportFormat::Legacy)
        .from_path(path)?;

    let mut records = Vec::new();
    let mut raw = ByteRecord::new();
    while reader.read_byte_record(&mut raw)? {
        let line = raw
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(records.len() + 1);
        // Older exports are not always UTF-8
        let fields = raw
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        records.push(RawRecord { line, fields });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use fieldrep_core::{Entity, ImportKind, ValidationError, Value};
    use tempfile::NamedTempFile;

    use super::*;
    use crate::repository::test_support::memory_db;

    fn fixture(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_import_inserts_one_row_per_line() {
        let db = memory_db().await;
        let mut contacts = db.contacts();
        contacts
            .insert(vec![
                Value::Null,
                1.into(),
                "Old".into(),
                "".into(),
                "".into(),
                "".into(),
                "".into(),
            ])
            .await
            .unwrap();

        let file = fixture(
            "|7| Jane Doe |Sales|j@x.com|555-1000|\n\
             |7|John Roe|Support|r@x.com|555-2000|note\n\
             |8|Ann Poe||||\n",
        );
        let spec = ImportSpec::new(ImportKind::Contacts);
        let count = contacts.import_csv(file.path(), &spec).await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(contacts.count().await.unwrap(), 3);
        let rows = contacts.load_for_customer(7).await.unwrap();
        assert_eq!(rows[0].get_str("name"), Some("Jane Doe"));
        assert_eq!(rows[1].get_str("infotext"), Some("note"));
    }

    #[tokio::test]
    async fn test_malformed_row_aborts_but_keeps_earlier_rows() {
        let db = memory_db().await;
        let mut contacts = db.contacts();
        let file = fixture(
            "|7|Jane Doe|Sales|j@x.com|555-1000|\n\
             |7|Broken|Sales\n\
             |8|Never Seen|||| \n",
        );

        let err = contacts
            .import_csv(file.path(), &ImportSpec::new(ImportKind::Contacts))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Validation(ValidationError::ColumnCount {
                line: 2,
                expected: 7,
                found: 4,
            })
        ));
        assert_eq!(contacts.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_header_row_is_skipped_and_legacy_commas_parse() {
        let db = memory_db().await;
        let mut customers = db.customers();
        let file = fixture(
            "customerid,employeeid,account,company,address1,address2,zipcode,city,country,salesrep,phone1,phone2,vat,email,factor,infotext,modified\n\
             ,1,1001,\"Acme, Inc\",Main St 1,,8000,Aarhus,DK,R7,555,,DK123,a@acme.dk,\"1,5\",,yes\n",
        );
        let spec = ImportSpec::new(ImportKind::Customers).with_header(true);
        assert_eq!(customers.import_csv(file.path(), &spec).await.unwrap(), 1);

        let acme = customers.find_by_account("1001").await.unwrap().unwrap();
        assert_eq!(acme.get_str("company"), Some("Acme, Inc"));
        assert_eq!(acme.get_f64("factor"), Some(1.5));
        assert_eq!(acme.get_i64("modified"), Some(1));
    }

    #[tokio::test]
    async fn test_kind_must_match_table_and_file_must_exist() {
        let db = memory_db().await;
        let mut visits = db.repository(Entity::Visit);

        let err = visits
            .import_csv("/nonexistent/visits.txt", &ImportSpec::new(ImportKind::Visits))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ImportFailed(_)));

        let err = visits
            .import_csv("/nonexistent/visits.txt", &ImportSpec::new(ImportKind::Lines))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ImportFailed(_)));
    }

    #[tokio::test]
    async fn test_missing_file_still_empties_the_table() {
        let db = memory_db().await;
        let mut contacts = db.contacts();
        let err = contacts
            .import_csv("/nonexistent/contacts.txt", &ImportSpec::new(ImportKind::Contacts))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ImportFailed(_)));
        assert_eq!(contacts.count().await.unwrap(), 0);
    }
}

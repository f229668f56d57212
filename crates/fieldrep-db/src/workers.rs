//! # Import Workers
//!
//! Runs bulk imports on background tasks, at most one per import kind.
//!
//! ```text
//! spawn(Contacts) ──► running = {Contacts}        task: contacts import
//! spawn(Visits)   ──► running = {Contacts,Visits} task: visits import
//! spawn(Contacts) ──► Err(ImportInProgress(Contacts))
//!            ...task finishes...
//! running = {Visits}
//! ```
//!
//! Each worker builds its own repository from a cloned [`Database`], so
//! workers share the pool but not a connection or a row cache. A started
//! import is never cancelled; it runs to completion or to its first
//! malformed record.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use fieldrep_core::{ImportKind, ImportSpec};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;

/// Registry and launcher of import workers.
#[derive(Debug, Clone)]
pub struct ImportWorkers {
    db: Database,
    running: Arc<Mutex<HashSet<ImportKind>>>,
}

impl ImportWorkers {
    pub fn new(db: Database) -> Self {
        ImportWorkers {
            db,
            running: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Starts importing `path` according to `spec`.
    ///
    /// ## Returns
    /// * `Ok(handle)` - resolves to the import's own result
    /// * `Err(DbError::ImportInProgress)` - that kind is already running
    pub async fn spawn(
        &self,
        path: impl Into<PathBuf>,
        spec: ImportSpec,
    ) -> DbResult<JoinHandle<DbResult<usize>>> {
        {
            let mut running = self.running.lock().await;
            if !running.insert(spec.kind) {
                return Err(DbError::ImportInProgress(spec.kind));
            }
        }

        let path = path.into();
        let db = self.db.clone();
        let running = Arc::clone(&self.running);
        info!(kind = %spec.kind, path = %path.display(), "Import worker started");

        Ok(tokio::spawn(async move {
            let mut repo = db.repository(spec.kind.entity());
            let result = repo.import_csv(&path, &spec).await;

            running.lock().await.remove(&spec.kind);
            match &result {
                Ok(rows) => info!(kind = %spec.kind, rows, "Import worker finished"),
                Err(e) => warn!(kind = %spec.kind, error = %e, "Import worker failed"),
            }
            result
        }))
    }

    pub async fn is_running(&self, kind: ImportKind) -> bool {
        self.running.lock().await.contains(&kind)
    }

    /// Kinds with a worker in flight, in [`ImportKind::ALL`] order.
    pub async fn running(&self) -> Vec<ImportKind> {
        let running = self.running.lock().await;
        ImportKind::ALL
            .into_iter()
            .filter(|kind| running.contains(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::repository::test_support::memory_db;

    fn fixture(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_second_worker_of_same_kind_is_rejected() {
        let db = memory_db().await;
        let workers = ImportWorkers::new(db.clone());
        let file = fixture("|7|Jane Doe|Sales|j@x.com|555-1000|\n");
        let spec = ImportSpec::new(ImportKind::Contacts);

        let handle = workers.spawn(file.path(), spec).await.unwrap();
        assert!(workers.is_running(ImportKind::Contacts).await);
        assert!(matches!(
            workers.spawn(file.path(), spec).await,
            Err(DbError::ImportInProgress(ImportKind::Contacts))
        ));

        assert_eq!(handle.await.unwrap().unwrap(), 1);
        assert!(workers.running().await.is_empty());

        // Free again once finished
        let again = workers.spawn(file.path(), spec).await.unwrap();
        assert_eq!(again.await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_different_kinds_run_side_by_side() {
        let db = memory_db().await;
        let workers = ImportWorkers::new(db.clone());
        let contacts = fixture("|7|Jane Doe|Sales|j@x.com|555-1000|\n");
        let lines = fixture("|3|2|SKU-1|Widget|9,95|0|0|N||W1\n|3|1|SKU-2|Gadget|5|ja|10|N||W2\n");

        let a = workers
            .spawn(contacts.path(), ImportSpec::new(ImportKind::Contacts))
            .await
            .unwrap();
        let b = workers
            .spawn(lines.path(), ImportSpec::new(ImportKind::Lines))
            .await
            .unwrap();
        assert_eq!(
            workers.running().await,
            vec![ImportKind::Contacts, ImportKind::Lines]
        );

        assert_eq!(a.await.unwrap().unwrap(), 1);
        assert_eq!(b.await.unwrap().unwrap(), 2);

        let totals = db.details().visit_totals(3).await.unwrap();
        assert_eq!(totals.pieces, 3);
        assert_eq!(totals.lines, 2);
    }

    #[tokio::test]
    async fn test_failed_import_releases_its_kind() {
        let db = memory_db().await;
        let workers = ImportWorkers::new(db);
        let bad = fixture("|7|short\n");

        let handle = workers
            .spawn(bad.path(), ImportSpec::new(ImportKind::Contacts))
            .await
            .unwrap();
        assert!(handle.await.unwrap().is_err());
        assert!(!workers.is_running(ImportKind::Contacts).await);
    }
}

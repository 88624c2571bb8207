//! Redb backend for blacklist storage.
//!
//! Redb is a pure Rust embedded key-value store with ACID transactions.
//! Every write here runs in its own write transaction and is durable once
//! `commit` returns. Redb allows a single writer at a time, which is what
//! makes [`BlacklistBackend::update`] atomic.
//!
//! # Configuration Example
//! ```yaml
//! blacklist:
//!   backend: redb
//!   path: "/data/blacklist.redb"
//! ```

use crate::backend::UpdateFn;
use crate::{BlacklistBackend, BlacklistError};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

/// One row per submitter identifier.
const BLACKLIST_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("blacklist");

/// Redb-backed blacklist storage.
///
/// The `Arc<Database>` wrapper allows safe sharing across threads; redb
/// handles its own locking and MVCC.
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open or create a database at `path`.
    ///
    /// ```no_run
    /// use blacklist::RedbBackend;
    ///
    /// let backend = RedbBackend::open("/tmp/blacklist.redb").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BlacklistError> {
        let db = Database::create(path).map_err(BlacklistError::unavailable)?;

        // Opening the table in a write txn creates it.
        let write_txn = db.begin_write().map_err(BlacklistError::unavailable)?;
        {
            let _table = write_txn
                .open_table(BLACKLIST_TABLE)
                .map_err(BlacklistError::unavailable)?;
        }
        write_txn.commit().map_err(BlacklistError::unavailable)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl BlacklistBackend for RedbBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlacklistError> {
        let read_txn = self.db.begin_read().map_err(BlacklistError::unavailable)?;
        let table = read_txn
            .open_table(BLACKLIST_TABLE)
            .map_err(BlacklistError::unavailable)?;

        Ok(table
            .get(key)
            .map_err(BlacklistError::unavailable)?
            .map(|value| value.value().to_vec()))
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<Vec<u8>, BlacklistError> {
        let write_txn = self.db.begin_write().map_err(BlacklistError::unavailable)?;

        let next = {
            let mut table = write_txn
                .open_table(BLACKLIST_TABLE)
                .map_err(BlacklistError::unavailable)?;
            let current = table
                .get(key)
                .map_err(BlacklistError::unavailable)?
                .map(|value| value.value().to_vec());
            // An error here drops the txn uncommitted, which aborts it.
            let next = f(current.as_deref())?;
            table
                .insert(key, next.as_slice())
                .map_err(BlacklistError::unavailable)?;
            next
        };

        write_txn.commit().map_err(BlacklistError::unavailable)?;
        Ok(next)
    }

    fn remove(&self, key: &str) -> Result<bool, BlacklistError> {
        let write_txn = self.db.begin_write().map_err(BlacklistError::unavailable)?;

        let existed = {
            let mut table = write_txn
                .open_table(BLACKLIST_TABLE)
                .map_err(BlacklistError::unavailable)?;
            let removed = table.remove(key).map_err(BlacklistError::unavailable)?;
            removed.is_some()
        };

        write_txn.commit().map_err(BlacklistError::unavailable)?;
        Ok(existed)
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), BlacklistError>,
    ) -> Result<(), BlacklistError> {
        let read_txn = self.db.begin_read().map_err(BlacklistError::unavailable)?;
        let table = read_txn
            .open_table(BLACKLIST_TABLE)
            .map_err(BlacklistError::unavailable)?;

        for item in table.iter().map_err(BlacklistError::unavailable)? {
            let (_, value) = item.map_err(BlacklistError::unavailable)?;
            visitor(value.value())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_redb_backend_update_and_get() {
        let temp_file = NamedTempFile::new().unwrap();
        let backend = RedbBackend::open(temp_file.path()).unwrap();

        backend.update("key1", &mut |_| Ok(b"value1".to_vec())).unwrap();
        assert_eq!(backend.get("key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(backend.get("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_redb_backend_update_reads_current() {
        let temp_file = NamedTempFile::new().unwrap();
        let backend = RedbBackend::open(temp_file.path()).unwrap();

        backend.update("key1", &mut |_| Ok(vec![1])).unwrap();
        let stored = backend
            .update("key1", &mut |prev| {
                let mut next = prev.unwrap_or_default().to_vec();
                next.push(2);
                Ok(next)
            })
            .unwrap();
        assert_eq!(stored, vec![1, 2]);
    }

    #[test]
    fn test_redb_backend_aborted_update() {
        let temp_file = NamedTempFile::new().unwrap();
        let backend = RedbBackend::open(temp_file.path()).unwrap();

        let res = backend.update("key1", &mut |_| Err(BlacklistError::Encode("nope".into())));
        assert!(res.is_err());
        assert_eq!(backend.get("key1").unwrap(), None);
    }

    #[test]
    fn test_redb_backend_remove() {
        let temp_file = NamedTempFile::new().unwrap();
        let backend = RedbBackend::open(temp_file.path()).unwrap();

        backend.update("key1", &mut |_| Ok(b"value1".to_vec())).unwrap();
        assert!(backend.remove("key1").unwrap());
        assert!(!backend.remove("key1").unwrap());
        assert_eq!(backend.get("key1").unwrap(), None);
    }

    #[test]
    fn test_redb_backend_scan() {
        let temp_file = NamedTempFile::new().unwrap();
        let backend = RedbBackend::open(temp_file.path()).unwrap();

        backend.update("key1", &mut |_| Ok(b"value1".to_vec())).unwrap();
        backend.update("key2", &mut |_| Ok(b"value2".to_vec())).unwrap();

        let mut collected = Vec::new();
        backend
            .scan(&mut |value| {
                collected.push(value.to_vec());
                Ok(())
            })
            .unwrap();

        assert_eq!(collected.len(), 2);
        assert!(collected.contains(&b"value1".to_vec()));
        assert!(collected.contains(&b"value2".to_vec()));
    }

    #[test]
    fn test_redb_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blacklist.redb");
        {
            let backend = RedbBackend::open(&path).unwrap();
            backend.update("key1", &mut |_| Ok(b"value1".to_vec())).unwrap();
        }
        let backend = RedbBackend::open(&path).unwrap();
        assert_eq!(backend.get("key1").unwrap(), Some(b"value1".to_vec()));
    }
}

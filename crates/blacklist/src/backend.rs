use crate::BlacklistError;
use std::collections::HashMap;
use std::sync::RwLock;

/// Read-modify-write callback: receives the current value (if any) and
/// returns the value to store.
pub type UpdateFn<'a> = dyn FnMut(Option<&[u8]>) -> Result<Vec<u8>, BlacklistError> + 'a;

/// Key-value storage behind the blacklist.
///
/// Every write must be durable (or, for ephemeral backends, visible to all
/// readers) by the time the call returns.
pub trait BlacklistBackend: Send + Sync {
    /// Retrieve a value by key.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlacklistError>;
    /// Atomically replace the value under `key` with whatever `f` returns.
    ///
    /// No other write to the backend can interleave between the read handed
    /// to `f` and the write of its result. Returns the stored value.
    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<Vec<u8>, BlacklistError>;
    /// Delete a key. Returns true if it existed.
    fn remove(&self, key: &str) -> Result<bool, BlacklistError>;
    /// Visit every stored value.
    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), BlacklistError>,
    ) -> Result<(), BlacklistError>;
}

/// Selects and builds a backend.
///
/// ```
/// use blacklist::BackendConfig;
///
/// let config = BackendConfig::in_memory();
/// let config = BackendConfig::redb("/data/blacklist.redb");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendConfig {
    /// Durable on-disk storage in a redb file at `path`.
    Redb { path: String },
    /// Process-local map. Lost on restart; tests opt into it explicitly.
    InMemory,
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn redb<P: Into<String>>(path: P) -> Self {
        BackendConfig::Redb { path: path.into() }
    }

    /// Build the backend; fails with [`BlacklistError::Unavailable`] if the
    /// database cannot be opened.
    pub fn build(&self) -> Result<Box<dyn BlacklistBackend>, BlacklistError> {
        match self {
            BackendConfig::InMemory => Ok(Box::new(InMemoryBackend::new())),
            BackendConfig::Redb { path } => {
                #[cfg(feature = "backend-redb")]
                {
                    Ok(Box::new(RedbBackend::open(path)?))
                }
                #[cfg(not(feature = "backend-redb"))]
                {
                    let _ = path;
                    Err(BlacklistError::unavailable(
                        "redb backend disabled at compile time",
                    ))
                }
            }
        }
    }
}

/// An in-memory backend using a `RwLock` around a `HashMap`.
pub struct InMemoryBackend {
    records: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl BlacklistBackend for InMemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlacklistError> {
        let guard = self
            .records
            .read()
            .map_err(|_| BlacklistError::unavailable("poisoned lock"))?;
        Ok(guard.get(key).cloned())
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<Vec<u8>, BlacklistError> {
        // The write lock spans both the read and the write.
        let mut guard = self
            .records
            .write()
            .map_err(|_| BlacklistError::unavailable("poisoned lock"))?;
        let next = f(guard.get(key).map(Vec::as_slice))?;
        guard.insert(key.to_string(), next.clone());
        Ok(next)
    }

    fn remove(&self, key: &str) -> Result<bool, BlacklistError> {
        Ok(self
            .records
            .write()
            .map_err(|_| BlacklistError::unavailable("poisoned lock"))?
            .remove(key)
            .is_some())
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), BlacklistError>,
    ) -> Result<(), BlacklistError> {
        let guard = self
            .records
            .read()
            .map_err(|_| BlacklistError::unavailable("poisoned lock"))?;
        for value in guard.values() {
            visitor(value)?;
        }
        Ok(())
    }
}

#[cfg(feature = "backend-redb")]
pub mod redb;

#[cfg(feature = "backend-redb")]
pub use self::redb::RedbBackend;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_update_sees_previous_value() {
        let backend = InMemoryBackend::new();
        let first = backend
            .update("k", &mut |prev| {
                assert!(prev.is_none());
                Ok(b"one".to_vec())
            })
            .unwrap();
        assert_eq!(first, b"one");

        backend
            .update("k", &mut |prev| {
                assert_eq!(prev, Some(&b"one"[..]));
                Ok(b"two".to_vec())
            })
            .unwrap();
        assert_eq!(backend.get("k").unwrap(), Some(b"two".to_vec()));
    }

    #[test]
    fn in_memory_failed_update_writes_nothing() {
        let backend = InMemoryBackend::new();
        let res = backend.update("k", &mut |_| Err(BlacklistError::Encode("boom".into())));
        assert!(res.is_err());
        assert_eq!(backend.get("k").unwrap(), None);
    }

    #[test]
    fn in_memory_remove_reports_presence() {
        let backend = InMemoryBackend::new();
        assert!(!backend.remove("k").unwrap());
        backend.update("k", &mut |_| Ok(vec![1])).unwrap();
        assert!(backend.remove("k").unwrap());
        assert_eq!(backend.get("k").unwrap(), None);
    }

    #[test]
    fn in_memory_config_builds() {
        assert!(BackendConfig::in_memory().build().is_ok());
    }
}

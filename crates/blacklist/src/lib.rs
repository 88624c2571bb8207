//! # Plagiat Blacklist
//!
//! Durable record of submitters whose work crossed the similarity threshold.
//!
//! ## Core Features
//!
//! - **One entry per identifier**: the identifier is the storage key and is
//!   treated as an opaque string (an IP address, a student id, ...).
//! - **Atomic refresh**: [`BlacklistStore::record_offense`] reads, updates and
//!   writes an entry inside a single backend transaction, so concurrent
//!   offenses for the same identifier never lose an update.
//! - **Overwrite, not max**: a repeat offense replaces the stored score,
//!   timestamp and reason even when the new score is lower. Entries never
//!   expire; only [`BlacklistStore::remove`] deletes them.
//! - **Pluggable Backends** through the [`BlacklistBackend`] trait: an
//!   in-memory map and a redb file (enabled by the `backend-redb` feature).
//!
//! Entries are bincode-encoded and carry [`BLACKLIST_SCHEMA_VERSION`].
//!
//! ## Example Usage
//!
//! ```
//! use blacklist::{BackendConfig, BlacklistStore};
//!
//! let store = BlacklistStore::new(&BackendConfig::in_memory()).unwrap();
//! assert!(!store.is_blacklisted("10.0.0.5").unwrap());
//!
//! let entry = store
//!     .record_offense("10.0.0.5", 85.3, "Similarity 85.3% >= threshold 80%")
//!     .unwrap();
//! assert_eq!(entry.offense_count, 1);
//! assert!(store.is_blacklisted("10.0.0.5").unwrap());
//!
//! assert!(store.remove("10.0.0.5").unwrap());
//! assert!(!store.is_blacklisted("10.0.0.5").unwrap());
//! ```

mod backend;

pub use backend::{BackendConfig, BlacklistBackend, InMemoryBackend, UpdateFn};
#[cfg(feature = "backend-redb")]
pub use backend::RedbBackend;

use bincode::config::standard;
use bincode::error::{DecodeError, EncodeError};
use bincode::serde::{decode_from_slice, encode_to_vec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bump this value whenever the stored `BlacklistEntry` layout changes.
pub const BLACKLIST_SCHEMA_VERSION: u16 = 1;

/// A blacklisted submitter.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BlacklistEntry {
    /// Layout version of the stored record.
    pub schema_version: u16,
    /// Opaque submitter identifier; also the storage key.
    pub identifier: String,
    /// Similarity percentage of the most recent offense. Despite the name
    /// this is not a running maximum.
    pub max_similarity: f64,
    /// When the most recent offense was recorded (UTC, RFC 3339 on the wire).
    pub ban_timestamp: DateTime<Utc>,
    /// Human-readable reason for the most recent offense.
    pub reason: String,
    /// How many offenses were recorded for this identifier.
    pub offense_count: u32,
}

/// Errors produced by the blacklist store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlacklistError {
    #[error("blacklist store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid submitter identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("similarity must be a finite number, got {0}")]
    InvalidSimilarity(f64),
    #[error("blacklist encode error: {0}")]
    Encode(String),
    #[error("blacklist decode error: {0}")]
    Decode(String),
}

impl From<EncodeError> for BlacklistError {
    fn from(e: EncodeError) -> Self {
        BlacklistError::Encode(e.to_string())
    }
}

impl From<DecodeError> for BlacklistError {
    fn from(e: DecodeError) -> Self {
        BlacklistError::Decode(e.to_string())
    }
}

impl BlacklistError {
    pub fn unavailable<E: std::fmt::Display>(err: E) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// The blacklist, over any [`BlacklistBackend`].
pub struct BlacklistStore {
    backend: Box<dyn BlacklistBackend>,
}

impl BlacklistStore {
    /// Open the configured backend.
    pub fn new(cfg: &BackendConfig) -> Result<Self, BlacklistError> {
        let backend = cfg.build()?;
        Ok(Self::with_backend(backend))
    }

    /// Wrap an already-built backend.
    pub fn with_backend(backend: Box<dyn BlacklistBackend>) -> Self {
        Self { backend }
    }

    /// Ephemeral store, mostly for tests.
    pub fn in_memory() -> Self {
        Self::with_backend(Box::new(InMemoryBackend::new()))
    }

    /// Whether an entry exists for `identifier`. Never writes.
    pub fn is_blacklisted(&self, identifier: &str) -> Result<bool, BlacklistError> {
        validate_identifier(identifier)?;
        Ok(self.backend.get(identifier)?.is_some())
    }

    pub fn get(&self, identifier: &str) -> Result<Option<BlacklistEntry>, BlacklistError> {
        validate_identifier(identifier)?;
        match self.backend.get(identifier)? {
            Some(data) => Ok(Some(decode_entry(&data)?)),
            None => Ok(None),
        }
    }

    /// Insert or refresh the entry for `identifier`, stamped with the
    /// current time.
    pub fn record_offense(
        &self,
        identifier: &str,
        similarity: f64,
        reason: impl Into<String>,
    ) -> Result<BlacklistEntry, BlacklistError> {
        self.record_offense_at(identifier, similarity, reason, Utc::now())
    }

    /// Same as [`record_offense`](Self::record_offense) with an explicit
    /// timestamp.
    ///
    /// The new score, timestamp and reason replace the old ones
    /// unconditionally; `offense_count` increments.
    pub fn record_offense_at(
        &self,
        identifier: &str,
        similarity: f64,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<BlacklistEntry, BlacklistError> {
        validate_identifier(identifier)?;
        if !similarity.is_finite() {
            return Err(BlacklistError::InvalidSimilarity(similarity));
        }
        let reason = reason.into();

        let stored = self.backend.update(identifier, &mut |current| {
            let offense_count = match current {
                Some(data) => decode_entry(data)?.offense_count.saturating_add(1),
                None => 1,
            };
            let entry = BlacklistEntry {
                schema_version: BLACKLIST_SCHEMA_VERSION,
                identifier: identifier.to_string(),
                max_similarity: similarity,
                ban_timestamp: at,
                reason: reason.clone(),
                offense_count,
            };
            encode_entry(&entry)
        })?;

        let entry = decode_entry(&stored)?;
        tracing::info!(
            identifier,
            similarity,
            offense_count = entry.offense_count,
            "submitter blacklisted"
        );
        Ok(entry)
    }

    /// Every entry, most recent ban first; ties ordered by identifier.
    pub fn list(&self) -> Result<Vec<BlacklistEntry>, BlacklistError> {
        let mut entries = Vec::new();
        self.backend.scan(&mut |data| {
            entries.push(decode_entry(data)?);
            Ok(())
        })?;
        entries.sort_by(|a, b| {
            b.ban_timestamp
                .cmp(&a.ban_timestamp)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        Ok(entries)
    }

    /// Delete the entry for `identifier`. Returns true if one existed.
    pub fn remove(&self, identifier: &str) -> Result<bool, BlacklistError> {
        validate_identifier(identifier)?;
        let existed = self.backend.remove(identifier)?;
        if existed {
            tracing::info!(identifier, "submitter removed from blacklist");
        }
        Ok(existed)
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize, BlacklistError> {
        let mut count = 0usize;
        self.backend.scan(&mut |_| {
            count += 1;
            Ok(())
        })?;
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool, BlacklistError> {
        Ok(self.len()? == 0)
    }
}

fn validate_identifier(identifier: &str) -> Result<(), BlacklistError> {
    if identifier.trim().is_empty() {
        return Err(BlacklistError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(())
}

fn encode_entry(entry: &BlacklistEntry) -> Result<Vec<u8>, BlacklistError> {
    Ok(encode_to_vec(entry, standard())?)
}

fn decode_entry(data: &[u8]) -> Result<BlacklistEntry, BlacklistError> {
    let (entry, _): (BlacklistEntry, usize) = decode_from_slice(data, standard())?;
    if entry.schema_version != BLACKLIST_SCHEMA_VERSION {
        return Err(BlacklistError::Decode(format!(
            "unsupported schema version {}",
            entry.schema_version
        )));
    }
    Ok(entry)
}

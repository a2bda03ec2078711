//! Media record store for acquired content.
//!
//! One record per media item, created at submission time as a promise of a
//! future file. The store interface is deliberately narrow so a database
//! backend can replace the in-memory default without touching the core.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::queue::JobId;

/// Surrogate identifier for a media record, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RecordId(u64);

impl RecordId {
    /// Creates RecordId from a raw store identifier.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted entity describing one acquired media file.
///
/// Created before the producing job finishes, so `path` is a promise, not
/// proof a file exists. Records are never mutated; deletion first reconciles
/// any still-running job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    /// Store-assigned identifier
    pub id: RecordId,
    /// Filename derived from the magnet display name at submission
    pub filename: String,
    /// Directory where the encoded file lands once the job finishes
    pub path: PathBuf,
    /// Opaque token minted at submission, correlating record and job
    pub hash: Uuid,
    /// Queue job producing (or having produced) this file
    pub job_id: JobId,
    /// Original acquisition source, retained for audit
    pub magnet_link: String,
    /// Attribution; single fixed owner in current scope
    pub owner_id: u64,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating a record.
#[derive(Debug, Clone)]
pub struct NewMediaRecord {
    pub filename: String,
    pub path: PathBuf,
    pub hash: Uuid,
    pub job_id: JobId,
    pub magnet_link: String,
    pub owner_id: u64,
}

/// Errors produced by record store operations.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Record {id} not found")]
    RecordNotFound { id: RecordId },

    #[error("Record store failure: {reason}")]
    Backend { reason: String },
}

/// Narrow persistence interface the core needs from a record store.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persists a new record and returns it with an assigned id.
    ///
    /// # Errors
    /// - `LibraryError::Backend` - Store rejected the write
    async fn create_record(&self, record: NewMediaRecord) -> Result<MediaRecord, LibraryError>;

    /// Finds a record by id.
    ///
    /// # Errors
    /// - `LibraryError::Backend` - Store could not be read
    async fn find_by_id(&self, id: RecordId) -> Result<Option<MediaRecord>, LibraryError>;

    /// Lists every record.
    ///
    /// # Errors
    /// - `LibraryError::Backend` - Store could not be read
    async fn list_all(&self) -> Result<Vec<MediaRecord>, LibraryError>;

    /// Deletes a record by id.
    ///
    /// # Errors
    /// - `LibraryError::RecordNotFound` - No record with that id
    async fn delete_by_id(&self, id: RecordId) -> Result<(), LibraryError>;
}

/// In-memory record store.
///
/// The default backend for development and tests; rows live in a map keyed
/// by id, with ids assigned from a process-local counter.
#[derive(Debug, Default)]
pub struct InMemoryMediaStore {
    records: RwLock<HashMap<u64, MediaRecord>>,
    next_id: AtomicU64,
}

impl InMemoryMediaStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn create_record(&self, record: NewMediaRecord) -> Result<MediaRecord, LibraryError> {
        let id = RecordId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let record = MediaRecord {
            id,
            filename: record.filename,
            path: record.path,
            hash: record.hash,
            job_id: record.job_id,
            magnet_link: record.magnet_link,
            owner_id: record.owner_id,
            created_at: Utc::now(),
        };

        let mut records = self.records.write().await;
        records.insert(id.as_u64(), record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<MediaRecord>, LibraryError> {
        let records = self.records.read().await;
        Ok(records.get(&id.as_u64()).cloned())
    }

    async fn list_all(&self) -> Result<Vec<MediaRecord>, LibraryError> {
        let records = self.records.read().await;
        let mut all: Vec<MediaRecord> = records.values().cloned().collect();
        all.sort_by_key(|record| record.id.as_u64());
        Ok(all)
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<(), LibraryError> {
        let mut records = self.records.write().await;
        records
            .remove(&id.as_u64())
            .map(|_| ())
            .ok_or(LibraryError::RecordNotFound { id })
    }
}

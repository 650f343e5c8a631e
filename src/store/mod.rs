//! Persistence collaborator.
//!
//! Everything outside this crate that holds records is reduced to one
//! surface: read/write a record in a named collection. Timestamps are
//! assigned by the store at write time, never by the client clock.
//!
//! Two operations exist specifically to close the races a naive
//! find-or-create protocol has over a shared aggregate: [`RecordStore::create_unique`]
//! (insert guarded by a uniqueness constraint) and [`FieldOp::Increment`]
//! (atomic relative update instead of read-modify-write).

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::ComposerError;

pub use memory::MemoryStore;

/// Equality filter on one record field.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A single-field mutation applied by [`RecordStore::update_record`].
#[derive(Debug, Clone)]
pub enum FieldOp {
    /// Overwrite the field.
    Set(Value),
    /// Atomically add to the field's integer value, treating absent as 0.
    Increment(i64),
}

/// A record as read back from a collection.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: String,
    pub fields: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl StoredRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Deserialize the record fields into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ComposerError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| ComposerError::PersistenceError(format!("malformed record: {}", e)))
    }
}

/// Identity and server-assigned timestamp of a freshly created record.
#[derive(Debug, Clone)]
pub struct CreatedRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a uniqueness-guarded insert.
#[derive(Debug)]
pub enum UniqueCreate {
    Created(CreatedRecord),
    /// The key was already taken; the existing record is returned so the
    /// caller can merge instead of duplicating.
    Conflict(StoredRecord),
}

/// The record store every composer operation goes through.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a record, stamping it with a server-assigned timestamp.
    async fn create_record(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<CreatedRecord, ComposerError>;

    /// All records matching every filter (equality only).
    async fn query_records(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<StoredRecord>, ComposerError>;

    /// Apply field mutations to an existing record.
    async fn update_record(
        &self,
        collection: &str,
        record_id: &str,
        ops: Vec<(String, FieldOp)>,
    ) -> Result<(), ComposerError>;

    /// Create a record only if no record matches `unique_on`; otherwise
    /// report the conflicting record. The check and the insert are atomic
    /// with respect to other callers of this store.
    async fn create_unique(
        &self,
        collection: &str,
        unique_on: &[FieldFilter],
        fields: Map<String, Value>,
    ) -> Result<UniqueCreate, ComposerError>;
}

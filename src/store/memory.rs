//! In-memory record store.
//!
//! Default backing store for the command layer and the test double for the
//! core. One `RwLock` over all collections keeps `create_unique` and
//! `Increment` atomic with respect to concurrent senders.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CreatedRecord, FieldFilter, FieldOp, RecordStore, StoredRecord, UniqueCreate};
use crate::errors::ComposerError;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<StoredRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently in a collection.
    pub async fn collection_len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|records| records.len())
            .unwrap_or(0)
    }
}

fn matches(record: &StoredRecord, filters: &[FieldFilter]) -> bool {
    filters
        .iter()
        .all(|f| record.fields.get(&f.field) == Some(&f.value))
}

fn stamp(mut fields: Map<String, Value>) -> StoredRecord {
    let created_at = Utc::now();
    // Mirror the timestamp into the record body so listing screens that read
    // raw fields see it too.
    fields.insert("createdAt".to_string(), Value::String(created_at.to_rfc3339()));
    StoredRecord {
        id: Uuid::new_v4().to_string(),
        fields,
        created_at,
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_record(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<CreatedRecord, ComposerError> {
        let record = stamp(fields);
        let created = CreatedRecord {
            id: record.id.clone(),
            created_at: record.created_at,
        };
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
        Ok(created)
    }

    async fn query_records(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<StoredRecord>, ComposerError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| matches(r, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_record(
        &self,
        collection: &str,
        record_id: &str,
        ops: Vec<(String, FieldOp)>,
    ) -> Result<(), ComposerError> {
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == record_id))
            .ok_or_else(|| {
                ComposerError::PersistenceError(format!(
                    "no record {} in collection {}",
                    record_id, collection
                ))
            })?;

        for (field, op) in ops {
            match op {
                FieldOp::Set(value) => {
                    record.fields.insert(field, value);
                }
                FieldOp::Increment(delta) => {
                    let current = record
                        .fields
                        .get(&field)
                        .and_then(Value::as_i64)
                        .unwrap_or(0);
                    record.fields.insert(field, Value::from(current + delta));
                }
            }
        }
        Ok(())
    }

    async fn create_unique(
        &self,
        collection: &str,
        unique_on: &[FieldFilter],
        fields: Map<String, Value>,
    ) -> Result<UniqueCreate, ComposerError> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();

        if let Some(existing) = records.iter().find(|r| matches(r, unique_on)) {
            return Ok(UniqueCreate::Conflict(existing.clone()));
        }

        let record = stamp(fields);
        let created = CreatedRecord {
            id: record.id.clone(),
            created_at: record.created_at,
        };
        records.push(record);
        Ok(UniqueCreate::Created(created))
    }
}

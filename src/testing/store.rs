//! Record-store wrapper with call counting and fault injection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ComposerError;
use crate::store::{CreatedRecord, FieldFilter, FieldOp, RecordStore, StoredRecord, UniqueCreate};

/// Wraps any [`RecordStore`], counting calls and optionally failing a class
/// of operations with a `PersistenceError`.
pub struct InstrumentedStore {
    inner: Arc<dyn RecordStore>,
    calls: AtomicUsize,
    fail_creates: AtomicBool,
    fail_updates: AtomicBool,
    fail_queries: AtomicBool,
}

impl InstrumentedStore {
    pub fn wrap(inner: Arc<dyn RecordStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            fail_creates: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
            fail_queries: AtomicBool::new(false),
        }
    }

    /// Total store calls observed, including failed ones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn injected(&self, flag: &AtomicBool, op: &str) -> Result<(), ComposerError> {
        if flag.load(Ordering::SeqCst) {
            Err(ComposerError::PersistenceError(format!(
                "injected {} failure",
                op
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for InstrumentedStore {
    async fn create_record(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<CreatedRecord, ComposerError> {
        self.record_call();
        self.injected(&self.fail_creates, "create")?;
        self.inner.create_record(collection, fields).await
    }

    async fn query_records(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<StoredRecord>, ComposerError> {
        self.record_call();
        self.injected(&self.fail_queries, "query")?;
        self.inner.query_records(collection, filters).await
    }

    async fn update_record(
        &self,
        collection: &str,
        record_id: &str,
        ops: Vec<(String, FieldOp)>,
    ) -> Result<(), ComposerError> {
        self.record_call();
        self.injected(&self.fail_updates, "update")?;
        self.inner.update_record(collection, record_id, ops).await
    }

    async fn create_unique(
        &self,
        collection: &str,
        unique_on: &[FieldFilter],
        fields: Map<String, Value>,
    ) -> Result<UniqueCreate, ComposerError> {
        self.record_call();
        self.injected(&self.fail_creates, "create")?;
        self.inner.create_unique(collection, unique_on, fields).await
    }
}

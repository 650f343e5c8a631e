#[cfg(test)]
mod ledger_sync_tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::{json, Map, Value};

    use carechat::errors::ComposerError;
    use carechat::ledger::ConversationLedger;
    use carechat::store::{
        CreatedRecord, FieldFilter, FieldOp, MemoryStore, RecordStore, StoredRecord, UniqueCreate,
    };
    use carechat::types::{ConversationAggregate, IdentityPair, LedgerOutcome};

    const COLLECTION: &str = "Conversations";

    async fn aggregate_for(store: &MemoryStore, pair: &IdentityPair) -> ConversationAggregate {
        let key = [
            FieldFilter::eq("patientId", pair.patient_id.as_str()),
            FieldFilter::eq("providerId", pair.provider_id.as_str()),
        ];
        let found = store.query_records(COLLECTION, &key).await.unwrap();
        assert_eq!(found.len(), 1, "expected exactly one aggregate per pair");
        found[0].deserialize().unwrap()
    }

    #[tokio::test]
    async fn test_first_message_creates_seeded_aggregate() {
        let store = Arc::new(MemoryStore::new());
        let ledger = ConversationLedger::new(store.clone(), COLLECTION);
        let pair = IdentityPair::new("pat-a", "doc-a");

        let outcome = ledger
            .sync(&pair, "pat-a", "first hello", Utc::now())
            .await
            .unwrap();
        assert!(matches!(outcome, LedgerOutcome::Created { .. }));

        let aggregate = aggregate_for(&store, &pair).await;
        assert_eq!(aggregate.unread_by_patient, 0);
        assert_eq!(aggregate.unread_by_provider, 1);
        assert!(!aggregate.deleted_by_patient);
        assert!(!aggregate.deleted_by_provider);
        assert_eq!(aggregate.recent_message.content, "first hello");
    }

    #[tokio::test]
    async fn test_followup_messages_increment_only_recipient_counter() {
        let store = Arc::new(MemoryStore::new());
        let ledger = ConversationLedger::new(store.clone(), COLLECTION);
        let pair = IdentityPair::new("pat-b", "doc-b");

        ledger.sync(&pair, "pat-b", "one", Utc::now()).await.unwrap();
        let outcome = ledger.sync(&pair, "pat-b", "two", Utc::now()).await.unwrap();
        assert!(matches!(outcome, LedgerOutcome::Updated { .. }));

        let aggregate = aggregate_for(&store, &pair).await;
        assert_eq!(aggregate.unread_by_provider, 2);
        assert_eq!(aggregate.unread_by_patient, 0);
        assert_eq!(aggregate.recent_message.content, "two");
    }

    #[tokio::test]
    async fn test_reply_increments_other_counter() {
        let store = Arc::new(MemoryStore::new());
        let ledger = ConversationLedger::new(store.clone(), COLLECTION);
        let pair = IdentityPair::new("pat-c", "doc-c");

        ledger.sync(&pair, "pat-c", "hi doc", Utc::now()).await.unwrap();
        ledger.sync(&pair, "doc-c", "hi pat", Utc::now()).await.unwrap();

        let aggregate = aggregate_for(&store, &pair).await;
        assert_eq!(aggregate.unread_by_provider, 1);
        assert_eq!(aggregate.unread_by_patient, 1);
        assert_eq!(aggregate.recent_message.content, "hi pat");
    }

    #[tokio::test]
    async fn test_new_message_clears_both_delete_flags() {
        let store = Arc::new(MemoryStore::new());
        let ledger = ConversationLedger::new(store.clone(), COLLECTION);
        let pair = IdentityPair::new("pat-d", "doc-d");

        ledger.sync(&pair, "pat-d", "one", Utc::now()).await.unwrap();

        // One party hides the conversation out-of-band.
        let existing = store
            .query_records(COLLECTION, &[FieldFilter::eq("patientId", "pat-d")])
            .await
            .unwrap();
        store
            .update_record(
                COLLECTION,
                &existing[0].id,
                vec![("deletedByPatient".to_string(), FieldOp::Set(json!(true)))],
            )
            .await
            .unwrap();

        ledger.sync(&pair, "doc-d", "still here?", Utc::now()).await.unwrap();

        let aggregate = aggregate_for(&store, &pair).await;
        assert!(!aggregate.deleted_by_patient);
        assert!(!aggregate.deleted_by_provider);
    }

    #[tokio::test]
    async fn test_recent_message_snapshot_tracks_latest() {
        let store = Arc::new(MemoryStore::new());
        let ledger = ConversationLedger::new(store.clone(), COLLECTION);
        let pair = IdentityPair::new("pat-e", "doc-e");

        let later = Utc::now();
        ledger.sync(&pair, "pat-e", "old", Utc::now()).await.unwrap();
        ledger.sync(&pair, "pat-e", "new", later).await.unwrap();

        let aggregate = aggregate_for(&store, &pair).await;
        assert_eq!(aggregate.recent_message.content, "new");
        assert_eq!(aggregate.recent_message.created_at, later);
    }

    #[tokio::test]
    async fn test_foreign_sender_is_rejected_before_any_write() {
        let store = Arc::new(MemoryStore::new());
        let ledger = ConversationLedger::new(store.clone(), COLLECTION);
        let pair = IdentityPair::new("pat-x", "doc-x");

        let err = ledger
            .sync(&pair, "intruder", "hello", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, ComposerError::IdentityMismatch(_)));
        assert!(err.to_string().contains("intruder"));
        assert_eq!(store.collection_len(COLLECTION).await, 0);
    }

    /// Delegates to a [`MemoryStore`] but reports every conversation lookup
    /// as empty, simulating a reader that races ahead of a concurrent create.
    struct RacingStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl RecordStore for RacingStore {
        async fn create_record(
            &self,
            collection: &str,
            fields: Map<String, Value>,
        ) -> Result<CreatedRecord, ComposerError> {
            self.inner.create_record(collection, fields).await
        }

        async fn query_records(
            &self,
            _collection: &str,
            _filters: &[FieldFilter],
        ) -> Result<Vec<StoredRecord>, ComposerError> {
            Ok(Vec::new())
        }

        async fn update_record(
            &self,
            collection: &str,
            record_id: &str,
            ops: Vec<(String, FieldOp)>,
        ) -> Result<(), ComposerError> {
            self.inner.update_record(collection, record_id, ops).await
        }

        async fn create_unique(
            &self,
            collection: &str,
            unique_on: &[FieldFilter],
            fields: Map<String, Value>,
        ) -> Result<UniqueCreate, ComposerError> {
            self.inner.create_unique(collection, unique_on, fields).await
        }
    }

    #[tokio::test]
    async fn test_lost_create_race_merges_into_winner() {
        let store = Arc::new(RacingStore {
            inner: MemoryStore::new(),
        });
        let ledger = ConversationLedger::new(store.clone(), COLLECTION);
        let pair = IdentityPair::new("pat-f", "doc-f");

        let first = ledger.sync(&pair, "pat-f", "one", Utc::now()).await.unwrap();
        let winner = match first {
            LedgerOutcome::Created { conversation_id } => conversation_id,
            LedgerOutcome::Updated { .. } => panic!("first sync should create"),
        };

        // The lookup misses again, but the uniqueness constraint routes the
        // second sender to the aggregate that already exists.
        let second = ledger.sync(&pair, "doc-f", "two", Utc::now()).await.unwrap();
        match second {
            LedgerOutcome::Updated { conversation_id } => {
                assert_eq!(conversation_id, winner);
            }
            LedgerOutcome::Created { .. } => panic!("race must not duplicate the aggregate"),
        }

        let aggregate = aggregate_for(&store.inner, &pair).await;
        assert_eq!(aggregate.unread_by_patient, 1);
        assert_eq!(aggregate.unread_by_provider, 1);
    }
}

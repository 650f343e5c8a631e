//! Conversation ledger sync.
//!
//! After a message persists, the per-pair aggregate is found or created and
//! its recency snapshot and unread counters brought up to date. Creation goes
//! through the store's uniqueness constraint and counter bumps are atomic
//! relative-updates, so two near-simultaneous senders can neither duplicate
//! the aggregate nor lose an increment.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::errors::ComposerError;
use crate::store::{FieldFilter, FieldOp, RecordStore, UniqueCreate};
use crate::types::{IdentityPair, LedgerOutcome, Role};

pub struct ConversationLedger {
    store: Arc<dyn RecordStore>,
    collection: String,
}

impl ConversationLedger {
    pub fn new(store: Arc<dyn RecordStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Find or create the aggregate for `pair` and fold in one new message.
    ///
    /// The caller has already persisted the message itself, so a
    /// `PersistenceError` here only leaves the aggregate stale until the next
    /// message re-triggers a sync.
    pub async fn sync(
        &self,
        pair: &IdentityPair,
        sender_id: &str,
        content: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<LedgerOutcome, ComposerError> {
        let Some(sender_role) = pair.role_of(sender_id) else {
            // A counter bump for a stranger would silently misattribute
            // unread state, so this fails before any store call.
            return Err(ComposerError::IdentityMismatch(format!(
                "sender '{}' is neither party of the pair",
                sender_id
            )));
        };

        let key = pair_key(pair);
        let found = self.store.query_records(&self.collection, &key).await?;

        if let Some(existing) = found.first() {
            if found.len() > 1 {
                log::warn!(
                    "{} aggregates for one pair in {}; updating the first",
                    found.len(),
                    self.collection
                );
            }
            let id = existing.id.clone();
            self.apply_update(&id, sender_role, content, timestamp)
                .await?;
            return Ok(LedgerOutcome::Updated {
                conversation_id: id,
            });
        }

        let fields = aggregate_fields(pair, sender_role, content, timestamp);
        match self
            .store
            .create_unique(&self.collection, &key, fields)
            .await?
        {
            UniqueCreate::Created(created) => {
                log::info!("conversation aggregate created: {}", created.id);
                Ok(LedgerOutcome::Created {
                    conversation_id: created.id,
                })
            }
            UniqueCreate::Conflict(existing) => {
                // Lost the create race to the other party; fold this message
                // into the aggregate that won.
                log::debug!("aggregate already created for pair, updating {}", existing.id);
                self.apply_update(&existing.id, sender_role, content, timestamp)
                    .await?;
                Ok(LedgerOutcome::Updated {
                    conversation_id: existing.id,
                })
            }
        }
    }

    async fn apply_update(
        &self,
        conversation_id: &str,
        sender_role: Role,
        content: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), ComposerError> {
        let ops = vec![
            ("deletedByPatient".to_string(), FieldOp::Set(json!(false))),
            ("deletedByProvider".to_string(), FieldOp::Set(json!(false))),
            (
                "recentMessage".to_string(),
                FieldOp::Set(recent_message(content, timestamp)),
            ),
            (
                unread_field_of_recipient(sender_role).to_string(),
                FieldOp::Increment(1),
            ),
        ];
        self.store
            .update_record(&self.collection, conversation_id, ops)
            .await
    }
}

fn pair_key(pair: &IdentityPair) -> [FieldFilter; 2] {
    [
        FieldFilter::eq("patientId", pair.patient_id.as_str()),
        FieldFilter::eq("providerId", pair.provider_id.as_str()),
    ]
}

fn recent_message(content: &str, timestamp: DateTime<Utc>) -> Value {
    json!({
        "content": content,
        "createdAt": timestamp.to_rfc3339(),
    })
}

/// The unread counter belonging to the party that did NOT send.
fn unread_field_of_recipient(sender_role: Role) -> &'static str {
    match sender_role {
        Role::Patient => "unreadByProvider",
        Role::Provider => "unreadByPatient",
    }
}

fn aggregate_fields(
    pair: &IdentityPair,
    sender_role: Role,
    content: &str,
    timestamp: DateTime<Utc>,
) -> Map<String, Value> {
    let sender_is_patient = sender_role == Role::Patient;
    let mut fields = Map::new();
    fields.insert("patientId".to_string(), json!(pair.patient_id));
    fields.insert("providerId".to_string(), json!(pair.provider_id));
    fields.insert("deletedByPatient".to_string(), json!(false));
    fields.insert("deletedByProvider".to_string(), json!(false));
    fields.insert(
        "unreadByPatient".to_string(),
        json!(if sender_is_patient { 0 } else { 1 }),
    );
    fields.insert(
        "unreadByProvider".to_string(),
        json!(if sender_is_patient { 1 } else { 0 }),
    );
    fields.insert("recentMessage".to_string(), recent_message(content, timestamp));
    fields
}

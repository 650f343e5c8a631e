//! Message dispatch: validate composed content, persist it, and trigger the
//! conversation ledger sync.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::CollectionsConfig;
use crate::errors::ComposerError;
use crate::ledger::ConversationLedger;
use crate::store::RecordStore;
use crate::types::{MessageRecord, Role, SendOutcome, SendReceipt, SendRequest};

pub struct MessageDispatch {
    store: Arc<dyn RecordStore>,
    ledger: ConversationLedger,
    messages_collection: String,
}

impl MessageDispatch {
    pub fn new(store: Arc<dyn RecordStore>, collections: &CollectionsConfig) -> Self {
        let ledger = ConversationLedger::new(store.clone(), collections.conversations.clone());
        Self {
            store,
            ledger,
            messages_collection: collections.messages.clone(),
        }
    }

    /// Persist one message and sync the conversation aggregate.
    ///
    /// Empty content or an incomplete pair is "nothing to send": no store
    /// call is made and no error raised. A local identity that is neither
    /// party fails with `IdentityMismatch` before any write. If the message
    /// create fails, the ledger is not touched and the caller keeps the
    /// composed content for a retry.
    pub async fn send(&self, request: &SendRequest) -> Result<SendOutcome, ComposerError> {
        if request.content.is_empty() || !request.pair.is_complete() {
            log::debug!("nothing to send: empty content or incomplete pair");
            return Ok(SendOutcome::NothingToSend);
        }

        let (sender_id, recipient_id) = match request.pair.role_of(&request.local_identity) {
            Some(Role::Patient) => (
                request.pair.patient_id.clone(),
                request.pair.provider_id.clone(),
            ),
            Some(Role::Provider) => (
                request.pair.provider_id.clone(),
                request.pair.patient_id.clone(),
            ),
            None => {
                return Err(ComposerError::IdentityMismatch(format!(
                    "local identity '{}' is neither party of the pair",
                    request.local_identity
                )));
            }
        };

        let record = MessageRecord::new(
            request.content.clone(),
            sender_id.clone(),
            recipient_id,
            request.is_audio,
        );
        let created = self
            .store
            .create_record(&self.messages_collection, message_fields(&record)?)
            .await?;
        log::info!(
            "message persisted: id={} audio={}",
            created.id,
            request.is_audio
        );

        let ledger = self
            .ledger
            .sync(
                &request.pair,
                &sender_id,
                &request.content,
                created.created_at,
            )
            .await?;

        Ok(SendOutcome::Sent(SendReceipt {
            message_id: created.id,
            created_at: created.created_at,
            ledger,
        }))
    }
}

fn message_fields(record: &MessageRecord) -> Result<Map<String, Value>, ComposerError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(ComposerError::PersistenceError(
            "message record did not serialize to an object".to_string(),
        )),
        Err(e) => Err(ComposerError::PersistenceError(format!(
            "failed to serialize message record: {}",
            e
        ))),
    }
}

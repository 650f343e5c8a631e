//! Core data types shared across the composer, dispatch, and ledger modules.
//!
//! Field names serialize in camelCase so records written through a
//! [`RecordStore`](crate::store::RecordStore) match the collection schema the
//! listing screens read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of a paired conversation an identity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Patient,
    Provider,
}

/// The two-identity key naming one conversation.
///
/// Both identifiers are opaque strings; exactly one of them is expected to be
/// the locally acting party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPair {
    pub patient_id: String,
    pub provider_id: String,
}

impl IdentityPair {
    pub fn new(patient_id: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            provider_id: provider_id.into(),
        }
    }

    /// Both identities must be present before any send or sync is attempted.
    pub fn is_complete(&self) -> bool {
        !self.patient_id.is_empty() && !self.provider_id.is_empty()
    }

    /// Which role the given identity plays in this pair, if any.
    pub fn role_of(&self, identity: &str) -> Option<Role> {
        if identity == self.patient_id {
            Some(Role::Patient)
        } else if identity == self.provider_id {
            Some(Role::Provider)
        } else {
            None
        }
    }

    /// The non-sender party for a given sender identity.
    pub fn counterpart_of(&self, identity: &str) -> Option<&str> {
        match self.role_of(identity)? {
            Role::Patient => Some(&self.provider_id),
            Role::Provider => Some(&self.patient_id),
        }
    }
}

/// One persisted chat message.
///
/// Immutable once written aside from the per-party soft-delete flags.
/// `created_at` is assigned by the persistence layer, never by the client
/// clock, so it is absent until the record has been stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub content: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub is_audio: bool,
    pub deleted_by_sender: bool,
    pub deleted_by_recipient: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl MessageRecord {
    /// A fresh, unstored message with both delete flags cleared.
    pub fn new(
        content: impl Into<String>,
        sender_id: impl Into<String>,
        recipient_id: impl Into<String>,
        is_audio: bool,
    ) -> Self {
        Self {
            content: content.into(),
            sender_id: sender_id.into(),
            recipient_id: recipient_id.into(),
            is_audio,
            deleted_by_sender: false,
            deleted_by_recipient: false,
            created_at: None,
        }
    }
}

/// Snapshot of the latest message kept on the conversation aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentMessage {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// The per-pair conversation summary record.
///
/// At most one aggregate should exist per identity pair; the ledger defends
/// this with a uniqueness constraint on creation rather than assuming it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAggregate {
    pub patient_id: String,
    pub provider_id: String,
    pub unread_by_patient: u32,
    pub unread_by_provider: u32,
    pub deleted_by_patient: bool,
    pub deleted_by_provider: bool,
    pub recent_message: RecentMessage,
}

/// Encoded audio ready to travel in a text-only message field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedAudio {
    /// `data:<mime>;base64,<payload>` transport text.
    pub transport_text: String,
    /// MIME type the capture was encoded with.
    pub mime_type: String,
    /// Size of the binary payload before base64 expansion.
    pub byte_len: usize,
}

/// Everything needed for one dispatch attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub content: String,
    pub is_audio: bool,
    pub pair: IdentityPair,
    pub local_identity: String,
}

/// What the conversation ledger did for a synced message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum LedgerOutcome {
    Created { conversation_id: String },
    Updated { conversation_id: String },
}

impl LedgerOutcome {
    pub fn conversation_id(&self) -> &str {
        match self {
            LedgerOutcome::Created { conversation_id }
            | LedgerOutcome::Updated { conversation_id } => conversation_id,
        }
    }
}

/// Receipt for a message that was persisted and synced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    pub message_id: String,
    pub created_at: DateTime<Utc>,
    pub ledger: LedgerOutcome,
}

/// Result of a dispatch attempt.
///
/// Empty content or an incomplete pair is treated as "nothing to send", not
/// as a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum SendOutcome {
    Sent(SendReceipt),
    NothingToSend,
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent(_))
    }
}

//! Composer lifecycle and message commands.

use std::sync::Arc;

use tauri::command;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{active_device, active_store, SESSION_REGISTRY};
use crate::codec::{self, AudioClip};
use crate::commands::config::current_config;
use crate::session::ComposerSession;
use crate::store::FieldFilter;
use crate::types::{ConversationAggregate, IdentityPair, SendOutcome};

/// Open a composer for one (patient, provider) pair and return its session id
#[command]
pub async fn open_composer(
    patient_id: String,
    provider_id: String,
    local_identity: String,
) -> Result<String, String> {
    let pair = IdentityPair::new(patient_id, provider_id);
    let store = active_store().await;
    let device = active_device().await?;
    let config = current_config().await;

    let session = ComposerSession::new(store, device, &config, pair, local_identity);
    let session_id = Uuid::new_v4().to_string();

    SESSION_REGISTRY
        .write()
        .await
        .insert(session_id.clone(), Arc::new(Mutex::new(session)));

    log::info!("composer session opened: {}", session_id);
    Ok(session_id)
}

/// Tear down a composer session, releasing any capture in flight
#[command]
pub async fn close_composer(session_id: String) -> Result<bool, String> {
    let removed = SESSION_REGISTRY.write().await.remove(&session_id);
    if let Some(session) = &removed {
        session.lock().await.cancel_recording();
        log::info!("composer session closed: {}", session_id);
    }
    Ok(removed.is_some())
}

/// Replace the draft text of a composer
#[command]
pub async fn set_draft(session_id: String, content: String) -> Result<(), String> {
    let session = super::session(&session_id).await?;
    session.lock().await.set_draft(content);
    Ok(())
}

/// Send whatever the composer currently holds (text or encoded audio)
#[command]
pub async fn send_message(session_id: String) -> Result<SendOutcome, String> {
    let session = super::session(&session_id).await?;
    let mut session = session.lock().await;

    match session.send().await {
        Ok(outcome) => {
            if outcome.is_sent() {
                log::info!("message dispatched for session {}", session_id);
            }
            Ok(outcome)
        }
        Err(e) => {
            log::error!("send failed for session {}: {}", session_id, e);
            Err(e.to_string())
        }
    }
}

/// Drop a finished-but-unsent recording from the composer
#[command]
pub async fn discard_recording(session_id: String) -> Result<bool, String> {
    let session = super::session(&session_id).await?;
    let discarded = session.lock().await.discard_recording();
    Ok(discarded)
}

/// Read the conversation aggregate for a pair, if one exists yet
#[command]
pub async fn get_conversation(
    patient_id: String,
    provider_id: String,
) -> Result<Option<ConversationAggregate>, String> {
    let store = active_store().await;
    let config = current_config().await;

    let filters = [
        FieldFilter::eq("patientId", patient_id),
        FieldFilter::eq("providerId", provider_id),
    ];
    let records = store
        .query_records(&config.collections.conversations, &filters)
        .await
        .map_err(|e| e.to_string())?;

    match records.first() {
        Some(record) => record.deserialize().map(Some).map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

/// Decode an audio message's transport text for playback
#[command]
pub async fn decode_audio_message(transport_text: String) -> Result<AudioClip, String> {
    codec::decode(&transport_text).map_err(|e| {
        log::warn!("audio message failed to decode: {}", e);
        e.to_string()
    })
}

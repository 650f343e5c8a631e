//! Voice capture commands.

use serde::{Deserialize, Serialize};
use tauri::command;

use crate::capture::{StartReport, StopReport};
use crate::types::EncodedAudio;

/// Snapshot of a composer's capture state for the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureStatus {
    pub phase: String,
    pub status_line: String,
    pub is_audio: bool,
}

/// Result of stopping a voice capture
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSummary {
    pub phase: String,
    pub status_line: String,
    pub encoded: Option<EncodedAudio>,
}

/// Start a voice recording for the given composer session
#[command]
pub async fn start_voice_capture(session_id: String) -> Result<CaptureStatus, String> {
    let session = super::session(&session_id).await?;
    let mut session = session.lock().await;

    match session.start_recording().await {
        StartReport::Started => log::info!("voice capture started for {}", session_id),
        StartReport::Ignored { phase } => {
            log::debug!("start ignored for {}: capture is {}", session_id, phase)
        }
        StartReport::Failed(cause) => {
            log::warn!("voice capture failed for {}: {}", session_id, cause)
        }
    }

    Ok(CaptureStatus {
        phase: session.capture_phase().name().to_string(),
        status_line: session.capture_status_line().to_string(),
        is_audio: session.is_audio(),
    })
}

/// Stop the recording and stage the encoded audio as the draft
#[command]
pub async fn stop_voice_capture(session_id: String) -> Result<StopSummary, String> {
    let session = super::session(&session_id).await?;
    let mut session = session.lock().await;

    let encoded = match session.stop_recording().await {
        StopReport::Finished(audio) => {
            log::info!(
                "voice capture finalized for {}: {} bytes",
                session_id,
                audio.byte_len
            );
            Some(audio)
        }
        StopReport::Ignored { phase } => {
            log::debug!("stop ignored for {}: capture is {}", session_id, phase);
            None
        }
        StopReport::Failed(cause) => {
            log::warn!("voice capture flush failed for {}: {}", session_id, cause);
            None
        }
    };

    Ok(StopSummary {
        phase: session.capture_phase().name().to_string(),
        status_line: session.capture_status_line().to_string(),
        encoded,
    })
}

/// Abort an in-flight recording without composing anything
#[command]
pub async fn cancel_voice_capture(session_id: String) -> Result<CaptureStatus, String> {
    let session = super::session(&session_id).await?;
    let mut session = session.lock().await;

    session.cancel_recording();
    log::info!("voice capture cancelled for {}", session_id);

    Ok(CaptureStatus {
        phase: session.capture_phase().name().to_string(),
        status_line: session.capture_status_line().to_string(),
        is_audio: session.is_audio(),
    })
}

/// Poll buffered chunks into the session and report capture state
#[command]
pub async fn get_capture_status(session_id: String) -> Result<CaptureStatus, String> {
    let session = super::session(&session_id).await?;
    let mut session = session.lock().await;

    session.poll_recording();

    Ok(CaptureStatus {
        phase: session.capture_phase().name().to_string(),
        status_line: session.capture_status_line().to_string(),
        is_audio: session.is_audio(),
    })
}

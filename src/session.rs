//! The canonical composer session.
//!
//! The original codebase kept several near-identical composer variants alive
//! in parallel; this is the one implementation, configured by explicit flags
//! instead of copies. A session owns the draft content, the pending-audio
//! flag, and the capture controller for one (patient, provider) pair, and
//! keeps the audio flag honest: it is true only between a successful
//! stop/encode cycle and the send that consumes it.

use std::sync::Arc;

use crate::capture::{CaptureController, CapturePhase, CaptureDevice, StartReport, StopReport};
use crate::config::CareChatConfig;
use crate::dispatch::MessageDispatch;
use crate::errors::ComposerError;
use crate::store::RecordStore;
use crate::types::{IdentityPair, SendOutcome, SendRequest};

pub struct ComposerSession {
    dispatch: MessageDispatch,
    capture: CaptureController,
    pair: IdentityPair,
    local_identity: String,
    draft: String,
    is_audio: bool,
    allow_audio_discard: bool,
}

impl ComposerSession {
    pub fn new(
        store: Arc<dyn RecordStore>,
        device: Arc<dyn CaptureDevice>,
        config: &CareChatConfig,
        pair: IdentityPair,
        local_identity: impl Into<String>,
    ) -> Self {
        Self {
            dispatch: MessageDispatch::new(store, &config.collections),
            capture: CaptureController::new(
                device,
                config.audio.record_mime.clone(),
                config.audio.max_buffered_chunks,
            ),
            pair,
            local_identity: local_identity.into(),
            draft: String::new(),
            is_audio: false,
            allow_audio_discard: config.composer.allow_audio_discard,
        }
    }

    pub fn pair(&self) -> &IdentityPair {
        &self.pair
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_audio(&self) -> bool {
        self.is_audio
    }

    pub fn capture_phase(&self) -> &CapturePhase {
        self.capture.phase()
    }

    pub fn capture_status_line(&self) -> &str {
        self.capture.status_line()
    }

    /// Replace the draft with typed text. Any pending recording is
    /// superseded, so the audio flag drops with it.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        self.is_audio = false;
    }

    /// Begin a voice recording for this composer.
    pub async fn start_recording(&mut self) -> StartReport {
        self.capture.start().await
    }

    /// Pull buffered chunks from the device into the session.
    pub fn poll_recording(&mut self) {
        self.capture.poll_chunks();
    }

    /// Stop the recording; on success the encoded transport text becomes the
    /// draft and the audio flag is raised for exactly the next send.
    pub async fn stop_recording(&mut self) -> StopReport {
        let report = self.capture.stop().await;
        if let StopReport::Finished(audio) = &report {
            self.draft = audio.transport_text.clone();
            self.is_audio = true;
        }
        report
    }

    /// Abort an in-flight recording without composing anything.
    pub fn cancel_recording(&mut self) {
        self.capture.reset();
    }

    /// Drop a finished-but-unsent recording (the ✕ affordance). Returns
    /// whether anything was discarded; gated by the composer config flag.
    pub fn discard_recording(&mut self) -> bool {
        if !self.allow_audio_discard || !self.is_audio {
            return false;
        }
        self.draft.clear();
        self.is_audio = false;
        true
    }

    /// Dispatch the current draft.
    ///
    /// On full success the draft and audio flag are cleared. An abandoned
    /// send (nothing to send) also clears the audio flag so a stale
    /// recording can never piggyback on a later text message. On failure
    /// both are left intact so the user can retry without content loss.
    pub async fn send(&mut self) -> Result<SendOutcome, ComposerError> {
        let request = SendRequest {
            content: self.draft.clone(),
            is_audio: self.is_audio,
            pair: self.pair.clone(),
            local_identity: self.local_identity.clone(),
        };

        match self.dispatch.send(&request).await {
            Ok(SendOutcome::NothingToSend) => {
                self.is_audio = false;
                Ok(SendOutcome::NothingToSend)
            }
            Ok(outcome) => {
                self.draft.clear();
                self.is_audio = false;
                Ok(outcome)
            }
            Err(e) => Err(e),
        }
    }
}

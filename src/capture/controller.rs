//! Capture session state machine.
//!
//! Replaces the ad hoc recording flags of the original composer with one
//! explicit machine: `Idle → RequestingPermission → Recording → Stopped →
//! Idle`, with `Error` reachable from `RequestingPermission` or `Recording`.
//! Illegal transitions are reported no-ops, never panics.

use std::sync::Arc;

use bytes::Bytes;

use crate::capture::device::{CaptureDevice, DeviceStream};
use crate::codec;
use crate::types::EncodedAudio;

/// Where a capture session currently is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturePhase {
    /// No device session held, no chunks buffered.
    Idle,
    /// Waiting on the device-permission grant.
    RequestingPermission,
    /// Device held, chunks arriving.
    Recording,
    /// Recorder flushing, payload being finalized.
    Stopped,
    /// Permission refusal or device fault, with a human-readable cause.
    Error(String),
}

impl CapturePhase {
    pub fn name(&self) -> &'static str {
        match self {
            CapturePhase::Idle => "idle",
            CapturePhase::RequestingPermission => "requesting_permission",
            CapturePhase::Recording => "recording",
            CapturePhase::Stopped => "stopped",
            CapturePhase::Error(_) => "error",
        }
    }
}

/// Outcome of a `start()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartReport {
    /// Device granted, chunks now accumulating.
    Started,
    /// A session is already active; the call was a no-op.
    Ignored { phase: &'static str },
    /// Permission refusal or device fault; the controller is in `Error`.
    Failed(String),
}

/// Outcome of a `stop()` call.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReport {
    /// Capture finalized and encoded; the controller is back in `Idle`.
    Finished(EncodedAudio),
    /// Not recording; the call was a no-op.
    Ignored { phase: &'static str },
    /// Device fault while flushing; tracks released, controller in `Error`.
    Failed(String),
}

/// Owns at most one capture session at a time.
pub struct CaptureController {
    device: Arc<dyn CaptureDevice>,
    record_mime: String,
    max_chunks: usize,
    phase: CapturePhase,
    stream: Option<Box<dyn DeviceStream>>,
    chunks: Vec<Bytes>,
    status_line: String,
}

impl CaptureController {
    pub fn new(
        device: Arc<dyn CaptureDevice>,
        record_mime: impl Into<String>,
        max_chunks: usize,
    ) -> Self {
        Self {
            device,
            record_mime: record_mime.into(),
            max_chunks: max_chunks.max(1),
            phase: CapturePhase::Idle,
            stream: None,
            chunks: Vec::new(),
            status_line: String::new(),
        }
    }

    pub fn phase(&self) -> &CapturePhase {
        &self.phase
    }

    /// Human-readable status for the composer surface.
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn is_recording(&self) -> bool {
        self.phase == CapturePhase::Recording
    }

    /// Request the device and begin a new capture session.
    ///
    /// Valid from `Idle` (and from `Error`, which is how a manual retry
    /// re-starts capture). Any other phase is a reported no-op, so two
    /// `start()` calls in a row leave exactly one active session.
    pub async fn start(&mut self) -> StartReport {
        match self.phase {
            CapturePhase::Idle | CapturePhase::Error(_) => {}
            _ => {
                log::debug!("start ignored: capture is {}", self.phase.name());
                return StartReport::Ignored {
                    phase: self.phase.name(),
                };
            }
        }

        self.phase = CapturePhase::RequestingPermission;
        self.status_line = "Requesting microphone permission...".to_string();

        let mut stream = match self.device.request_capture().await {
            Ok(stream) => stream,
            Err(e) => {
                let cause = e.to_string();
                log::warn!("capture request refused: {}", cause);
                self.status_line = format!("Error: {}", cause);
                self.phase = CapturePhase::Error(cause.clone());
                return StartReport::Failed(cause);
            }
        };

        if let Err(e) = stream.start() {
            // Partially acquired resources must not outlive the failure.
            stream.release();
            let cause = e.to_string();
            log::warn!("recorder failed to start: {}", cause);
            self.status_line = format!("Error: {}", cause);
            self.phase = CapturePhase::Error(cause.clone());
            return StartReport::Failed(cause);
        }

        self.chunks.clear();
        self.stream = Some(stream);
        self.phase = CapturePhase::Recording;
        self.status_line = "Recording in progress...".to_string();
        log::info!("capture session started");
        StartReport::Started
    }

    /// Move buffered chunks from the device into the session, in arrival
    /// order. Empty chunks are dropped. No-op unless recording.
    ///
    /// The finalized payload must be the complete chunk sequence, so a
    /// capture that outgrows `max_chunks` fails outright instead of shedding
    /// audio: the session moves to `Error` and the device is released.
    pub fn poll_chunks(&mut self) {
        if self.phase != CapturePhase::Recording {
            return;
        }
        let drained = match self.stream.as_mut() {
            Some(stream) => stream.drain(),
            None => return,
        };
        for chunk in drained {
            if chunk.is_empty() {
                continue;
            }
            if self.chunks.len() == self.max_chunks {
                self.fail_overflow();
                return;
            }
            self.chunks.push(chunk);
        }
    }

    fn fail_overflow(&mut self) -> String {
        let cause = format!("capture exceeded {} buffered chunks", self.max_chunks);
        log::warn!("{}", cause);
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }
        self.chunks.clear();
        self.status_line = format!("Error: {}", cause);
        self.phase = CapturePhase::Error(cause.clone());
        cause
    }

    /// Stop the session, finalize the payload, and encode it.
    ///
    /// Valid only from `Recording`; anything else is a reported no-op. The
    /// device stream is released on every path out of here, including the
    /// flush-failure one, so stopping never leaves the device locked.
    pub async fn stop(&mut self) -> StopReport {
        if self.phase != CapturePhase::Recording {
            log::debug!("stop ignored: capture is {}", self.phase.name());
            return StopReport::Ignored {
                phase: self.phase.name(),
            };
        }

        self.phase = CapturePhase::Stopped;

        let Some(mut stream) = self.stream.take() else {
            // Recording without a stream is an internal inconsistency; treat
            // it like a device fault rather than panicking.
            let cause = "recording session lost its device stream".to_string();
            self.status_line = format!("Error: {}", cause);
            self.phase = CapturePhase::Error(cause.clone());
            return StopReport::Failed(cause);
        };

        let flush = stream.stop();
        let mut overflowed = false;
        for chunk in stream.drain() {
            if chunk.is_empty() {
                continue;
            }
            if self.chunks.len() == self.max_chunks {
                overflowed = true;
                break;
            }
            self.chunks.push(chunk);
        }
        stream.release();

        if let Err(e) = flush {
            let cause = e.to_string();
            log::warn!("recorder flush failed: {}", cause);
            self.chunks.clear();
            self.status_line = format!("Error: {}", cause);
            self.phase = CapturePhase::Error(cause.clone());
            return StopReport::Failed(cause);
        }

        if overflowed {
            return StopReport::Failed(self.fail_overflow());
        }

        let payload: Vec<u8> = self.chunks.iter().flat_map(|c| c.iter().copied()).collect();
        let byte_len = payload.len();
        let transport_text = codec::encode(&payload, &self.record_mime);
        self.chunks.clear();

        self.phase = CapturePhase::Idle;
        self.status_line = "Recording stopped and saved.".to_string();
        log::info!("capture session finalized: {} bytes", byte_len);

        StopReport::Finished(EncodedAudio {
            transport_text,
            mime_type: self.record_mime.clone(),
            byte_len,
        })
    }

    /// Tear down any in-flight session and return to `Idle`.
    ///
    /// The only cancellation point; also used on composer teardown.
    pub fn reset(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }
        self.chunks.clear();
        self.phase = CapturePhase::Idle;
        self.status_line.clear();
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        // Never leave the device locked on teardown.
        self.reset();
    }
}

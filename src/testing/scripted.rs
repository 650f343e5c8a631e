//! Scripted capture device for offline tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::capture::device::{CaptureDevice, DeviceStream};
use crate::errors::ComposerError;
use crate::permissions::{PermissionInfo, PermissionStatus};

/// Deterministic pseudo-opus payload of the requested length.
///
/// Real opus frames are irrelevant to the composer; what matters is that the
/// bytes are non-trivial and byte-exact through the codec.
pub fn synthetic_opus_payload(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(7))
        .collect()
}

enum Script {
    Grant { chunks: Vec<Bytes> },
    Refuse { cause: String },
    FailOnStop { chunks: Vec<Bytes>, cause: String },
}

/// A capture device that serves a fixed script instead of real hardware.
pub struct ScriptedDevice {
    script: Script,
    released: Arc<AtomicBool>,
}

impl ScriptedDevice {
    /// Grants capture and delivers the given chunks in order.
    pub fn with_chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            script: Script::Grant {
                chunks: chunks.into_iter().map(Bytes::from).collect(),
            },
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Refuses the capture request with the given cause.
    pub fn denying(cause: impl Into<String>) -> Self {
        Self {
            script: Script::Refuse {
                cause: cause.into(),
            },
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Grants capture but fails the stop/flush with the given cause.
    pub fn failing_on_stop(chunks: Vec<Vec<u8>>, cause: impl Into<String>) -> Self {
        Self {
            script: Script::FailOnStop {
                chunks: chunks.into_iter().map(Bytes::from).collect(),
                cause: cause.into(),
            },
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the last granted stream has released its tracks.
    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureDevice for ScriptedDevice {
    async fn request_capture(&self) -> Result<Box<dyn DeviceStream>, ComposerError> {
        let (chunks, fail_stop) = match &self.script {
            Script::Refuse { cause } => {
                return Err(ComposerError::PermissionDenied(cause.clone()));
            }
            Script::Grant { chunks } => (chunks.clone(), None),
            Script::FailOnStop { chunks, cause } => (chunks.clone(), Some(cause.clone())),
        };

        self.released.store(false, Ordering::SeqCst);
        Ok(Box::new(ScriptedStream {
            pending: chunks.into(),
            fail_stop,
            started: false,
            live: true,
            released: self.released.clone(),
        }))
    }

    async fn permission(&self) -> PermissionInfo {
        match &self.script {
            Script::Refuse { cause } => PermissionInfo {
                status: PermissionStatus::Denied,
                message: cause.clone(),
                can_request: false,
            },
            _ => PermissionInfo {
                status: PermissionStatus::Granted,
                message: "scripted device always grants".to_string(),
                can_request: false,
            },
        }
    }
}

struct ScriptedStream {
    pending: VecDeque<Bytes>,
    fail_stop: Option<String>,
    started: bool,
    live: bool,
    released: Arc<AtomicBool>,
}

impl DeviceStream for ScriptedStream {
    fn start(&mut self) -> Result<(), ComposerError> {
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ComposerError> {
        if let Some(cause) = self.fail_stop.take() {
            // Failed flush also loses the buffered chunks, like a dead device
            self.pending.clear();
            return Err(ComposerError::DeviceError(cause));
        }
        Ok(())
    }

    fn try_read(&mut self) -> Option<Bytes> {
        if !self.started {
            return None;
        }
        self.pending.pop_front()
    }

    fn release(&mut self) {
        self.live = false;
        self.released.store(true, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        if self.live {
            self.release();
        }
    }
}

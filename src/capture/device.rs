//! Device-capture collaborator traits.
//!
//! The composer never talks to a microphone directly; it asks a
//! [`CaptureDevice`] for exclusive access and receives a [`DeviceStream`]
//! with a recorder bound to it. Chunk delivery is non-blocking and in
//! arrival order, matching the channel-drain idiom of the capture backends
//! this crate is meant to sit on top of.

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::ComposerError;
use crate::permissions::PermissionInfo;

/// One granted capture stream with a recorder bound to it.
///
/// The stream is an exclusive single-owner resource: whoever holds it must
/// call [`DeviceStream::release`] on every exit path so the device is never
/// left locked.
pub trait DeviceStream: Send {
    /// Begin recording. Chunks become readable as the device produces them.
    fn start(&mut self) -> Result<(), ComposerError>;

    /// Stop the recorder and flush any buffered chunks.
    ///
    /// Buffered chunks stay readable via [`DeviceStream::try_read`] and
    /// [`DeviceStream::drain`] after a successful stop. Does not release the
    /// underlying tracks.
    fn stop(&mut self) -> Result<(), ComposerError>;

    /// Non-blocking read of the next buffered chunk, in arrival order.
    fn try_read(&mut self) -> Option<Bytes>;

    /// Read all currently buffered chunks, in arrival order.
    fn drain(&mut self) -> Vec<Bytes> {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.try_read() {
            chunks.push(chunk);
        }
        chunks
    }

    /// Stop all underlying tracks and give the device back.
    fn release(&mut self);

    /// Whether any underlying track is still held.
    fn is_live(&self) -> bool;
}

/// Source of capture streams (the microphone side of the platform).
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Request exclusive access to the capture device.
    ///
    /// Refusal surfaces as [`ComposerError::PermissionDenied`]; any other
    /// device fault as [`ComposerError::DeviceError`].
    async fn request_capture(&self) -> Result<Box<dyn DeviceStream>, ComposerError>;

    /// Current permission state, if the device can answer without prompting.
    async fn permission(&self) -> PermissionInfo {
        PermissionInfo::not_determined("permission state is known only after a capture request")
    }
}

//! Microphone capture: device collaborator traits and the session state machine.

pub mod controller;
pub mod device;

pub use controller::{CaptureController, CapturePhase, StartReport, StopReport};
pub use device::{CaptureDevice, DeviceStream};

//! Testing utilities - scripted collaborators for offline testing
//!
//! No real microphone or remote record store is needed to exercise the
//! composer: [`ScriptedDevice`] plays back a fixed chunk script and
//! [`InstrumentedStore`] wraps any store with call counting and fault
//! injection.

pub mod scripted;
pub mod store;

pub use scripted::{synthetic_opus_payload, ScriptedDevice};
pub use store::InstrumentedStore;

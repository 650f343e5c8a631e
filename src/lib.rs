//! CareChat: voice and text message composition for paired care conversations
//!
//! This crate implements the composer core shared by the care-seeker and
//! care-provider sides of a chat: microphone capture as an explicit state
//! machine, a binary-to-text codec for audio payloads, message dispatch with
//! role derivation, and the find-or-create sync that keeps the per-pair
//! conversation summary consistent.
//!
//! # Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! carechat = "0.1"
//! tauri = "2.0"
//! ```
//!
//! Then in your Tauri app:
//! ```rust,ignore
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(carechat::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! Host applications register their persistence and microphone backends with
//! [`commands::use_record_store`] and [`commands::use_capture_device`]; the
//! core itself never talks to a database or device directly.
pub mod capture;
pub mod codec;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod ledger;
pub mod permissions;
pub mod session;
pub mod store;
pub mod types;

// Testing utilities - scripted collaborators for offline testing
pub mod testing;

// Re-exports for convenience
pub use capture::{CaptureController, CapturePhase, StartReport, StopReport};
pub use errors::ComposerError;
pub use session::ComposerSession;
pub use types::{
    ConversationAggregate, EncodedAudio, IdentityPair, MessageRecord, SendOutcome, SendReceipt,
};

use tauri::{
    plugin::{Builder, TauriPlugin},
    Runtime,
};

/// Initialize the CareChat plugin with all commands
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("carechat")
        .invoke_handler(tauri::generate_handler![
            // Composer commands
            commands::compose::open_composer,
            commands::compose::close_composer,
            commands::compose::set_draft,
            commands::compose::send_message,
            commands::compose::discard_recording,
            commands::compose::get_conversation,
            commands::compose::decode_audio_message,
            // Capture commands
            commands::capture::start_voice_capture,
            commands::capture::stop_voice_capture,
            commands::capture::cancel_voice_capture,
            commands::capture::get_capture_status,
            // Permission commands
            commands::permissions::check_microphone_permission,
            commands::permissions::get_permission_status_string,
            // Configuration commands
            commands::config::get_config,
            commands::config::update_config,
            commands::config::reset_config,
        ])
        .build()
}

/// Initialize logging for the composer
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "carechat=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

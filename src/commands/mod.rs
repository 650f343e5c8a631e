pub mod capture;
pub mod compose;
pub mod config;
pub mod permissions;

pub use capture::*;
pub use compose::*;
pub use config::*;
pub use permissions::*;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::capture::CaptureDevice;
use crate::session::ComposerSession;
use crate::store::{MemoryStore, RecordStore};

// Global composer registry plus the injected collaborators. Sessions are
// keyed by an opaque id handed out by open_composer.
lazy_static::lazy_static! {
    static ref SESSION_REGISTRY: Arc<RwLock<HashMap<String, Arc<Mutex<ComposerSession>>>>> =
        Arc::new(RwLock::new(HashMap::new()));
    static ref ACTIVE_STORE: RwLock<Option<Arc<dyn RecordStore>>> = RwLock::new(None);
    static ref ACTIVE_DEVICE: RwLock<Option<Arc<dyn CaptureDevice>>> = RwLock::new(None);
}

/// Install the record store the command layer talks to.
///
/// Host applications call this during setup; without it the commands fall
/// back to a process-local in-memory store.
pub async fn use_record_store(store: Arc<dyn RecordStore>) {
    *ACTIVE_STORE.write().await = Some(store);
}

/// Install the capture device voice commands should record with.
pub async fn use_capture_device(device: Arc<dyn CaptureDevice>) {
    *ACTIVE_DEVICE.write().await = Some(device);
}

pub(crate) async fn active_store() -> Arc<dyn RecordStore> {
    {
        let store = ACTIVE_STORE.read().await;
        if let Some(store) = store.as_ref() {
            return store.clone();
        }
    }
    let mut store = ACTIVE_STORE.write().await;
    store
        .get_or_insert_with(|| {
            log::info!("no record store registered, using in-memory store");
            Arc::new(MemoryStore::new())
        })
        .clone()
}

pub(crate) async fn active_device() -> Result<Arc<dyn CaptureDevice>, String> {
    ACTIVE_DEVICE
        .read()
        .await
        .clone()
        .ok_or_else(|| "No capture device registered".to_string())
}

pub(crate) async fn session(session_id: &str) -> Result<Arc<Mutex<ComposerSession>>, String> {
    SESSION_REGISTRY
        .read()
        .await
        .get(session_id)
        .cloned()
        .ok_or_else(|| format!("Unknown composer session: {}", session_id))
}

use crate::config::CareChatConfig;
use std::sync::{Arc, RwLock};
use tauri::command;

lazy_static::lazy_static! {
    static ref GLOBAL_CONFIG: Arc<RwLock<CareChatConfig>> =
        Arc::new(RwLock::new(CareChatConfig::load_or_default()));
}

/// Snapshot of the active configuration for session construction
pub(crate) async fn current_config() -> CareChatConfig {
    GLOBAL_CONFIG
        .read()
        .map(|config| config.clone())
        .unwrap_or_default()
}

/// Get the current configuration
#[command]
pub async fn get_config() -> Result<CareChatConfig, String> {
    let config = GLOBAL_CONFIG.read().map_err(|e| e.to_string())?;
    Ok(config.clone())
}

/// Update configuration
#[command]
pub async fn update_config(new_config: CareChatConfig) -> Result<(), String> {
    // Validate first
    new_config.validate().map_err(|e| e.to_string())?;

    {
        let mut config = GLOBAL_CONFIG.write().map_err(|e| e.to_string())?;
        *config = new_config.clone();
    }

    // Save to file
    new_config
        .save_to_file(CareChatConfig::default_path())
        .map_err(|e| e.to_string())?;

    Ok(())
}

/// Reset configuration to defaults
#[command]
pub async fn reset_config() -> Result<CareChatConfig, String> {
    let default_config = CareChatConfig::default();

    {
        let mut config = GLOBAL_CONFIG
            .write()
            .map_err(|e| format!("Failed to write config: {}", e))?;
        *config = default_config.clone();
    }

    // Save defaults to file
    default_config
        .save_to_file(CareChatConfig::default_path())
        .map_err(|e| e.to_string())?;

    Ok(default_config)
}

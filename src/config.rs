//! Configuration management for CareChat
//!
//! Provides configuration loading, saving, and management for collection
//! names, audio capture settings, and composer behavior flags.

use crate::errors::ComposerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareChatConfig {
    pub collections: CollectionsConfig,
    pub audio: AudioConfig,
    pub composer: ComposerConfig,
}

/// Named collections in the record store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsConfig {
    /// Collection holding individual message records
    pub messages: String,
    /// Collection holding per-pair conversation aggregates
    pub conversations: String,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// MIME type finished captures are encoded with
    pub record_mime: String,
    /// Maximum chunks a capture session may buffer; exceeding it fails the
    /// capture rather than dropping audio
    pub max_buffered_chunks: usize,
}

/// Composer behavior flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Whether a pending recording can be discarded before sending
    pub allow_audio_discard: bool,
}

impl Default for CareChatConfig {
    fn default() -> Self {
        Self {
            collections: CollectionsConfig {
                messages: "Chats".to_string(),
                conversations: "Conversations".to_string(),
            },
            audio: AudioConfig {
                record_mime: crate::codec::RECORD_MIME.to_string(),
                max_buffered_chunks: 256,
            },
            composer: ComposerConfig {
                allow_audio_discard: true,
            },
        }
    }
}

impl CareChatConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ComposerError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            ComposerError::PersistenceError(format!("Failed to read config file: {}", e))
        })?;

        let config: CareChatConfig = toml::from_str(&contents).map_err(|e| {
            ComposerError::PersistenceError(format!("Failed to parse config file: {}", e))
        })?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ComposerError> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ComposerError::PersistenceError(format!(
                    "Failed to create config directory: {}",
                    e
                ))
            })?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            ComposerError::PersistenceError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            ComposerError::PersistenceError(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("carechat.toml")
    }

    /// Load from default location or create with defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.collections.messages.is_empty() {
            return Err("Messages collection name must not be empty".to_string());
        }
        if self.collections.conversations.is_empty() {
            return Err("Conversations collection name must not be empty".to_string());
        }
        if self.collections.messages == self.collections.conversations {
            return Err("Messages and conversations collections must differ".to_string());
        }

        if self.audio.record_mime.is_empty() || !self.audio.record_mime.contains('/') {
            return Err("Record MIME must be a type/subtype pair".to_string());
        }
        if self.audio.record_mime.contains(',') {
            return Err("Record MIME must not contain a comma".to_string());
        }
        if self.audio.max_buffered_chunks == 0 {
            return Err("Max buffered chunks must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CareChatConfig::default();
        assert_eq!(config.collections.messages, "Chats");
        assert_eq!(config.collections.conversations, "Conversations");
        assert!(config.composer.allow_audio_discard);
    }

    #[test]
    fn test_config_validation() {
        let config = CareChatConfig::default();
        assert!(config.validate().is_ok());

        let mut bad_config = config.clone();
        bad_config.collections.messages = String::new();
        assert!(bad_config.validate().is_err());

        let mut same_collections = CareChatConfig::default();
        same_collections.collections.conversations = "Chats".to_string();
        assert!(same_collections.validate().is_err());

        // A comma in the MIME would break the transport text split
        let mut bad_mime = CareChatConfig::default();
        bad_mime.audio.record_mime = "audio/ogg, opus".to_string();
        assert!(bad_mime.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("carechat.toml");

        let config = CareChatConfig::default();
        assert!(config.save_to_file(&config_path).is_ok());

        let loaded = CareChatConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.collections.messages, config.collections.messages);
        assert_eq!(loaded.audio.record_mime, config.audio.record_mime);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let loaded = CareChatConfig::load_from_file("/nonexistent/carechat.toml").unwrap();
        assert_eq!(loaded.collections.messages, "Chats");
    }
}

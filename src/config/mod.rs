use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use directories::BaseDirs;

use crate::chat::clock::{validate_timestamp_format, DEFAULT_TIMESTAMP_FORMAT};
use crate::chat::Variant;
use crate::error::{ChatError, Result};

const CONFIG_DIR: &str = "flight-chat";
const MAIN_CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "flight-chat.log";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    pub variant: Variant,
    /// chrono format string for transcript timestamps.
    pub timestamp_format: String,
    /// Pause between replayed script steps in interactive mode.
    pub replay_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Full,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            replay_delay_ms: 800,
        }
    }
}

pub struct ConfigManager {
    config_dir: PathBuf,
    app_config: AppConfig,
}

impl ConfigManager {
    /// Loads `config.toml` from the platform config directory, falling back
    /// to defaults when it is missing or unreadable.
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        let app_config = Self::load_app_config(&config_dir);
        Ok(Self {
            config_dir,
            app_config,
        })
    }

    /// Loads an explicitly requested file. Unlike [`ConfigManager::new`] a
    /// missing or malformed file is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ChatError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let app_config: AppConfig = toml::from_str(&content)
            .map_err(|e| ChatError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        validate_timestamp_format(&app_config.chat.timestamp_format)?;
        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self {
            config_dir,
            app_config,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn app_config(&self) -> &AppConfig {
        &self.app_config
    }

    pub fn app_config_mut(&mut self) -> &mut AppConfig {
        &mut self.app_config
    }

    /// Log file used when none is configured but stderr is unavailable.
    pub fn default_log_file(&self) -> PathBuf {
        self.config_dir.join(LOG_FILE)
    }

    fn get_config_dir() -> Result<PathBuf> {
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(CONFIG_DIR))
            .ok_or_else(|| ChatError::Config("Could not determine config directory".to_string()))
    }

    fn load_app_config(config_dir: &Path) -> AppConfig {
        let path = config_dir.join(MAIN_CONFIG_FILE);
        let mut config: AppConfig = Self::load_toml_file(&path).unwrap_or_default();
        if let Err(e) = validate_timestamp_format(&config.chat.timestamp_format) {
            tracing::warn!("{} in {}, using {}", e, path.display(), DEFAULT_TIMESTAMP_FORMAT);
            config.chat.timestamp_format = DEFAULT_TIMESTAMP_FORMAT.to_string();
        }
        config
    }

    fn load_toml_file<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> Option<T> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)
                .map_err(|e| ChatError::Config(format!("Failed to create config dir: {}", e)))?;
        }
        Ok(())
    }

    pub fn write_default_config(&self) -> Result<()> {
        self.ensure_config_dir()?;

        let main_path = self.config_dir.join(MAIN_CONFIG_FILE);
        if !main_path.exists() {
            let content = toml::to_string_pretty(&AppConfig::default())
                .map_err(|e| ChatError::Config(format!("Failed to serialize config: {}", e)))?;
            std::fs::write(&main_path, content)
                .map_err(|e| ChatError::Config(format!("Failed to write config: {}", e)))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.chat.variant, Variant::Full);
        assert_eq!(config.chat.timestamp_format, "%H:%M");
    }

    #[test]
    fn test_app_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig = toml::from_str("[chat]\nvariant = \"basic\"\n").unwrap();
        assert_eq!(parsed.chat.variant, Variant::Basic);
        assert_eq!(parsed.chat.replay_delay_ms, 800);
        assert_eq!(parsed.general, GeneralConfig::default());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nlog_level = \"debug\"\n[chat]\nvariant = \"feedback\"\n").unwrap();

        let manager = ConfigManager::from_file(&path).unwrap();
        assert_eq!(manager.app_config().general.log_level, "debug");
        assert_eq!(manager.app_config().chat.variant, Variant::Feedback);
        assert_eq!(manager.config_dir(), dir.path());
    }

    #[test]
    fn test_from_file_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigManager::from_file(&dir.path().join("nope.toml")).err().unwrap();
        assert!(matches!(err, ChatError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_from_file_malformed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chat]\nvariant = 3\n").unwrap();
        assert!(matches!(ConfigManager::from_file(&path), Err(ChatError::Config(_))));
    }

    #[test]
    fn test_from_file_rejects_bad_timestamp_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chat]\ntimestamp_format = \"%Q\"\n").unwrap();

        let err = ConfigManager::from_file(&path).err().unwrap();
        match err {
            ChatError::Config(msg) => assert!(msg.contains("%Q"), "{msg}"),
            other => panic!("Expected Config, got {other:?}"),
        }
    }

    #[test]
    fn test_load_app_config_replaces_bad_timestamp_format() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MAIN_CONFIG_FILE),
            "[chat]\nvariant = \"basic\"\ntimestamp_format = \"%Q\"\n",
        )
        .unwrap();

        let config = ConfigManager::load_app_config(dir.path());
        assert_eq!(config.chat.timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
        assert_eq!(config.chat.variant, Variant::Basic);
    }

    #[test]
    fn test_load_app_config_falls_back_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MAIN_CONFIG_FILE), "not = [valid").unwrap();
        assert_eq!(ConfigManager::load_app_config(dir.path()), AppConfig::default());
    }

    #[test]
    fn test_write_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager {
            config_dir: dir.path().join("nested"),
            app_config: AppConfig::default(),
        };
        manager.write_default_config().unwrap();

        let written = std::fs::read_to_string(dir.path().join("nested").join(MAIN_CONFIG_FILE)).unwrap();
        let parsed: AppConfig = toml::from_str(&written).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }
}

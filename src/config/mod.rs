use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub whisper: WhisperConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Directory recordings are written to and listed from.
    pub recordings_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhisperConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub model_path: Option<String>,
    pub language: Option<String>,
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            recordings_dir: ".".to_string(),
        }
    }
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            provider: Some("local-whisper".to_string()),
            model: Some("whisper-1".to_string()),
            model_path: None,
            language: None,
            api_endpoint: None,
            api_key: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 7466, // PHON on a phone keypad
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn recordings_dir(&self) -> PathBuf {
        PathBuf::from(&self.audio.recordings_dir)
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.api.port, 7466);
        assert_eq!(parsed.audio.recordings_dir, ".");
        assert_eq!(parsed.whisper.provider.as_deref(), Some("local-whisper"));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[api]\nport = 9000\n").unwrap();
        assert_eq!(parsed.api.port, 9000);
        assert_eq!(parsed.audio.recordings_dir, ".");
    }
}

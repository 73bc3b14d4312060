use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::stability::DEFAULT_WINDOW;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("endpoint host is empty")]
    EmptyHost,
    #[error("stability window must be greater than zero")]
    ZeroWindow,
    #[error("only one tracked hand is supported, got {0}")]
    MaxHands(u32),
    #[error("{name} must be within [0, 1], got {value}")]
    Confidence { name: &'static str, value: f32 },
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Remote controller address.
    pub host: String,
    pub port: u16,
    /// How long a gesture must hold before it is sent, and the repeat
    /// interval while it keeps holding.
    pub stability_window_ms: u64,
    pub connect_timeout_ms: u64,
    /// Passed through to the landmark provider.
    pub max_num_hands: u32,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    /// Provider argv. Empty means landmarks arrive on stdin.
    pub provider_command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5005,
            stability_window_ms: DEFAULT_WINDOW.as_millis() as u64,
            connect_timeout_ms: 5000,
            max_num_hands: 1,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.5,
            provider_command: Vec::new(),
        }
    }
}

impl Config {
    /// Directory: ~/.config/gesture-link/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("gesture-link");
        p
    }

    pub fn default_path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if the file doesn't exist or is invalid.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.stability_window_ms == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.max_num_hands != 1 {
            return Err(ConfigError::MaxHands(self.max_num_hands));
        }
        for (name, value) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Confidence { name, value });
            }
        }
        Ok(())
    }

    pub fn stability_window(&self) -> Duration {
        Duration::from_millis(self.stability_window_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.stability_window(), DEFAULT_WINDOW);
        assert_eq!(config.stability_window_ms, 800);
        assert_eq!(config.port, 5005);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            host: "10.0.0.2".into(),
            stability_window_ms: 500,
            provider_command: vec!["python3".into(), "hands.py".into()],
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"port": 6000}"#).unwrap();

        let config = Config::load(&path);
        assert_eq!(config.port, 6000);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_missing_or_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(&dir.path().join("absent.json")), Config::default());

        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load(&path), Config::default());
    }

    #[test]
    fn test_validation_errors() {
        let bad = |f: fn(&mut Config)| {
            let mut config = Config::default();
            f(&mut config);
            config.validate().unwrap_err()
        };
        assert_eq!(bad(|c| c.host = " ".into()), ConfigError::EmptyHost);
        assert_eq!(bad(|c| c.stability_window_ms = 0), ConfigError::ZeroWindow);
        assert_eq!(bad(|c| c.max_num_hands = 2), ConfigError::MaxHands(2));
        assert!(matches!(
            bad(|c| c.min_tracking_confidence = 1.5),
            ConfigError::Confidence {
                name: "min_tracking_confidence",
                ..
            }
        ));
    }
}

//! Static configuration loaded once at startup
//!
//! This configuration is read-only after the daemon starts.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{MultiHtuError, Result};

/// Board connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSection {
    /// Serial device path, e.g. `/dev/ttyUSB0`
    pub port: Option<String>,
    /// Log every byte sent and received
    pub debug_uart: bool,
}

/// Host polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between poll cycles
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

/// Static configuration for the multiHTU21D daemon.
///
/// Located at `~/.config/multihtu/config.toml` by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Board connection settings
    pub board: BoardSection,

    /// Poll cycle settings
    pub poll: PollConfig,
}

impl StaticConfig {
    /// Create a StaticConfig pointing at a device path.
    pub fn with_port(port: impl Into<String>) -> Self {
        Self {
            board: BoardSection {
                port: Some(port.into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Parse StaticConfig from TOML string.
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize StaticConfig to TOML string.
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load from a file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            MultiHtuError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.poll.interval_secs == 0 {
            return Err(MultiHtuError::Config(
                "poll.interval_secs must be at least 1".to_string(),
            ));
        }
        if let Some(port) = &self.board.port {
            if port.trim().is_empty() {
                return Err(MultiHtuError::Config(
                    "board.port must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The configured device path.
    ///
    /// # Errors
    ///
    /// Returns `MultiHtuError::Config` when no port is set.
    pub fn port(&self) -> Result<&str> {
        self.board
            .port
            .as_deref()
            .ok_or_else(|| MultiHtuError::Config("board.port is required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_static_config() {
        let config = StaticConfig::default();
        assert_eq!(config.poll.interval_secs, 30);
        assert!(config.board.port.is_none());
        assert!(!config.board.debug_uart);
        assert!(config.port().is_err());
    }

    #[test]
    fn test_static_config_serialization() {
        let config = StaticConfig::with_port("/dev/ttyUSB0");
        let toml_str = config.to_toml().unwrap();

        assert!(toml_str.contains("[board]"));
        assert!(toml_str.contains("[poll]"));
        assert!(toml_str.contains("/dev/ttyUSB0"));
    }

    #[test]
    fn test_static_config_deserialization() {
        let toml_str = r#"
            [board]
            port = "/dev/ttyACM0"
            debug_uart = true

            [poll]
            interval_secs = 10
        "#;

        let config = StaticConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.port().unwrap(), "/dev/ttyACM0");
        assert!(config.board.debug_uart);
        assert_eq!(config.poll.interval_secs, 10);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = StaticConfig::from_toml("[board]\nport = \"COM3\"\n").unwrap();
        assert_eq!(config.port().unwrap(), "COM3");
        assert_eq!(config.poll.interval_secs, 30);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = StaticConfig::from_toml("[poll]\ninterval_secs = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(MultiHtuError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_blank_port() {
        let config = StaticConfig::with_port("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let config = StaticConfig::load(Path::new("/nonexistent/multihtu/config.toml")).unwrap();
        assert!(config.board.port.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[board]\nport = \"/dev/ttyUSB1\"\n").unwrap();

        let config = StaticConfig::load(&path).unwrap();
        assert_eq!(config.port().unwrap(), "/dev/ttyUSB1");
    }

    #[test]
    fn test_load_malformed_file_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[board\nport = ").unwrap();

        assert!(matches!(
            StaticConfig::load(&path),
            Err(MultiHtuError::Config(_))
        ));
    }
}

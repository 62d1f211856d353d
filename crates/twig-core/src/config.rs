//! Configuration management for Twig.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::commit::Zone;
use crate::error::Result;

/// Twig configuration loaded from `twig.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// History listing settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Rendering settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load config from a TOML file.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a TOML file.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Zone commit dates should be rendered in.
    #[must_use]
    pub const fn zone(&self) -> Zone {
        if self.display.utc { Zone::Utc } else { Zone::Local }
    }
}

/// History listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of commits listed when no count is given.
    #[serde(default = "default_count")]
    pub default_count: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_count: default_count(),
        }
    }
}

const fn default_count() -> usize {
    10
}

/// Rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Render commit dates in UTC instead of local time.
    #[serde(default)]
    pub utc: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.history.default_count, 10);
        assert!(!config.display.utc);
        assert_eq!(config.zone(), Zone::Local);
    }

    #[test]
    fn test_config_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("twig.toml");

        let config = Config {
            history: HistoryConfig { default_count: 3 },
            display: DisplayConfig { utc: true },
        };

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.history.default_count, 3);
        assert!(loaded.display.utc);
        assert_eq!(loaded.zone(), Zone::Utc);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("twig.toml");
        fs::write(&path, "[display]\nutc = true\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert!(loaded.display.utc);
        assert_eq!(loaded.history.default_count, 10);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("twig.toml");
        fs::write(&path, "[history]\ndefault_count = \"lots\"\n").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(crate::Error::Toml(_))
        ));
    }

    #[test]
    fn test_missing_config_returns_default() {
        let config = Config::load("/nonexistent/path/twig.toml").unwrap();
        assert_eq!(config.history.default_count, 10);
    }
}

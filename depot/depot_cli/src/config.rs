//! Settings file handling
//!
//! Settings come from an optional TOML file; command line flags are applied
//! on top by the individual commands.

use anyhow::{Context, Result};
use depot_pool::PoolConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Everything the driver can be configured with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pool construction settings
    pub pool: PoolConfig,

    /// Worker behaviour
    pub driver: DriverConfig,
}

/// How the interactive driver's workers behave
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// How long a slow query keeps its connection, in seconds
    pub hold_secs: u64,

    /// A query whose last word equals this marker is treated as slow
    pub slow_marker: String,
}

impl DriverConfig {
    pub fn hold(&self) -> Duration {
        Duration::from_secs(self.hold_secs)
    }

    /// Whether `query` should hold its connection for [`Self::hold`]
    pub fn is_slow(&self, query: &str) -> bool {
        query.split_whitespace().last() == Some(self.slow_marker.as_str())
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            hold_secs: 20,
            slow_marker: "1".to_string(),
        }
    }
}

/// Load settings from `path`, or the defaults when no file is given
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(path) => path,
        None => return Ok(Settings::default()),
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let settings = toml::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;

    log::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_file() {
        let settings = load(None).unwrap();
        assert_eq!(settings.pool.capacity, 5);
        assert_eq!(settings.driver.hold_secs, 20);
    }

    #[test]
    fn test_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[pool]\ncapacity = 3\n\n[driver]\nslow_marker = \"slow\"").unwrap();

        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.pool.capacity, 3);
        assert_eq!(settings.pool.name, "default");
        assert_eq!(settings.driver.slow_marker, "slow");
        assert_eq!(settings.driver.hold_secs, 20);
    }

    #[test]
    fn test_bad_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[pool]\ncapacity = \"many\"").unwrap();
        assert!(load(Some(file.path())).is_err());
        assert!(load(Some(Path::new("/nonexistent/depot.toml"))).is_err());
    }

    #[test]
    fn test_slow_marker() {
        let driver = DriverConfig::default();
        assert!(driver.is_slow("SELECT * FROM users 1"));
        assert!(!driver.is_slow("SELECT * FROM users"));
        assert!(!driver.is_slow(""));
    }
}

//! Configuration for the settings panel
//!
//! Read-only settings for the panel itself (host call timeout, logging,
//! capture placeholder). Stored in `~/.settings-panel/panel.json`; the panel
//! never writes the file, so older schema versions are migrated in memory only.

use crate::error::ConfigError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Current config schema version
const CURRENT_VERSION: u32 = 1;

/// Global config instance for caching
static CONFIG: OnceLock<RwLock<PanelConfig>> = OnceLock::new();

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Schema version for migrations
    pub version: u32,
    /// Host bridge settings
    pub host: HostConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Hotkey capture settings
    pub capture: CaptureConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            host: HostConfig::default(),
            logging: LoggingConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl PanelConfig {
    /// Timeout applied to every awaited host call
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.host.call_timeout_secs.max(1))
    }
}

/// Host bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Seconds to wait for a host call before treating it as failed
    pub call_timeout_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Whether to also write logs to `~/.settings-panel/logs`
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: true,
        }
    }
}

/// Hotkey capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Preview text shown while no key is held
    pub placeholder: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            placeholder: "Press keys…".to_string(),
        }
    }
}

/// Get the path to the panel directory (~/.settings-panel)
pub fn get_panel_dir() -> PathBuf {
    home_dir_or_fallback().join(".settings-panel")
}

/// Get the path to the config file (~/.settings-panel/panel.json)
pub fn get_config_path() -> PathBuf {
    get_panel_dir().join("panel.json")
}

/// Get the home directory, falling back to /tmp if unavailable
fn home_dir_or_fallback() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        tracing::error!("Could not determine home directory, using /tmp");
        PathBuf::from("/tmp")
    })
}

/// Load configuration from a file
///
/// A missing file yields defaults.
pub fn load_from_path(path: &Path) -> Result<PanelConfig, ConfigError> {
    if !path.exists() {
        tracing::info!("Config file not found at {}, using defaults", path.display());
        return Ok(PanelConfig::default());
    }

    let contents = fs::read_to_string(path)?;
    let config: PanelConfig = serde_json::from_str(&contents)?;

    migrate_config(config)
}

/// Migrate configuration from older schema versions
fn migrate_config(mut config: PanelConfig) -> Result<PanelConfig, ConfigError> {
    let original_version = config.version;

    while config.version < CURRENT_VERSION {
        config = apply_migration(config)?;
    }

    if config.version != original_version {
        tracing::info!(
            "Migrated config from version {} to {}",
            original_version,
            config.version
        );
    }

    if config.version > CURRENT_VERSION {
        return Err(ConfigError::UnknownVersion(config.version));
    }

    Ok(config)
}

/// Apply a single migration step
fn apply_migration(config: PanelConfig) -> Result<PanelConfig, ConfigError> {
    match config.version {
        // Version 0 -> 1: the timeout was stored in milliseconds under the same key
        0 => {
            let mut migrated = config;
            migrated.host.call_timeout_secs = migrated.host.call_timeout_secs.div_ceil(1000);
            migrated.version = 1;
            Ok(migrated)
        }
        v => Err(ConfigError::UnknownVersion(v)),
    }
}

/// Get the global config instance
fn get_config_instance() -> &'static RwLock<PanelConfig> {
    CONFIG.get_or_init(|| {
        let config = load_from_path(&get_config_path()).unwrap_or_else(|e| {
            tracing::error!("Failed to load config, using defaults: {}", e);
            PanelConfig::default()
        });
        RwLock::new(config)
    })
}

/// Get the current configuration
///
/// Loaded from disk on first access and cached for the process lifetime.
pub fn get_config() -> PanelConfig {
    get_config_instance().read().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_current_version() {
        let config = PanelConfig::default();
        assert_eq!(config.version, CURRENT_VERSION);
        assert_eq!(config.host.call_timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file_logging);
        assert_eq!(config.capture.placeholder, "Press keys…");
    }

    #[test]
    fn test_partial_config_deserialisation() {
        let json = r#"{"version": 1, "host": {"call_timeout_secs": 5}}"#;
        let config: PanelConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.host.call_timeout_secs, 5);
        assert_eq!(config.logging.level, "info"); // Default
    }

    #[test]
    fn test_call_timeout_never_zero() {
        let mut config = PanelConfig::default();
        config.host.call_timeout_secs = 0;
        assert_eq!(config.call_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_migration_from_version_0() {
        let mut old_config = PanelConfig {
            version: 0,
            ..Default::default()
        };
        old_config.host.call_timeout_secs = 15000;

        let migrated = migrate_config(old_config).unwrap();
        assert_eq!(migrated.version, CURRENT_VERSION);
        assert_eq!(migrated.host.call_timeout_secs, 15);
    }

    #[test]
    fn test_migration_converts_every_millisecond_value() {
        for (millis, secs) in [(500, 1), (1000, 1), (1500, 2), (0, 0)] {
            let mut old_config = PanelConfig {
                version: 0,
                ..Default::default()
            };
            old_config.host.call_timeout_secs = millis;

            let migrated = migrate_config(old_config).unwrap();
            assert_eq!(migrated.host.call_timeout_secs, secs, "{} ms", millis);
        }
    }

    #[test]
    fn test_global_config_is_cached() {
        let first = get_config();
        let second = get_config();
        assert_eq!(first.version, CURRENT_VERSION);
        assert_eq!(first.call_timeout(), second.call_timeout());
        assert_eq!(first.capture.placeholder, second.capture.placeholder);
    }

    #[test]
    fn test_future_version_rejected() {
        let future_config = PanelConfig {
            version: 999,
            ..Default::default()
        };

        assert!(matches!(
            migrate_config(future_config),
            Err(ConfigError::UnknownVersion(999))
        ));
        assert!(apply_migration(PanelConfig {
            version: 7,
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_config_path_format() {
        let path = get_config_path();
        let path_str = path.to_string_lossy();

        assert!(path_str.contains(".settings-panel"));
        assert!(path_str.ends_with("panel.json"));
    }
}

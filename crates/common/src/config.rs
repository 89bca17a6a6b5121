//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{StrideError, StrideResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gait event detection defaults.
    pub gait: GaitDefaults,

    /// Left/right pairing and symmetry defaults.
    pub symmetry: SymmetryDefaults,

    /// Autocorrelation GSI defaults.
    pub gsi: GsiDefaults,

    /// Activity and elevation filter defaults.
    pub filters: FilterDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Plausibility windows for pairing gait events (milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitDefaults {
    pub contact_time_range_ms: [f64; 2],
    pub step_time_range_ms: [f64; 2],
    /// Minimum prominence of a contact peak, in signal units.
    pub peak_prominence: f64,
}

/// Defaults for merging feet and computing symmetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SymmetryDefaults {
    /// Symmetry method tag: `si`, `sa`, `usi` or `wusi`.
    pub method: String,

    /// Maximum gap between a step and the opposite foot's step (seconds).
    pub pairing_tolerance_secs: f64,

    /// Foot labels as they appear in step records, first is "left".
    pub feet: [String; 2],
}

/// Defaults for the autocorrelation gait symmetry index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GsiDefaults {
    /// Maximum autocorrelation lag (samples).
    pub max_lag: usize,
    /// Lags below this are ignored when locating the stride peak (samples).
    pub dead_lag: usize,
    /// Sample rate of the acceleration stream (Hz).
    pub sample_rate_hz: f64,
}

/// Padding applied around activity and elevation bouts (seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDefaults {
    /// Activity label that counts as valid.
    pub activity: String,
    /// `[start offset, end offset]` for running bouts.
    pub activity_window_secs: [f64; 2],
    /// `[start offset, end offset]` for elevation-change bouts.
    pub elevation_window_secs: [f64; 2],
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "stridelab=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for GaitDefaults {
    fn default() -> Self {
        Self {
            contact_time_range_ms: [50.0, 200.0],
            step_time_range_ms: [200.0, 1000.0],
            peak_prominence: 1.5,
        }
    }
}

impl Default for SymmetryDefaults {
    fn default() -> Self {
        Self {
            method: "sa".to_string(),
            pairing_tolerance_secs: 1.0,
            feet: ["left".to_string(), "right".to_string()],
        }
    }
}

impl Default for GsiDefaults {
    fn default() -> Self {
        Self {
            max_lag: 150,
            dead_lag: 50,
            sample_rate_hz: 100.0,
        }
    }
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            activity: "running".to_string(),
            activity_window_secs: [10.0, -2.0],
            elevation_window_secs: [-10.0, 2.0],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Missing fields take defaults.
    pub fn load_from(path: &Path) -> StrideResult<Self> {
        if !path.exists() {
            return Err(StrideError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| StrideError::config(format!("{}: {e}", path.display())))
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("stridelab").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_takes_defaults() {
        let raw = r#"{ "gsi": { "sample_rate_hz": 50.0 }, "logging": { "json": true } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.gsi.sample_rate_hz, 50.0);
        assert_eq!(config.gsi.max_lag, 150);
        assert_eq!(config.gsi.dead_lag, 50);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.symmetry.method, "sa");
        assert_eq!(config.gait.contact_time_range_ms, [50.0, 200.0]);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = AppConfig::load_from(Path::new("/nonexistent/stridelab.json")).unwrap_err();
        assert!(matches!(err, StrideError::FileNotFound { .. }));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.filters.activity_window_secs, [10.0, -2.0]);
        assert_eq!(parsed.symmetry.feet, ["left".to_string(), "right".to_string()]);
    }
}

//! Configuration file support.
//!
//! Settings are plain serde structs with per-field defaults so that older or
//! partial configuration files keep loading.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::{AiError, ApiKey};
use crate::color_utils::parse_hex;
use crate::constants::{
    DEFAULT_API_KEY_ENV, DEFAULT_DETECTION_BATCH_SIZE, DEFAULT_HANDLE_HIT_RADIUS, DEFAULT_LABEL,
    DEFAULT_MIN_EXTENT, DEFAULT_PALETTE,
};

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File written by an incompatible version
    #[error("Config version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    /// A value outside its allowed range
    #[error("Invalid setting '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default)]
    pub preferences: Preferences,

    #[serde(default)]
    pub editor: EditorSettings,

    #[serde(default)]
    pub ai: AiSettings,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: Preferences::default(),
            editor: EditorSettings::default(),
            ai: AiSettings::default(),
        }
    }
}

impl StudioConfig {
    /// Parse and validate a configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: StudioConfig = serde_json::from_str(json)?;
        if config.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch {
                expected: CONFIG_VERSION,
                found: config.version,
            });
        }
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.editor.validate()?;
        self.ai.validate()
    }
}

/// User preferences section of the config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Geometry editor tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Smallest normalized width/height a resize may produce
    #[serde(default = "default_min_extent")]
    pub min_extent: f32,

    /// Handle grab radius in display pixels
    #[serde(default = "default_handle_hit_radius")]
    pub handle_hit_radius_px: f32,

    /// Label for freshly drawn boxes
    #[serde(default = "default_label")]
    pub default_label: String,

    /// Label colors, handed out in first-seen order
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
}

fn default_min_extent() -> f32 {
    DEFAULT_MIN_EXTENT
}

fn default_handle_hit_radius() -> f32 {
    DEFAULT_HANDLE_HIT_RADIUS
}

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            min_extent: default_min_extent(),
            handle_hit_radius_px: default_handle_hit_radius(),
            default_label: default_label(),
            palette: default_palette(),
        }
    }
}

impl EditorSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_extent > 0.0 && self.min_extent < 1.0) {
            return Err(ConfigError::invalid(
                "editor.min_extent",
                format!("{} is not in (0, 1)", self.min_extent),
            ));
        }
        if self.handle_hit_radius_px.is_nan() || self.handle_hit_radius_px < 0.0 {
            return Err(ConfigError::invalid(
                "editor.handle_hit_radius_px",
                format!("{} is negative", self.handle_hit_radius_px),
            ));
        }
        if self.default_label.trim().is_empty() {
            return Err(ConfigError::invalid("editor.default_label", "label is empty"));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::invalid("editor.palette", "palette is empty"));
        }
        if let Some(bad) = self.palette.iter().find(|c| parse_hex(c).is_none()) {
            return Err(ConfigError::invalid(
                "editor.palette",
                format!("'{bad}' is not a #rrggbb color"),
            ));
        }
        Ok(())
    }
}

/// Remote AI collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    /// Inline API key. Prefer the environment variable for real deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable consulted when `api_key` is unset
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Images per detection request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_DETECTION_BATCH_SIZE
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            batch_size: default_batch_size(),
        }
    }
}

impl AiSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::invalid("ai.batch_size", "must be at least 1"));
        }
        Ok(())
    }

    /// Resolve the API key from the config value, then the environment.
    pub fn credentials(&self) -> Result<ApiKey, AiError> {
        let inline = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        let key = inline.or_else(|| {
            std::env::var(&self.api_key_env)
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        });
        key.map(ApiKey::new).ok_or_else(|| {
            AiError::configuration(format!(
                "no API key configured (set ai.api_key or ${})",
                self.api_key_env
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = StudioConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.editor.min_extent, DEFAULT_MIN_EXTENT);
        assert_eq!(config.ai.batch_size, DEFAULT_DETECTION_BATCH_SIZE);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = StudioConfig::from_json(r#"{ "version": 1, "editor": { "min_extent": 0.02 } }"#)
            .unwrap();
        assert_eq!(config.editor.min_extent, 0.02);
        assert_eq!(config.editor.default_label, DEFAULT_LABEL);
        assert_eq!(config.preferences.log_level, LogLevel::Info);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = StudioConfig::default();
        config.preferences.log_level = LogLevel::Debug;
        config.ai.batch_size = 8;
        let json = config.to_json().unwrap();
        assert!(json.contains("\"debug\""));
        let back = StudioConfig::from_json(&json).unwrap();
        assert_eq!(back.ai.batch_size, 8);
        assert_eq!(back.preferences.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let err = StudioConfig::from_json(r#"{ "version": 99 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::VersionMismatch { found: 99, .. }));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = StudioConfig::from_json(r#"{ "version": 1, "ai": { "batch_size": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "ai.batch_size", .. }));

        let err = StudioConfig::from_json(r#"{ "version": 1, "editor": { "palette": [] } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "editor.palette", .. }));

        let err = StudioConfig::from_json(r#"{ "version": 1, "editor": { "palette": ["red"] } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "editor.palette", .. }));

        let err = StudioConfig::from_json(r#"{ "version": 1, "editor": { "min_extent": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "editor.min_extent", .. }));
    }

    #[test]
    fn test_inline_credentials() {
        let settings = AiSettings {
            api_key: Some("  secret  ".to_string()),
            ..AiSettings::default()
        };
        assert_eq!(settings.credentials().unwrap().expose(), "secret");
    }

    #[test]
    fn test_missing_credentials_is_configuration_error() {
        let settings = AiSettings {
            api_key: None,
            api_key_env: "BBOX_STUDIO_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            batch_size: 1,
        };
        let err = settings.credentials().unwrap_err();
        assert!(matches!(err, AiError::Configuration { .. }));
        assert!(!err.is_retryable());
    }
}

// Chordsong Settings Module
// Runtime settings that override the chord document per machine

use std::path::{Path, PathBuf};

use crate::config::parser::{validate_timeout, Config};
use crate::state::history::DEFAULT_HISTORY_SIZE;
use crate::transform::engine::CaptureConfig;

/// Runtime settings for chordsong
///
/// Loaded from a TOML file (default: ~/.config/chordsong/settings.toml).
/// Values left unset fall back to the chord document.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Leader key override
    leader_key: Option<String>,

    /// Editor context used to filter definitions
    context: Option<String>,

    /// Idle timeout override (milliseconds, 0 disables)
    timeout_ms: Option<u64>,

    /// History capacity
    history_size: usize,

    /// Path to the settings file (for reload)
    source_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    #[serde(default)]
    capture: Option<CaptureSettings>,

    #[serde(default)]
    history: Option<HistorySettings>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CaptureSettings {
    #[serde(default)]
    leader_key: Option<String>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct HistorySettings {
    #[serde(default)]
    max_size: Option<usize>,
}

impl Settings {
    /// Create settings with nothing overridden
    pub fn new() -> Self {
        Self {
            leader_key: None,
            context: None,
            timeout_ms: None,
            history_size: DEFAULT_HISTORY_SIZE,
            source_path: None,
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();

        if let Some(capture) = toml_settings.capture {
            settings.leader_key = non_empty(capture.leader_key);
            settings.context = non_empty(capture.context);
            if let Some(timeout_ms) = capture.timeout_ms {
                let timeout_ms = validate_timeout(timeout_ms)
                    .map_err(|e| SettingsError::InvalidValue(e.to_string()))?;
                settings.timeout_ms = Some(timeout_ms);
            }
        }

        if let Some(history) = toml_settings.history {
            if let Some(max_size) = history.max_size {
                settings.history_size = max_size;
            }
        }

        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chordsong").join("settings.toml"))
    }

    /// Load from default location (~/.config/chordsong/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        // Return default settings if file doesn't exist
        Ok(Self::new())
    }

    pub fn leader_key(&self) -> Option<&str> {
        self.leader_key.as_deref()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }

    pub fn history_size(&self) -> usize {
        self.history_size
    }

    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = Some(context.into());
    }

    /// Override the document's timeout and leader key where set
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(leader_key) = &self.leader_key {
            config.leader_key = leader_key.clone();
        }
    }

    /// Capture engine configuration for a loaded document
    pub fn capture_config(&self, config: &Config) -> CaptureConfig {
        CaptureConfig {
            timeout_ms: self.timeout_ms.unwrap_or(config.timeout_ms),
            context: self.context.clone(),
        }
    }

    /// Reload settings from the original file
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        if let Some(ref path) = self.source_path {
            let new_settings = Self::from_file(path)?;
            *self = new_settings;
            Ok(())
        } else {
            Err(SettingsError::InvalidValue("No source path set".to_string()))
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Create default settings content for a new installation
pub fn default_settings_content() -> &'static str {
    r#"# Chordsong Settings
# Place this file at: ~/.config/chordsong/settings.toml

[capture]
# Host key that starts a chord
# leader_key = "SPACE"
# Editor context used to filter definitions ("ALL" definitions always apply)
# context = "VIEW_3D"
# Idle timeout in milliseconds, 0 disables it
# timeout_ms = 1200

[history]
max_size = 88
"#
}

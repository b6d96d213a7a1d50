// Chordsong Config Parser - JSON with Serde
// Parses the chord mapping document into validated definitions

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::token_parser::{parse_chord, TokenParseError};
use crate::mapping::{ActionKind, ActionPayload, CallContext, ChordDefinition, DEFAULT_CONTEXT};

/// Document version this parser writes and expects
pub const CONFIG_VERSION: u64 = 1;

/// Idle timeout used when the document does not set one
pub const DEFAULT_TIMEOUT_MS: u64 = 1200;

/// Accepted range for a non-zero timeout
pub const MIN_TIMEOUT_MS: u64 = 100;
pub const MAX_TIMEOUT_MS: u64 = 10_000;

/// Leader key used when the document does not set one
pub const DEFAULT_LEADER_KEY: &str = "SPACE";

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("JSON serialize error: {0}")]
    JsonSerialize(String),

    #[error("Mapping #{0} has an empty chord")]
    EmptyChord(usize),

    #[error("Mapping #{index} has an invalid chord '{chord}': {source}")]
    InvalidChord {
        index: usize,
        chord: String,
        #[source]
        source: TokenParseError,
    },

    #[error("Mapping #{index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Mapping #{index} has unknown mapping_type '{value}'")]
    InvalidMappingType { index: usize, value: String },

    #[error("Mapping #{0}: kwargs must be an object")]
    InvalidKwargs(usize),

    #[error("Timeout value out of range: {0} ms (expected 0 or 100-10000)")]
    TimeoutOutOfRange(u64),
}

impl ConfigError {
    /// Problems confined to one mapping; the loader skips that mapping
    pub fn is_mapping_error(&self) -> bool {
        matches!(
            self,
            ConfigError::EmptyChord(_)
                | ConfigError::InvalidChord { .. }
                | ConfigError::MissingField { .. }
                | ConfigError::InvalidMappingType { .. }
        )
    }
}

/// Root of the JSON document
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigJson {
    /// Document version; anything other than 1 only produces a warning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_key: Option<String>,

    #[serde(default)]
    pub overlay: OverlayJson,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupJson>,

    #[serde(default)]
    pub mappings: Vec<MappingJson>,
}

/// Overlay settings; rendering keys (fonts, colours) are accepted and ignored
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverlayJson {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default = "default_column_rows")]
    pub column_rows: usize,
}

impl Default for OverlayJson {
    fn default() -> Self {
        Self {
            enabled: true,
            max_items: default_max_items(),
            column_rows: default_column_rows(),
        }
    }
}

/// Named group with an optional icon
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GroupJson {
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

/// One entry of the `mappings` array
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MappingJson {
    #[serde(default)]
    pub chord: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// `OPERATOR` (default), `PYTHON_FILE`, `CONTEXT_PROPERTY` or `CONTEXT_TOGGLE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_type: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub operator: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_context: Option<String>,

    /// Operator keyword arguments, or script arguments for `PYTHON_FILE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwargs: Option<Value>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub python_file: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context_path: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub property_value: String,
}

fn default_true() -> bool {
    true
}

fn default_max_items() -> usize {
    14
}

fn default_column_rows() -> usize {
    12
}

/// Overlay presentation limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySettings {
    pub enabled: bool,
    pub max_items: usize,
    pub column_rows: usize,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_items: default_max_items(),
            column_rows: default_column_rows(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// Idle timeout in milliseconds, 0 disables it
    pub timeout_ms: u64,
    /// Host key identifier that starts a capture session
    pub leader_key: String,
    pub overlay: OverlaySettings,
    pub groups: Vec<GroupJson>,
    /// Definitions in document order
    pub definitions: Vec<ChordDefinition>,
    /// Non-fatal problems found while loading
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            leader_key: DEFAULT_LEADER_KEY.to_string(),
            overlay: OverlaySettings::default(),
            groups: vec![],
            definitions: vec![],
            warnings: vec![],
        }
    }
}

impl Config {
    /// Parse a JSON configuration file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("Loading chord config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let json: ConfigJson =
            serde_json::from_str(content).map_err(|e| ConfigError::JsonParse(e.to_string()))?;

        json.to_config()
    }

    /// Write the configuration back as a pretty-printed JSON document
    pub fn to_json(&self) -> Result<String, ConfigError> {
        let json = ConfigJson {
            version: Some(Value::from(CONFIG_VERSION)),
            timeout_ms: Some(self.timeout_ms),
            leader_key: Some(self.leader_key.clone()),
            overlay: OverlayJson {
                enabled: self.overlay.enabled,
                max_items: self.overlay.max_items,
                column_rows: self.overlay.column_rows,
            },
            groups: self.groups.clone(),
            mappings: self.definitions.iter().map(MappingJson::from).collect(),
        };
        serde_json::to_string_pretty(&json).map_err(|e| ConfigError::JsonSerialize(e.to_string()))
    }
}

impl ConfigJson {
    /// Convert the parsed document to a validated Config
    pub fn to_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::default();

        match &self.version {
            None => {}
            Some(v) if v.as_u64() == Some(CONFIG_VERSION) => {}
            Some(v) => {
                let warning = format!(
                    "Unsupported config version: {} (expected {})",
                    v, CONFIG_VERSION
                );
                log::warn!("{}", warning);
                config.warnings.push(warning);
            }
        }

        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = validate_timeout(timeout_ms)?;
        }

        if let Some(leader_key) = self.leader_key.as_deref().map(str::trim) {
            if !leader_key.is_empty() {
                config.leader_key = leader_key.to_string();
            }
        }

        config.overlay = OverlaySettings {
            enabled: self.overlay.enabled,
            max_items: self.overlay.max_items,
            column_rows: self.overlay.column_rows,
        };
        config.groups = self.groups.clone();

        // Unfinished entries (empty chord or target) are skipped, not fatal
        for (index, mapping) in self.mappings.iter().enumerate() {
            match mapping.to_definition(index, &mut config.warnings) {
                Ok(definition) => config.definitions.push(definition),
                Err(e) if e.is_mapping_error() => {
                    let warning = format!("{}, skipping", e);
                    log::warn!("{}", warning);
                    config.warnings.push(warning);
                }
                Err(e) => return Err(e),
            }
        }

        log::debug!(
            "Chord config loaded: {} definitions, {} warnings",
            config.definitions.len(),
            config.warnings.len()
        );

        Ok(config)
    }
}

impl MappingJson {
    fn to_definition(
        &self,
        index: usize,
        warnings: &mut Vec<String>,
    ) -> Result<ChordDefinition, ConfigError> {
        let chord = self.chord.trim();
        if chord.is_empty() {
            return Err(ConfigError::EmptyChord(index));
        }
        let tokens = parse_chord(chord).map_err(|source| ConfigError::InvalidChord {
            index,
            chord: chord.to_string(),
            source,
        })?;

        let action = self.to_action(index, warnings)?;

        let mut definition = ChordDefinition::from_tokens(tokens, action)
            .map_err(|_| ConfigError::EmptyChord(index))?
            .with_enabled(self.enabled)
            .with_label(self.label.trim())
            .with_group(self.group.trim())
            .with_icon(self.icon.trim());
        if let Some(context) = self.context.as_deref().map(str::trim) {
            if !context.is_empty() {
                definition = definition.with_context(context);
            }
        }

        Ok(definition)
    }

    fn to_action(
        &self,
        index: usize,
        warnings: &mut Vec<String>,
    ) -> Result<ActionPayload, ConfigError> {
        let kind = match self.mapping_type.as_deref().map(str::trim) {
            None | Some("") => ActionKind::RunOperator,
            Some(value) => {
                ActionKind::from_str(value).map_err(|_| ConfigError::InvalidMappingType {
                    index,
                    value: value.to_string(),
                })?
            }
        };

        let payload = match kind {
            ActionKind::RunOperator => {
                let operator = required(&self.operator, index, "operator")?;
                let call_context = match self.call_context.as_deref().map(str::trim) {
                    None | Some("") => CallContext::default(),
                    Some(value) => CallContext::from_str(value).unwrap_or_else(|_| {
                        let warning = format!(
                            "Mapping #{} has unknown call_context '{}', using {}",
                            index,
                            value,
                            CallContext::default()
                        );
                        log::warn!("{}", warning);
                        warnings.push(warning);
                        CallContext::default()
                    }),
                };
                ActionPayload::RunOperator {
                    operator,
                    call_context,
                    kwargs: self.kwargs_object(index)?,
                }
            }
            ActionKind::RunScript => ActionPayload::RunScript {
                path: required(&self.python_file, index, "python_file")?,
                args: self.kwargs_object(index)?,
            },
            ActionKind::SetProperty => ActionPayload::SetProperty {
                path: required(&self.context_path, index, "context_path")?,
                value: self.property_value.trim().to_string(),
            },
            ActionKind::ToggleProperty => ActionPayload::ToggleProperty {
                path: required(&self.context_path, index, "context_path")?,
            },
        };

        Ok(payload)
    }

    fn kwargs_object(&self, index: usize) -> Result<Map<String, Value>, ConfigError> {
        match &self.kwargs {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(_) => Err(ConfigError::InvalidKwargs(index)),
        }
    }
}

impl From<&ChordDefinition> for MappingJson {
    fn from(def: &ChordDefinition) -> Self {
        let mut mapping = MappingJson {
            chord: def.chord(),
            enabled: def.enabled,
            label: def.label.clone(),
            group: def.group.clone(),
            icon: def.icon.clone(),
            context: Some(def.context.clone()),
            mapping_type: Some(def.action.kind().config_name().to_string()),
            ..MappingJson::default()
        };

        match &def.action {
            ActionPayload::RunOperator {
                operator,
                call_context,
                kwargs,
            } => {
                mapping.operator = operator.clone();
                mapping.call_context = Some(call_context.to_string());
                mapping.kwargs = Some(Value::Object(kwargs.clone()));
            }
            ActionPayload::RunScript { path, args } => {
                mapping.python_file = path.clone();
                if !args.is_empty() {
                    mapping.kwargs = Some(Value::Object(args.clone()));
                }
            }
            ActionPayload::SetProperty { path, value } => {
                mapping.context_path = path.clone();
                mapping.property_value = value.clone();
            }
            ActionPayload::ToggleProperty { path } => {
                mapping.context_path = path.clone();
            }
        }

        mapping
    }
}

fn required(value: &str, index: usize, field: &'static str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::MissingField { index, field });
    }
    Ok(value.to_string())
}

/// Check a timeout: 0 disables it, otherwise it must lie in the accepted range
pub fn validate_timeout(timeout_ms: u64) -> Result<u64, ConfigError> {
    if timeout_ms == 0 || (MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&timeout_ms) {
        Ok(timeout_ms)
    } else {
        Err(ConfigError::TimeoutOutOfRange(timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ALL_CONTEXTS;

    const SAMPLE: &str = r#"{
        "version": 1,
        "timeout_ms": 800,
        "overlay": { "enabled": true, "max_items": 20, "column_rows": 10, "font_size_body": 12 },
        "groups": [ { "name": "View", "icon": "" } ],
        "mappings": [
            { "chord": "g g", "label": "Frame All", "group": "View",
              "operator": "view3d.view_all", "call_context": "INVOKE_DEFAULT",
              "kwargs": { "center": true } },
            { "chord": "s n", "label": "Add Node", "mapping_type": "PYTHON_FILE",
              "python_file": "scripts/add_node.py", "context": "ALL" },
            { "chord": "o w", "mapping_type": "CONTEXT_TOGGLE",
              "context_path": "space_data.overlay.show_wireframes", "enabled": false },
            { "chord": "v s", "mapping_type": "CONTEXT_PROPERTY",
              "context_path": "tool_settings.use_snap", "property_value": "True" }
        ]
    }"#;

    #[test]
    fn test_config_from_sample_json() {
        let config = Config::from_json(SAMPLE).unwrap();
        assert_eq!(config.timeout_ms, 800);
        assert_eq!(config.leader_key, DEFAULT_LEADER_KEY);
        assert_eq!(config.overlay.max_items, 20);
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.definitions.len(), 4);
        assert!(config.warnings.is_empty());

        let frame = &config.definitions[0];
        assert_eq!(frame.chord(), "g g");
        assert_eq!(frame.context, DEFAULT_CONTEXT);
        match &frame.action {
            ActionPayload::RunOperator {
                operator,
                call_context,
                kwargs,
            } => {
                assert_eq!(operator, "view3d.view_all");
                assert_eq!(*call_context, CallContext::InvokeDefault);
                assert_eq!(kwargs.get("center"), Some(&Value::Bool(true)));
            }
            other => panic!("unexpected payload {:?}", other),
        }

        assert_eq!(config.definitions[1].context, ALL_CONTEXTS);
        assert_eq!(config.definitions[1].action.kind(), ActionKind::RunScript);
        assert!(!config.definitions[2].enabled);
        assert_eq!(
            config.definitions[3].action,
            ActionPayload::set_property("tool_settings.use_snap", "True")
        );
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(config.overlay.enabled);
        assert!(config.definitions.is_empty());
    }

    #[test]
    fn test_unknown_version_is_a_warning() {
        let config = Config::from_json(r#"{ "version": 7 }"#).unwrap();
        assert_eq!(config.warnings.len(), 1);
        assert!(config.warnings[0].contains("Unsupported config version"));
    }

    #[test]
    fn test_unknown_call_context_is_a_warning() {
        let config = Config::from_json(
            r#"{ "mappings": [
                { "chord": "a", "operator": "wm.save", "call_context": "LATER" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(config.warnings.len(), 1);
        assert_eq!(
            config.definitions[0].action,
            ActionPayload::operator("wm.save")
        );
    }

    #[test]
    fn test_invalid_json() {
        let result = Config::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::JsonParse(_))));
    }

    /// Parse one mapping entry on its own, as the loader does per item
    fn mapping_error(mapping: &str) -> ConfigError {
        let mapping: MappingJson = serde_json::from_str(mapping).unwrap();
        mapping.to_definition(0, &mut vec![]).unwrap_err()
    }

    #[test]
    fn test_unfinished_mappings_are_skipped() {
        // Shape written by the add-on right after "add mapping"
        let config = Config::from_json(
            r#"{
                "version": 1,
                "mappings": [
                    { "chord": "g g", "label": "Frame All", "operator": "view3d.view_all" },
                    { "chord": "", "label": "New Chord", "operator": "",
                      "mapping_type": "OPERATOR", "enabled": true },
                    { "chord": "a" },
                    { "chord": "t", "mapping_type": "CONTEXT_TOGGLE" },
                    { "chord": "m", "mapping_type": "MACRO" },
                    { "chord": "s", "operator": "wm.save_mainfile" }
                ]
            }"#,
        )
        .unwrap();

        let chords: Vec<String> = config.definitions.iter().map(|d| d.chord()).collect();
        assert_eq!(chords, vec!["g g", "s"]);
        assert_eq!(config.warnings.len(), 4);
        assert!(config.warnings[0].starts_with("Mapping #1 has an empty chord"));
        assert!(config.warnings[1].contains("'operator'"));
        assert!(config.warnings[2].contains("'context_path'"));
        assert!(config.warnings[3].contains("MACRO"));
        assert!(config.warnings.iter().all(|w| w.ends_with("skipping")));
    }

    #[test]
    fn test_mapping_errors() {
        assert!(matches!(
            mapping_error(r#"{ "chord": "  ", "operator": "wm.save" }"#),
            ConfigError::EmptyChord(0)
        ));
        assert!(matches!(
            mapping_error(r#"{ "chord": "a" }"#),
            ConfigError::MissingField {
                index: 0,
                field: "operator"
            }
        ));
        assert!(matches!(
            mapping_error(r#"{ "chord": "a", "mapping_type": "MACRO" }"#),
            ConfigError::InvalidMappingType { index: 0, .. }
        ));
        assert!(mapping_error(r#"{ "chord": "a" }"#).is_mapping_error());
        assert!(!ConfigError::InvalidKwargs(0).is_mapping_error());
        assert!(!ConfigError::TimeoutOutOfRange(5).is_mapping_error());
    }

    #[test]
    fn test_non_object_kwargs_rejected() {
        let result = Config::from_json(
            r#"{ "mappings": [ { "chord": "a", "operator": "wm.save", "kwargs": [1, 2] } ] }"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidKwargs(0))));
    }

    #[test]
    fn test_timeout_range() {
        assert_eq!(validate_timeout(0).unwrap(), 0);
        assert_eq!(validate_timeout(100).unwrap(), 100);
        assert_eq!(validate_timeout(10_000).unwrap(), 10_000);
        assert!(matches!(
            validate_timeout(50),
            Err(ConfigError::TimeoutOutOfRange(50))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "timeout_ms": 20000 }"#),
            Err(ConfigError::TimeoutOutOfRange(20000))
        ));
    }

    #[test]
    fn test_to_json_reloads_same_definitions() {
        let config = Config::from_json(SAMPLE).unwrap();
        let written = config.to_json().unwrap();
        let reloaded = Config::from_json(&written).unwrap();
        assert_eq!(reloaded.definitions, config.definitions);
        assert_eq!(reloaded.timeout_ms, config.timeout_ms);
        assert_eq!(reloaded.groups, config.groups);
    }
}

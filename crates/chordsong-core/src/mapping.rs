// Chordsong Mapping Structures
// ChordDefinition and the action payloads it carries

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::config::token_parser::{parse_chord, TokenParseError};
use crate::token::Token;

/// Context name used when a definition does not specify one
pub const DEFAULT_CONTEXT: &str = "VIEW_3D";

/// Context name of definitions active in every editor area
pub const ALL_CONTEXTS: &str = "ALL";

/// Operator id of the built-in recents list
///
/// Definitions bound to it are reached through the overlay footer rather
/// than listed as root candidates.
pub const RECENTS_OPERATOR: &str = "chordsong.recents";

/// How the host should call an operator
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallContext {
    #[default]
    ExecDefault,
    InvokeDefault,
    ExecRegionWin,
    InvokeRegionWin,
    ExecArea,
    InvokeArea,
    ExecScreen,
    InvokeScreen,
}

/// Discriminant of an [`ActionPayload`]
///
/// Parses both the engine names (`RUN_OPERATOR`) and the configuration
/// names (`OPERATOR`, `PYTHON_FILE`, `CONTEXT_PROPERTY`, `CONTEXT_TOGGLE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum ActionKind {
    #[strum(to_string = "RUN_OPERATOR", serialize = "OPERATOR")]
    RunOperator,
    #[strum(to_string = "RUN_SCRIPT", serialize = "PYTHON_FILE")]
    RunScript,
    #[strum(to_string = "SET_PROPERTY", serialize = "CONTEXT_PROPERTY")]
    SetProperty,
    #[strum(to_string = "TOGGLE_PROPERTY", serialize = "CONTEXT_TOGGLE")]
    ToggleProperty,
}

impl ActionKind {
    /// Name used for this kind in the configuration document
    pub fn config_name(self) -> &'static str {
        match self {
            ActionKind::RunOperator => "OPERATOR",
            ActionKind::RunScript => "PYTHON_FILE",
            ActionKind::SetProperty => "CONTEXT_PROPERTY",
            ActionKind::ToggleProperty => "CONTEXT_TOGGLE",
        }
    }
}

/// What a chord does once it matches
///
/// The matching engine treats this as opaque and only hands it to the
/// host's executor.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPayload {
    RunOperator {
        operator: String,
        call_context: CallContext,
        kwargs: Map<String, Value>,
    },
    RunScript {
        path: String,
        args: Map<String, Value>,
    },
    SetProperty {
        path: String,
        value: String,
    },
    ToggleProperty {
        path: String,
    },
}

impl ActionPayload {
    /// Operator call with default context and no arguments
    pub fn operator(operator: impl Into<String>) -> Self {
        ActionPayload::RunOperator {
            operator: operator.into(),
            call_context: CallContext::default(),
            kwargs: Map::new(),
        }
    }

    /// Script run with no arguments
    pub fn script(path: impl Into<String>) -> Self {
        ActionPayload::RunScript {
            path: path.into(),
            args: Map::new(),
        }
    }

    pub fn set_property(path: impl Into<String>, value: impl Into<String>) -> Self {
        ActionPayload::SetProperty {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn toggle_property(path: impl Into<String>) -> Self {
        ActionPayload::ToggleProperty { path: path.into() }
    }

    /// Get the kind of this payload
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::RunOperator { .. } => ActionKind::RunOperator,
            ActionPayload::RunScript { .. } => ActionKind::RunScript,
            ActionPayload::SetProperty { .. } => ActionKind::SetProperty,
            ActionPayload::ToggleProperty { .. } => ActionKind::ToggleProperty,
        }
    }

    /// Check if this payload opens the built-in recents list
    pub fn is_show_recents(&self) -> bool {
        matches!(self, ActionPayload::RunOperator { operator, .. } if operator == RECENTS_OPERATOR)
    }

    /// Short description used in logs and the CLI
    pub fn target(&self) -> &str {
        match self {
            ActionPayload::RunOperator { operator, .. } => operator,
            ActionPayload::RunScript { path, .. } => path,
            ActionPayload::SetProperty { path, .. } => path,
            ActionPayload::ToggleProperty { path } => path,
        }
    }
}

impl fmt::Display for ActionPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionPayload::SetProperty { path, value } => {
                write!(f, "{} {} = {}", self.kind(), path, value)
            }
            _ => write!(f, "{} {}", self.kind(), self.target()),
        }
    }
}

/// One configured chord mapping
///
/// The token sequence is never empty; it is validated when the definition
/// is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordDefinition {
    tokens: Vec<Token>,
    /// Disabled definitions never match
    pub enabled: bool,
    pub label: String,
    pub group: String,
    pub icon: String,
    /// Editor area the chord is active in (`ALL` for everywhere)
    pub context: String,
    pub action: ActionPayload,
}

impl ChordDefinition {
    /// Create a definition from a whitespace-separated chord string
    pub fn new(chord: &str, action: ActionPayload) -> Result<Self, TokenParseError> {
        Self::from_tokens(parse_chord(chord)?, action)
    }

    /// Create a definition from already validated tokens
    pub fn from_tokens(tokens: Vec<Token>, action: ActionPayload) -> Result<Self, TokenParseError> {
        if tokens.is_empty() {
            return Err(TokenParseError::EmptyChord);
        }
        Ok(Self {
            tokens,
            enabled: true,
            label: String::new(),
            group: String::new(),
            icon: String::new(),
            context: DEFAULT_CONTEXT.to_string(),
            action,
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Get the token sequence
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens in the chord
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The chord as a space-separated string
    pub fn chord(&self) -> String {
        self.tokens
            .iter()
            .map(Token::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Label to show for this definition, falling back to the action target
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            self.action.target()
        } else {
            &self.label
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_definition_from_chord_string() {
        let def = ChordDefinition::new("g  ^a", ActionPayload::operator("view3d.view_all"))
            .unwrap()
            .with_label("Frame All")
            .with_group("View");
        assert_eq!(def.len(), 2);
        assert_eq!(def.chord(), "g ^a");
        assert!(def.enabled);
        assert_eq!(def.context, DEFAULT_CONTEXT);
        assert_eq!(def.display_label(), "Frame All");
    }

    #[test]
    fn test_definition_rejects_empty_chord() {
        let result = ChordDefinition::new("   ", ActionPayload::operator("wm.save"));
        assert_eq!(result, Err(TokenParseError::EmptyChord));
        let result = ChordDefinition::from_tokens(vec![], ActionPayload::operator("wm.save"));
        assert_eq!(result, Err(TokenParseError::EmptyChord));
    }

    #[test]
    fn test_action_kind_names() {
        assert_eq!(ActionKind::RunOperator.to_string(), "RUN_OPERATOR");
        assert_eq!(ActionKind::from_str("PYTHON_FILE"), Ok(ActionKind::RunScript));
        assert_eq!(ActionKind::from_str("TOGGLE_PROPERTY"), Ok(ActionKind::ToggleProperty));
        assert!(ActionKind::from_str("MACRO").is_err());
        assert_eq!(ActionKind::SetProperty.config_name(), "CONTEXT_PROPERTY");
    }

    #[test]
    fn test_call_context_names() {
        assert_eq!(CallContext::default().to_string(), "EXEC_DEFAULT");
        assert_eq!(
            CallContext::from_str("INVOKE_REGION_WIN"),
            Ok(CallContext::InvokeRegionWin)
        );
    }

    #[test]
    fn test_payload_kind_and_recents() {
        assert!(ActionPayload::operator(RECENTS_OPERATOR).is_show_recents());
        assert!(!ActionPayload::operator("wm.save_mainfile").is_show_recents());
        assert!(!ActionPayload::script(RECENTS_OPERATOR).is_show_recents());

        let toggle = ActionPayload::toggle_property("space_data.overlay.show_wireframes");
        assert_eq!(toggle.kind(), ActionKind::ToggleProperty);
        assert_eq!(
            toggle.to_string(),
            "TOGGLE_PROPERTY space_data.overlay.show_wireframes"
        );
    }

    #[test]
    fn test_display_label_falls_back_to_target() {
        let def = ChordDefinition::new("s", ActionPayload::script("scripts/add_node.py")).unwrap();
        assert_eq!(def.display_label(), "scripts/add_node.py");
    }
}

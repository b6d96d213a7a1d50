// Chordsong Core Library
// Leader-key chord engine: tokens, definitions, capture and conflicts

pub mod combo;
pub mod config;
pub mod conflicts;
pub mod event;
pub mod key;
pub mod mapping;
pub mod modifier;
pub mod overlay;
pub mod phase;
pub mod settings;
pub mod state;
pub mod token;
pub mod transform;

pub use combo::Combo;
pub use config::{
    parse_chord, parse_token, split_chord, Config, ConfigError, OverlaySettings, TokenParseError,
};
pub use conflicts::{
    find_conflicts, has_conflict, suggest_chord, ConflictReport, DuplicateConflict, FixStrategy,
    PrefixConflict,
};
pub use event::{ActionExecutor, DeferredAction, ExecutionError, TaskQueue};
pub use key::{base_key_name, is_known_key};
pub use mapping::{
    ActionKind, ActionPayload, CallContext, ChordDefinition, ALL_CONTEXTS, DEFAULT_CONTEXT,
    RECENTS_OPERATOR,
};
pub use modifier::{is_modifier_key, Modifier, ModifierMark, ModifierSet, Side};
pub use overlay::{build_overlay, OverlayModel, OverlayRow};
pub use phase::KeyPhase;
pub use settings::{Settings, SettingsError};
pub use state::{ChordHistory, HistoryEntry, SharedHistory};
pub use token::{display_chord, display_token, normalize, KeyEvent, Token};
pub use transform::{
    candidates, find_exact, matches, Candidate, CaptureConfig, CaptureEngine, CaptureState,
    Outcome, Step,
};

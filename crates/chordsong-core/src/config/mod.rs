// Chordsong Config API
// Token parsing and the JSON chord document

pub mod parser;
pub mod token_parser;

pub use parser::{
    validate_timeout, Config, ConfigError, ConfigJson, GroupJson, MappingJson, OverlaySettings,
};
pub use token_parser::{parse_chord, parse_token, split_chord, TokenParseError};

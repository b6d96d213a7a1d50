// Chordsong Token Type
// Canonical chord tokens and the host key event normalizer

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::token_parser::{parse_token, TokenParseError};
use crate::key::base_key_name;
use crate::modifier::{Modifier, Side};
use crate::phase::KeyPhase;

/// One chord token, e.g. `g`, `^a`, `<!+f5`
///
/// Tokens produced by [`normalize`] are canonical. Tokens read from a
/// configuration may use aliases (`~`, `A`, `backtick`) and are only
/// guaranteed to decompose into a non-empty base key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token(String);

impl Token {
    /// Validate and wrap a token string
    pub fn new(s: impl Into<String>) -> Result<Self, TokenParseError> {
        let s = s.into();
        if s.chars().any(char::is_whitespace) {
            return Err(TokenParseError::Whitespace(s));
        }
        parse_token(&s)?;
        Ok(Token(s))
    }

    /// Get the raw token string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human readable form, e.g. `<^+a` -> `LCtrl+Shift+A`
    pub fn display(&self) -> String {
        display_token(&self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Token {
    type Err = TokenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Token::new(s)
    }
}

impl TryFrom<String> for Token {
    type Error = TokenParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Token::new(value)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A raw key event as delivered by the host
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// Host key identifier (`"A"`, `"F5"`, `"NUMPAD_5"`, `"LEFTMOUSE"`, ...)
    pub key_id: String,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub oskey: bool,
    /// Which physical modifier key is held, when the host can tell
    pub side: Option<Side>,
    pub phase: KeyPhase,
}

impl KeyEvent {
    /// A plain press of `key_id` with no modifiers held
    pub fn press(key_id: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_oskey(mut self) -> Self {
        self.oskey = true;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn with_phase(mut self, phase: KeyPhase) -> Self {
        self.phase = phase;
        self
    }

    /// Normalize this event into a chord token
    pub fn to_token(&self) -> Option<Token> {
        normalize(
            &self.key_id,
            self.shift,
            self.ctrl,
            self.alt,
            self.oskey,
            self.side,
        )
    }
}

/// Convert a host key press into a canonical chord token.
///
/// Returns `None` for pure modifier keys and for identifiers missing from
/// the key table. The prefix is rendered in the fixed order `#`, `^`, `!`,
/// `+`; when `side` is known each sided modifier gets a `<`/`>` marker.
pub fn normalize(
    key_id: &str,
    shift: bool,
    ctrl: bool,
    alt: bool,
    oskey: bool,
    side: Option<Side>,
) -> Option<Token> {
    let base = base_key_name(key_id)?;

    let mut token = String::with_capacity(base.len() + 8);
    let held = [
        (Modifier::OsKey, oskey),
        (Modifier::Ctrl, ctrl),
        (Modifier::Alt, alt),
        (Modifier::Shift, shift),
    ];
    for (modifier, pressed) in held {
        if !pressed {
            continue;
        }
        if let Some(side) = side.filter(|_| modifier.is_sided()) {
            token.push(side.marker());
        }
        token.push(modifier.symbol());
    }
    token.push_str(&base);

    Some(Token(token))
}

/// Human readable form of a token string
///
/// Falls back to the raw string when it cannot be decomposed.
pub fn display_token(token: &str) -> String {
    let Ok(combo) = parse_token(token) else {
        return token.to_string();
    };

    let mut parts: Vec<String> = combo
        .modifiers()
        .iter()
        .map(|mark| {
            let prefix = match mark.side {
                Some(Side::Left) => "L",
                Some(Side::Right) => "R",
                None => "",
            };
            format!("{}{}", prefix, mark.modifier.display_name())
        })
        .collect();

    let base = combo.base();
    let base = if base.len() == 1 {
        base.to_uppercase()
    } else {
        base.to_string()
    };
    parts.push(base);
    parts.join("+")
}

/// Human readable form of a whole chord, tokens separated by spaces
pub fn display_chord(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::display)
        .collect::<Vec<_>>()
        .join(" ")
}

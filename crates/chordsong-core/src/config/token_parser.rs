// Chordsong Config API - Token Parser
// Decomposes chord tokens like "<^+a" into modifiers and a base key

use crate::combo::Combo;
use crate::modifier::{Modifier, ModifierMark, ModifierSet, Side};
use crate::token::Token;

/// Errors that can occur during token parsing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenParseError {
    /// Empty input string
    #[error("token cannot be empty")]
    EmptyInput,
    /// A single token with embedded whitespace
    #[error("token cannot contain whitespace: '{0}'")]
    Whitespace(String),
    /// Chord string with no tokens at all
    #[error("chord cannot be empty")]
    EmptyChord,
}

/// Shifted punctuation and the unshifted key that produces it
const SHIFTED_PUNCTUATION: &[(&str, &str)] = &[
    ("<", ","),
    (">", "."),
    (":", ";"),
    ("\"", "'"),
    ("{", "["),
    ("}", "]"),
    ("?", "/"),
    ("|", "\\"),
];

/// Parse a token like "<^+a" into its modifier set and base key
///
/// Leading `<`/`>` + symbol pairs and bare symbols (`#^!+`) are collected as
/// modifiers for as long as something remains for the base key, so `+` on
/// its own or `^<` keep a literal base. Aliases on the base are resolved:
/// - `` ` `` and `backtick` mean `grave`, `~` means shift + `grave`
/// - shifted punctuation (`<`, `?`, `|`, ...) means shift + the unshifted key
/// - a single uppercase letter means shift + the lowercase letter
///
/// # Examples
/// ```
/// use chordsong_core::config::parse_token;
/// let combo = parse_token("+a").unwrap();
/// assert_eq!(combo.modifiers().len(), 1);
/// assert_eq!(combo.base(), "a");
/// ```
pub fn parse_token(token: &str) -> Result<Combo, TokenParseError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(TokenParseError::EmptyInput);
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let mut modifiers = ModifierSet::new();
    let mut i = 0;

    loop {
        let remaining = chars.len() - i;
        if remaining > 2 {
            if let (Some(side), Some(modifier)) =
                (Side::from_marker(chars[i]), Modifier::from_symbol(chars[i + 1]))
            {
                modifiers.insert(ModifierMark::sided(modifier, side));
                i += 2;
                continue;
            }
        }
        if remaining > 1 {
            if let Some(modifier) = Modifier::from_symbol(chars[i]) {
                modifiers.insert(ModifierMark::generic(modifier));
                i += 1;
                continue;
            }
        }
        break;
    }

    let raw_base: String = chars[i..].iter().collect();
    let (base, implied_shift) = resolve_base_alias(&raw_base);
    if implied_shift {
        modifiers.insert(ModifierMark::generic(Modifier::Shift));
    }

    Ok(Combo::new(modifiers.iter().copied(), base))
}

/// Resolve base-key aliases, returning the base and whether shift is implied
fn resolve_base_alias(base: &str) -> (String, bool) {
    match base {
        "`" | "backtick" => return ("grave".to_string(), false),
        "~" => return ("grave".to_string(), true),
        _ => {}
    }

    if let Some((_, unshifted)) = SHIFTED_PUNCTUATION.iter().find(|(shifted, _)| *shifted == base) {
        return (unshifted.to_string(), true);
    }

    let mut chars = base.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_uppercase() {
            return (c.to_ascii_lowercase().to_string(), true);
        }
    }

    (base.to_string(), false)
}

/// Split a chord string on whitespace into raw token strings
pub fn split_chord(chord: &str) -> Vec<&str> {
    chord.split_whitespace().collect()
}

/// Parse a whitespace-separated chord string into validated tokens
pub fn parse_chord(chord: &str) -> Result<Vec<Token>, TokenParseError> {
    let tokens = split_chord(chord)
        .into_iter()
        .map(Token::new)
        .collect::<Result<Vec<_>, _>>()?;
    if tokens.is_empty() {
        return Err(TokenParseError::EmptyChord);
    }
    Ok(tokens)
}

// Chordsong Transform Token Matching
// Decides whether a typed token satisfies a stored token

use crate::config::token_parser::parse_token;
use crate::token::Token;

/// Check if a typed token satisfies a stored token
///
/// Identical strings always match. Otherwise both sides are decomposed and
/// must share the same base key. A stored token without side markers
/// accepts either physical modifier key, so side tags are dropped from the
/// typed token before the modifier sets are compared. A stored token that
/// names a side requires exactly that side.
///
/// Tokens that fail to decompose never match anything but themselves.
pub fn matches(stored: &str, typed: &str) -> bool {
    if stored == typed {
        return true;
    }

    let (Ok(stored_combo), Ok(typed_combo)) = (parse_token(stored), parse_token(typed)) else {
        return false;
    };

    let matched = if stored_combo.modifiers().has_sided() {
        stored_combo == typed_combo
    } else {
        stored_combo == typed_combo.without_sides()
    };

    log::trace!("match '{}' against '{}': {}", stored, typed, matched);
    matched
}

/// Check if a typed token sequence matches the start of a stored sequence
///
/// Only the first `typed.len()` stored tokens are compared; a typed
/// sequence longer than the stored one never matches.
pub fn matches_sequence(stored: &[Token], typed: &[Token]) -> bool {
    if typed.len() > stored.len() {
        return false;
    }
    stored
        .iter()
        .zip(typed)
        .all(|(s, t)| matches(s.as_str(), t.as_str()))
}

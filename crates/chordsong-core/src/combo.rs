// Chordsong Combo Type
// A chord token decomposed into its modifier set and base key

use std::fmt;

use crate::modifier::{ModifierMark, ModifierSet};

/// Represents one decomposed token: a set of modifiers plus a base key
///
/// Equality is set equality on the modifiers, so `^+a` and `+^a` compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combo {
    modifiers: ModifierSet,
    base: String,
}

impl Combo {
    /// Create a new Combo from modifiers and a base key
    pub fn new(
        modifiers: impl IntoIterator<Item = ModifierMark>,
        base: impl Into<String>,
    ) -> Self {
        Self {
            modifiers: modifiers.into_iter().collect(),
            base: base.into(),
        }
    }

    /// Create a Combo with no modifiers
    pub fn plain(base: impl Into<String>) -> Self {
        Self {
            modifiers: ModifierSet::new(),
            base: base.into(),
        }
    }

    /// Get the modifiers for this combo
    pub fn modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    /// Get the base key for this combo
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The same combo with every side tag removed
    pub fn without_sides(&self) -> Self {
        Self {
            modifiers: self.modifiers.without_sides(),
            base: self.base.clone(),
        }
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.modifiers, self.base)
    }
}

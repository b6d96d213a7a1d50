// Chordsong Modifier System
// Chord token modifiers (OSKey, Ctrl, Alt, Shift) and their sides

use smallvec::SmallVec;
use std::fmt;

/// Represents a chord token modifier, such as Shift or Ctrl
///
/// The declaration order is the canonical rendering order of a token
/// prefix: OSKey, Ctrl, Alt, Shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    OsKey,
    Ctrl,
    Alt,
    Shift,
}

impl Modifier {
    /// All modifiers in canonical order
    pub const ALL: [Modifier; 4] = [
        Modifier::OsKey,
        Modifier::Ctrl,
        Modifier::Alt,
        Modifier::Shift,
    ];

    /// Token symbol for this modifier
    pub fn symbol(self) -> char {
        match self {
            Modifier::OsKey => '#',
            Modifier::Ctrl => '^',
            Modifier::Alt => '!',
            Modifier::Shift => '+',
        }
    }

    /// Get modifier by token symbol
    pub fn from_symbol(symbol: char) -> Option<Modifier> {
        match symbol {
            '#' => Some(Modifier::OsKey),
            '^' => Some(Modifier::Ctrl),
            '!' => Some(Modifier::Alt),
            '+' => Some(Modifier::Shift),
            _ => None,
        }
    }

    /// Whether a physical left/right variant exists for this modifier
    pub fn is_sided(self) -> bool {
        !matches!(self, Modifier::OsKey)
    }

    /// Human readable name, used by the display form of a chord
    pub fn display_name(self) -> &'static str {
        match self {
            Modifier::OsKey => "OSKey",
            Modifier::Ctrl => "Ctrl",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Which physical key of a modifier pair is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Token marker for this side
    pub fn marker(self) -> char {
        match self {
            Side::Left => '<',
            Side::Right => '>',
        }
    }

    /// Get side by token marker
    pub fn from_marker(marker: char) -> Option<Side> {
        match marker {
            '<' => Some(Side::Left),
            '>' => Some(Side::Right),
            _ => None,
        }
    }

    /// Parse the host's modifier side discriminator (`"LEFT"` / `"RIGHT"`)
    pub fn from_host(value: &str) -> Option<Side> {
        match value {
            "LEFT" => Some(Side::Left),
            "RIGHT" => Some(Side::Right),
            _ => None,
        }
    }
}

/// One modifier inside a token, optionally tagged with a side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModifierMark {
    pub modifier: Modifier,
    pub side: Option<Side>,
}

impl ModifierMark {
    /// A side-agnostic mark
    pub fn generic(modifier: Modifier) -> Self {
        Self {
            modifier,
            side: None,
        }
    }

    /// A mark bound to one physical key
    pub fn sided(modifier: Modifier, side: Side) -> Self {
        Self {
            modifier,
            side: Some(side),
        }
    }

    /// Whether this mark names a specific physical key
    pub fn is_specific(&self) -> bool {
        self.side.is_some()
    }

    /// The same modifier with its side tag removed
    pub fn without_side(&self) -> Self {
        Self::generic(self.modifier)
    }
}

impl fmt::Display for ModifierMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(side) = self.side {
            write!(f, "{}", side.marker())?;
        }
        write!(f, "{}", self.modifier.symbol())
    }
}

/// Sorted, de-duplicated set of modifier marks
///
/// Uses SmallVec since a token carries at most a handful of modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModifierSet {
    marks: SmallVec<[ModifierMark; 4]>,
}

impl ModifierSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mark, keeping the set sorted and unique
    pub fn insert(&mut self, mark: ModifierMark) {
        if let Err(pos) = self.marks.binary_search(&mark) {
            self.marks.insert(pos, mark);
        }
    }

    /// Check if a mark is present
    pub fn contains(&self, mark: &ModifierMark) -> bool {
        self.marks.binary_search(mark).is_ok()
    }

    /// Check if any mark carries a side tag
    pub fn has_sided(&self) -> bool {
        self.marks.iter().any(ModifierMark::is_specific)
    }

    /// The set with all side tags removed
    pub fn without_sides(&self) -> ModifierSet {
        self.marks.iter().map(ModifierMark::without_side).collect()
    }

    /// Iterate over the marks in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &ModifierMark> + '_ {
        self.marks.iter()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

impl FromIterator<ModifierMark> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = ModifierMark>>(iter: I) -> Self {
        let mut set = ModifierSet::new();
        for mark in iter {
            set.insert(mark);
        }
        set
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mark in &self.marks {
            write!(f, "{}", mark)?;
        }
        Ok(())
    }
}

/// Host identifiers of keys that are modifiers themselves
///
/// Pressing one of these never produces a chord token.
const MODIFIER_KEY_IDS: &[&str] = &[
    "LEFT_SHIFT",
    "RIGHT_SHIFT",
    "LEFT_CTRL",
    "RIGHT_CTRL",
    "LEFT_ALT",
    "RIGHT_ALT",
    "OSKEY",
];

/// Check if a host key identifier is a pure modifier key
#[inline]
pub fn is_modifier_key(key_id: &str) -> bool {
    MODIFIER_KEY_IDS.contains(&key_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_symbol_round_trip() {
        for modifier in Modifier::ALL {
            assert_eq!(Modifier::from_symbol(modifier.symbol()), Some(modifier));
        }
        assert_eq!(Modifier::from_symbol('a'), None);
        assert_eq!(Modifier::from_symbol('<'), None);
    }

    #[test]
    fn test_modifier_canonical_order() {
        let mut mods = vec![Modifier::Shift, Modifier::OsKey, Modifier::Alt, Modifier::Ctrl];
        mods.sort();
        assert_eq!(mods, Modifier::ALL.to_vec());
    }

    #[test]
    fn test_side_markers() {
        assert_eq!(Side::from_marker('<'), Some(Side::Left));
        assert_eq!(Side::from_marker('>'), Some(Side::Right));
        assert_eq!(Side::from_marker('^'), None);
        assert_eq!(Side::from_host("LEFT"), Some(Side::Left));
        assert_eq!(Side::from_host("RIGHT"), Some(Side::Right));
        assert_eq!(Side::from_host(""), None);
    }

    #[test]
    fn test_modifier_set_is_order_independent() {
        let a: ModifierSet = [
            ModifierMark::generic(Modifier::Shift),
            ModifierMark::generic(Modifier::Ctrl),
        ]
        .into_iter()
        .collect();
        let b: ModifierSet = [
            ModifierMark::generic(Modifier::Ctrl),
            ModifierMark::generic(Modifier::Shift),
            ModifierMark::generic(Modifier::Ctrl),
        ]
        .into_iter()
        .collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.to_string(), "^+");
    }

    #[test]
    fn test_modifier_set_without_sides() {
        let sided: ModifierSet = [ModifierMark::sided(Modifier::Ctrl, Side::Left)]
            .into_iter()
            .collect();
        assert!(sided.has_sided());
        assert_eq!(sided.to_string(), "<^");

        let generic = sided.without_sides();
        assert!(!generic.has_sided());
        assert!(generic.contains(&ModifierMark::generic(Modifier::Ctrl)));
    }

    #[test]
    fn test_is_modifier_key() {
        assert!(is_modifier_key("LEFT_SHIFT"));
        assert!(is_modifier_key("RIGHT_CTRL"));
        assert!(is_modifier_key("OSKEY"));

        assert!(!is_modifier_key("A"));
        assert!(!is_modifier_key("SPACE"));
    }
}

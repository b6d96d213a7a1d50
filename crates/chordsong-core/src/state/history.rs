// Chordsong Chord History
// Bounded, most-recent-first record of invoked chords

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::mapping::{ActionPayload, ChordDefinition};
use crate::token::Token;

/// Default capacity: 1-9, a-z, A-Z, digits and punctuation hotkeys
pub const DEFAULT_HISTORY_SIZE: usize = 88;

/// History handle shared between the capture engine and the host
pub type SharedHistory = Arc<RwLock<ChordHistory>>;

/// One invocation in the history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub chord: Vec<Token>,
    pub label: String,
    pub icon: String,
    pub action: ActionPayload,
}

impl HistoryEntry {
    pub fn from_definition(def: &ChordDefinition) -> Self {
        Self {
            chord: def.tokens().to_vec(),
            label: def.display_label().to_string(),
            icon: def.icon.clone(),
            action: def.action.clone(),
        }
    }

    /// Check if two entries run the same command
    ///
    /// Chord, label and operator call context are not part of the identity.
    pub fn same_command(&self, other: &HistoryEntry) -> bool {
        match (&self.action, &other.action) {
            (
                ActionPayload::RunOperator {
                    operator: a,
                    kwargs: ka,
                    ..
                },
                ActionPayload::RunOperator {
                    operator: b,
                    kwargs: kb,
                    ..
                },
            ) => a == b && ka == kb,
            (
                ActionPayload::RunScript { path: a, .. },
                ActionPayload::RunScript { path: b, .. },
            ) => a == b,
            (
                ActionPayload::SetProperty { path: a, value: va },
                ActionPayload::SetProperty { path: b, value: vb },
            ) => a == b && va == vb,
            (
                ActionPayload::ToggleProperty { path: a },
                ActionPayload::ToggleProperty { path: b },
            ) => a == b,
            _ => false,
        }
    }
}

/// Bounded history of chord invocations
#[derive(Debug, Clone)]
pub struct ChordHistory {
    entries: VecDeque<HistoryEntry>,
    max_size: usize,
}

impl Default for ChordHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl ChordHistory {
    /// Create an empty history holding at most `max_size` entries
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size.min(DEFAULT_HISTORY_SIZE)),
            max_size,
        }
    }

    /// Create a history handle for sharing
    pub fn shared(max_size: usize) -> SharedHistory {
        Arc::new(RwLock::new(Self::new(max_size)))
    }

    /// Record an invocation at the front
    ///
    /// Returns false when the entry repeats the most recent command and was
    /// not added.
    pub fn add(&mut self, entry: HistoryEntry) -> bool {
        if self.max_size == 0 {
            return false;
        }
        if self
            .entries
            .front()
            .is_some_and(|latest| latest.same_command(&entry))
        {
            return false;
        }
        self.entries.push_front(entry);
        self.entries.truncate(self.max_size);
        true
    }

    /// Get an entry by position, 0 being the most recent
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Iterate from most recent to oldest
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(chord: &str, action: ActionPayload) -> HistoryEntry {
        HistoryEntry::from_definition(&ChordDefinition::new(chord, action).unwrap())
    }

    #[test]
    fn test_most_recent_first() {
        let mut history = ChordHistory::default();
        history.add(entry("a", ActionPayload::operator("test.a")));
        history.add(entry("b", ActionPayload::operator("test.b")));
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0).unwrap().action, ActionPayload::operator("test.b"));
        assert_eq!(history.get(1).unwrap().action, ActionPayload::operator("test.a"));
        assert!(history.get(2).is_none());
    }

    #[test]
    fn test_consecutive_duplicates_skipped() {
        let mut history = ChordHistory::default();
        assert!(history.add(entry("a", ActionPayload::operator("test.a"))));
        // Same command through a different chord is still a duplicate
        assert!(!history.add(entry("x y", ActionPayload::operator("test.a"))));
        assert!(history.add(entry("b", ActionPayload::script("b.py"))));
        assert!(history.add(entry("a", ActionPayload::operator("test.a"))));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_bounded_size() {
        let mut history = ChordHistory::new(3);
        for i in 0..5 {
            history.add(entry("a", ActionPayload::operator(format!("test.{}", i))));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.get(0).unwrap().action, ActionPayload::operator("test.4"));
        assert_eq!(history.get(2).unwrap().action, ActionPayload::operator("test.2"));
    }

    #[test]
    fn test_zero_size_keeps_nothing() {
        let mut history = ChordHistory::new(0);
        assert!(!history.add(entry("a", ActionPayload::operator("test.a"))));
        assert!(history.is_empty());
    }

    #[test]
    fn test_same_command_identity() {
        let toggle = entry("t", ActionPayload::toggle_property("overlay.show_stats"));
        let same_toggle = entry("u", ActionPayload::toggle_property("overlay.show_stats"));
        let set_on = entry("s", ActionPayload::set_property("overlay.show_stats", "True"));
        let set_off = entry("s", ActionPayload::set_property("overlay.show_stats", "False"));
        assert!(toggle.same_command(&same_toggle));
        assert!(!toggle.same_command(&set_on));
        assert!(!set_on.same_command(&set_off));
    }

    #[test]
    fn test_shared_handle() {
        let shared = ChordHistory::shared(DEFAULT_HISTORY_SIZE);
        shared.write().add(entry("a", ActionPayload::operator("test.a")));
        assert_eq!(shared.read().len(), 1);
    }
}

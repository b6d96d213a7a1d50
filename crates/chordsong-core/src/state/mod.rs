// Chordsong State
// Session-independent state kept by the host

pub mod history;

pub use history::{ChordHistory, HistoryEntry, SharedHistory, DEFAULT_HISTORY_SIZE};

// Chordsong Transform Module
// Token matching, candidate resolution and the capture state machine

pub mod candidates;
pub mod engine;
pub mod matcher;

pub use candidates::{candidates, filter_by_context, find_exact, sort_for_display, Candidate};
pub use engine::{CaptureConfig, CaptureEngine, CaptureState, Outcome, Step, BACK_KEY, CANCEL_KEYS};
pub use matcher::{matches, matches_sequence};

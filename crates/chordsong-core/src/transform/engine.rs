// Chordsong Capture Engine
// Leader-key capture state machine
//
// After the leader key the engine buffers normalized tokens and, on every
// press, either completes a definition, narrows the candidate list, or
// aborts. Matched actions are never run from inside the engine: they are
// queued once the session has been torn down and the host drains the queue
// after its own event handler has returned.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::candidates::{candidates, filter_by_context, find_exact, Candidate};
use crate::config::parser::DEFAULT_TIMEOUT_MS;
use crate::event::queue::{DeferredAction, TaskQueue};
use crate::mapping::ChordDefinition;
use crate::state::history::{HistoryEntry, SharedHistory};
use crate::token::{KeyEvent, Token};

/// Host keys that abort a capture session
pub const CANCEL_KEYS: &[&str] = &["ESC", "RIGHTMOUSE"];

/// Host key that removes the last buffered token
pub const BACK_KEY: &str = "BACK_SPACE";

/// Coarse state of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Capturing,
}

/// How a capture session ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The buffer completed a definition; its action has been queued
    Executed(ChordDefinition),
    /// The buffer matched nothing
    AbortedUnknown(Vec<Token>),
    /// Cancel key, back key on an empty buffer, or host interruption
    AbortedCancelled,
    /// No input within the idle timeout
    AbortedTimeout,
}

impl Outcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, Outcome::Executed(_))
    }
}

/// Result of feeding one event to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Not capturing, not a press, or a key that produces no token
    Ignored,
    /// Still capturing; the candidates for the new buffer
    Continue(Vec<Candidate>),
    /// The session ended and the engine is idle again
    Finished(Outcome),
}

/// Configuration for the capture engine
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Idle timeout in milliseconds, 0 disables it
    pub timeout_ms: u64,
    /// Editor context; when set only definitions for it (or `ALL`) apply
    pub context: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            context: None,
        }
    }
}

/// State of one capture session
#[derive(Debug)]
struct Session {
    buffer: Vec<Token>,
    last_activity: Instant,
    /// Definitions snapshot taken when the session started
    definitions: Arc<[ChordDefinition]>,
}

/// Leader-key capture state machine
#[derive(Debug)]
pub struct CaptureEngine {
    definitions: Arc<[ChordDefinition]>,
    config: CaptureConfig,
    session: Option<Session>,
    queue: TaskQueue,
    history: Option<SharedHistory>,
}

impl CaptureEngine {
    /// Create a new idle engine over a definition list
    pub fn new(definitions: impl Into<Arc<[ChordDefinition]>>, config: CaptureConfig) -> Self {
        Self {
            definitions: definitions.into(),
            config,
            session: None,
            queue: TaskQueue::new(),
            history: None,
        }
    }

    /// Record executed chords into a shared history
    pub fn with_history(mut self, history: SharedHistory) -> Self {
        self.history = Some(history);
        self
    }

    /// Replace the definition list
    ///
    /// A running session keeps the snapshot it started with.
    pub fn set_definitions(&mut self, definitions: impl Into<Arc<[ChordDefinition]>>) {
        self.definitions = definitions.into();
        log::debug!("Definitions replaced: {}", self.definitions.len());
    }

    pub fn definitions(&self) -> &[ChordDefinition] {
        &self.definitions
    }

    pub fn set_timeout_ms(&mut self, timeout_ms: u64) {
        self.config.timeout_ms = timeout_ms;
    }

    pub fn set_context(&mut self, context: Option<String>) {
        self.config.context = context;
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> CaptureState {
        if self.session.is_some() {
            CaptureState::Capturing
        } else {
            CaptureState::Idle
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.session.is_some()
    }

    /// Tokens typed so far in the current session
    pub fn buffer(&self) -> &[Token] {
        self.session
            .as_ref()
            .map(|s| s.buffer.as_slice())
            .unwrap_or(&[])
    }

    /// Candidates for the current buffer, empty when idle
    pub fn current_candidates(&self) -> Vec<Candidate> {
        match &self.session {
            Some(session) => candidates(&session.definitions, &session.buffer),
            None => Vec::new(),
        }
    }

    /// Leader pressed: begin a new session with an empty buffer
    ///
    /// Calling this while already capturing restarts the session.
    pub fn start(&mut self, now: Instant) {
        let definitions: Arc<[ChordDefinition]> = match &self.config.context {
            Some(context) => filter_by_context(&self.definitions, context)
                .cloned()
                .collect::<Vec<_>>()
                .into(),
            None => Arc::clone(&self.definitions),
        };

        if self.session.is_some() {
            log::debug!("Capture restarted");
        } else {
            log::debug!("Capture started");
        }

        self.session = Some(Session {
            buffer: Vec::new(),
            last_activity: now,
            definitions,
        });
    }

    /// Process a single host event
    ///
    /// This is the main entry point while a session is running.
    pub fn process_event(&mut self, event: &KeyEvent, now: Instant) -> Step {
        let Some(session) = self.session.as_mut() else {
            return Step::Ignored;
        };
        if !event.phase.is_press() {
            return Step::Ignored;
        }

        if CANCEL_KEYS.contains(&event.key_id.as_str()) {
            return Step::Finished(self.finish(Outcome::AbortedCancelled));
        }

        if event.key_id == BACK_KEY {
            if session.buffer.pop().is_none() {
                return Step::Finished(self.finish(Outcome::AbortedCancelled));
            }
            session.last_activity = now;
            log::debug!("Back: {} tokens buffered", session.buffer.len());
            return Step::Continue(candidates(&session.definitions, &session.buffer));
        }

        let Some(token) = event.to_token() else {
            log::trace!("No token for '{}', ignoring", event.key_id);
            return Step::Ignored;
        };

        log::trace!("Token '{}'", token);
        session.buffer.push(token);
        session.last_activity = now;

        if let Some(def) = find_exact(&session.definitions, &session.buffer) {
            let def = def.clone();
            return Step::Finished(self.finish(Outcome::Executed(def)));
        }

        let next = candidates(&session.definitions, &session.buffer);
        if next.is_empty() {
            let buffer = session.buffer.clone();
            return Step::Finished(self.finish(Outcome::AbortedUnknown(buffer)));
        }
        Step::Continue(next)
    }

    /// Check the idle timeout
    ///
    /// Fires only when the time since the last accepted input is strictly
    /// greater than the timeout. A timeout of 0 never fires.
    pub fn tick(&mut self, now: Instant) -> Option<Outcome> {
        let session = self.session.as_ref()?;
        if self.config.timeout_ms == 0 {
            return None;
        }
        let idle = now.saturating_duration_since(session.last_activity);
        if idle > Duration::from_millis(self.config.timeout_ms) {
            return Some(self.finish(Outcome::AbortedTimeout));
        }
        None
    }

    /// Host-level interruption, same as a cancel key
    pub fn cancel(&mut self) -> Option<Outcome> {
        self.session.as_ref()?;
        Some(self.finish(Outcome::AbortedCancelled))
    }

    /// Queue of actions waiting for the host
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut TaskQueue {
        &mut self.queue
    }

    /// Take every queued action in order
    pub fn take_actions(&mut self) -> Vec<DeferredAction> {
        self.queue.drain().collect()
    }

    /// Tear the session down, then queue and record an executed definition
    fn finish(&mut self, outcome: Outcome) -> Outcome {
        self.session = None;

        match &outcome {
            Outcome::Executed(def) => {
                log::debug!("Chord '{}' -> {}", def.chord(), def.action);
                self.queue.push(DeferredAction::from_definition(def));
                if let Some(history) = &self.history {
                    if !def.action.is_show_recents() {
                        history.write().add(HistoryEntry::from_definition(def));
                    }
                }
            }
            Outcome::AbortedUnknown(buffer) => {
                let typed: Vec<&str> = buffer.iter().map(Token::as_str).collect();
                log::warn!("Unknown chord: \"{}\"", typed.join(" "));
            }
            Outcome::AbortedCancelled => log::debug!("Capture cancelled"),
            Outcome::AbortedTimeout => log::debug!("Capture timed out"),
        }

        outcome
    }
}

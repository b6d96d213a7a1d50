// Chordsong Deferred Action Queue
// Actions matched during capture, run after the capture session has ended

use std::collections::VecDeque;

use crate::mapping::{ActionPayload, ChordDefinition};
use crate::token::Token;

/// Errors reported by an action executor
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    #[error("Operator not found: {0}")]
    OperatorNotFound(String),

    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    #[error("Property path not found: {0}")]
    PropertyNotFound(String),

    #[error("Action failed: {0}")]
    Failed(String),
}

/// A matched action waiting to be executed
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredAction {
    /// Tokens that were typed to reach the action
    pub chord: Vec<Token>,
    pub label: String,
    pub action: ActionPayload,
}

impl DeferredAction {
    pub fn from_definition(def: &ChordDefinition) -> Self {
        Self {
            chord: def.tokens().to_vec(),
            label: def.display_label().to_string(),
            action: def.action.clone(),
        }
    }
}

/// Host side of action execution
///
/// The engine never calls this itself; the host drains the queue once its
/// own event handler has returned.
pub trait ActionExecutor {
    fn execute(&mut self, task: &DeferredAction) -> Result<(), ExecutionError>;
}

/// FIFO of deferred actions
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    tasks: VecDeque<DeferredAction>,
}

impl TaskQueue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action to the back of the queue
    pub fn push(&mut self, task: DeferredAction) {
        self.tasks.push_back(task);
    }

    /// Take the oldest action
    pub fn pop(&mut self) -> Option<DeferredAction> {
        self.tasks.pop_front()
    }

    /// Take every queued action in order
    pub fn drain(&mut self) -> impl Iterator<Item = DeferredAction> + '_ {
        self.tasks.drain(..)
    }

    /// Peek at the queued actions without removing them
    pub fn iter(&self) -> impl Iterator<Item = &DeferredAction> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drain the queue through an executor
    ///
    /// Failures are logged and dropped. Returns the number of actions that
    /// ran successfully.
    pub fn run(&mut self, executor: &mut dyn ActionExecutor) -> usize {
        let mut succeeded = 0;
        while let Some(task) = self.tasks.pop_front() {
            match executor.execute(&task) {
                Ok(()) => {
                    log::debug!("Executed '{}' ({})", task.label, task.action);
                    succeeded += 1;
                }
                Err(e) => {
                    log::warn!("Action '{}' failed: {}", task.label, e);
                }
            }
        }
        succeeded
    }
}

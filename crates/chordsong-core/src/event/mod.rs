// Chordsong Event Handling
// Deferred execution of matched actions

pub mod queue;

pub use queue::{ActionExecutor, DeferredAction, ExecutionError, TaskQueue};

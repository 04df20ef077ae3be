use thiserror::Error;
use uuid::Uuid;

use crate::tour::types::{Action, Status};

/// Every way a tour operation can be rejected.
///
/// Rejections never mutate the tour: the observable state after a failed
/// call is exactly the state before it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TourError {
    #[error("Step index {index} is out of range for a tour of {size} steps")]
    IndexOutOfRange { index: i64, size: usize },

    #[error("The run has ended with status {status} and cannot continue")]
    RunTerminated { status: Status },

    #[error("Run {run_id} is already running")]
    AlreadyRunning { run_id: Uuid },

    /// A host callback called back into the tour while an event was being delivered.
    #[error("Tour re-entered from inside its own callback")]
    Reentrancy,

    #[error("Target {target:?} for step {index} could not be found")]
    TargetNotFound { index: usize, target: String },

    #[error("The tour has not been started")]
    NotStarted,

    #[error("Action {action} requires a step index")]
    MissingIndex { action: Action },

    #[error("Action {action} is not a tooltip control")]
    InvalidControl { action: Action },

    #[error("A tour needs at least one step")]
    EmptyCatalog,
}

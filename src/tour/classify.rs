// Restart-vs-continue decision, kept pure so it can be tested in isolation

use crate::tour::errors::TourError;
use crate::tour::types::{Action, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunDecision {
    /// Stay in the current run; no new TOUR_START.
    Continue,
    /// Mint a new run and emit a fresh TOUR_START.
    Restart,
}

/// Decide whether moving from `previous_index` to `requested_index` continues
/// the current run or starts a new one.
///
/// `requested_index` is `None` when the action points past the last step of
/// a `size`-step catalog. Bounds are the caller's concern; an index given
/// here is already valid.
pub fn classify(
    previous_status: Status,
    previous_index: usize,
    requested_index: Option<usize>,
    requested_action: Action,
    size: usize,
) -> Result<RunDecision, TourError> {
    match (previous_status, requested_index) {
        (Status::Idle, _) => Err(TourError::NotStarted),
        (Status::Running, _) => Ok(RunDecision::Continue),
        (Status::Skipped, _) => Err(TourError::RunTerminated {
            status: previous_status,
        }),
        (Status::Paused | Status::Finished | Status::Error, Some(index)) => {
            tracing::debug!(
                status = %previous_status,
                from = previous_index,
                to = index,
                action = %requested_action,
                "Host-driven resume starts a new run"
            );
            Ok(RunDecision::Restart)
        }
        (Status::Paused, None) => Err(TourError::IndexOutOfRange {
            index: i64::try_from(size).unwrap_or(i64::MAX),
            size,
        }),
        (Status::Finished | Status::Error, None) => Err(TourError::RunTerminated {
            status: previous_status,
        }),
    }
}

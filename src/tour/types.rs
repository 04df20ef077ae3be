// Core types for the tour orchestrator: closed vocabularies plus the event record

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::catalog::StepDescriptor;
use crate::tour::TourError;

/// Why a transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Start,
    Stop,
    Next,
    Prev,
    Go,
    Update,
    Close,
    Skip,
    Reset,
}

impl Action {
    /// Actions that move between steps of the same run.
    pub fn is_navigation(self) -> bool {
        matches!(self, Action::Next | Action::Prev | Action::Go | Action::Close)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Next => "next",
            Action::Prev => "prev",
            Action::Go => "go",
            Action::Update => "update",
            Action::Close => "close",
            Action::Skip => "skip",
            Action::Reset => "reset",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of callback event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TourStart,
    StepBefore,
    Tooltip,
    StepAfter,
    TourStatus,
    TourEnd,
    Error,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::TourStart => "tour_start",
            EventType::StepBefore => "step_before",
            EventType::Tooltip => "tooltip",
            EventType::StepAfter => "step_after",
            EventType::TourStatus => "tour_status",
            EventType::TourEnd => "tour_end",
            EventType::Error => "error",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of the active step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Init,
    Ready,
    Tooltip,
    Complete,
    Error,
}

impl Lifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            Lifecycle::Init => "init",
            Lifecycle::Ready => "ready",
            Lifecycle::Tooltip => "tooltip",
            Lifecycle::Complete => "complete",
            Lifecycle::Error => "error",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tour-level condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// No run exists yet (or the tour was reset). Never reported in an event.
    Idle,
    Running,
    Paused,
    Skipped,
    Finished,
    Error,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Running => "running",
            Status::Paused => "paused",
            Status::Skipped => "skipped",
            Status::Finished => "finished",
            Status::Error => "error",
        }
    }

    /// FINISHED and SKIPPED runs accept no further navigation.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Finished | Status::Skipped)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One continuous execution of the tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourRun {
    pub id: Uuid,
    pub size: usize,
    pub continuous: bool,
}

impl TourRun {
    pub fn new(size: usize, continuous: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            size,
            continuous,
        }
    }
}

/// The record delivered to the host for every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub action: Action,
    pub index: usize,
    pub lifecycle: Lifecycle,
    pub status: Status,
    pub size: usize,
    pub step: StepDescriptor,
    pub run_id: Uuid,
    pub controlled: bool,
}

/// Point-in-time view of the controller, for hosts and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourSnapshot {
    pub run_id: Option<Uuid>,
    pub status: Status,
    pub index: usize,
    pub lifecycle: Lifecycle,
    pub size: usize,
    pub last_action: Option<Action>,
    pub pending_settle: bool,
    pub error: Option<TourError>,
}

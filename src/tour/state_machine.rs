// Step Lifecycle Machine - INIT -> READY -> TOOLTIP -> COMPLETE, with READY -> ERROR

use statig::prelude::*;

use crate::catalog::{StepCatalog, StepDescriptor};
use crate::tour::errors::TourError;
use crate::tour::types::{Action, Lifecycle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    /// Target resolution was attempted.
    Prepare,
    /// The target could not be found.
    Miss,
    /// The settle delay elapsed; show the tooltip.
    Settle,
    Complete { action: Action },
}

/// How the active step was completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCompletion {
    pub index: usize,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The step just reached COMPLETE.
    Completed(StepCompletion),
    /// The step was already complete; nothing changed.
    AlreadyCompleted(StepCompletion),
    /// The step is in a phase that cannot complete (INIT or ERROR).
    NotCompletable(Lifecycle),
}

#[derive(Debug, Default)]
pub struct StepPhases;

#[state_machine(initial = "State::init()", state(derive(Debug, Clone, PartialEq, Eq)))]
impl StepPhases {
    #[state]
    fn init(event: &StepEvent) -> Outcome<State> {
        match event {
            StepEvent::Prepare => Transition(State::ready()),
            _ => Handled,
        }
    }

    #[state]
    fn ready(event: &StepEvent) -> Outcome<State> {
        match event {
            StepEvent::Settle => Transition(State::tooltip()),
            StepEvent::Miss => Transition(State::error()),
            // Navigating away before the tooltip opened still completes the step.
            StepEvent::Complete { .. } => Transition(State::complete()),
            StepEvent::Prepare => Handled,
        }
    }

    #[state]
    fn tooltip(event: &StepEvent) -> Outcome<State> {
        match event {
            StepEvent::Complete { .. } => Transition(State::complete()),
            _ => Handled,
        }
    }

    #[state]
    fn complete(event: &StepEvent) -> Outcome<State> {
        tracing::trace!(?event, "Step already complete");
        Handled
    }

    #[state]
    fn error(event: &StepEvent) -> Outcome<State> {
        tracing::trace!(?event, "Step target missing");
        Handled
    }
}

/// Lifecycle of the single active step.
pub struct StepLifecycleMachine {
    machine: StateMachine<StepPhases>,
    index: usize,
    completion: Option<StepCompletion>,
}

impl std::fmt::Debug for StepLifecycleMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepLifecycleMachine")
            .field("index", &self.index)
            .field("lifecycle", &self.lifecycle())
            .field("completion", &self.completion)
            .finish()
    }
}

impl Default for StepLifecycleMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StepLifecycleMachine {
    pub fn new() -> Self {
        Self {
            machine: StepPhases.state_machine(),
            index: 0,
            completion: None,
        }
    }

    /// Make `index` the active step, starting over at INIT.
    pub fn enter<'c>(
        &mut self,
        catalog: &'c StepCatalog,
        index: usize,
    ) -> Result<&'c StepDescriptor, TourError> {
        let step = catalog.get(index)?;
        self.machine = StepPhases.state_machine();
        self.index = index;
        self.completion = None;
        tracing::trace!(index, "Step entered");
        Ok(step)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.machine.state() {
            State::Init { .. } => Lifecycle::Init,
            State::Ready { .. } => Lifecycle::Ready,
            State::Tooltip { .. } => Lifecycle::Tooltip,
            State::Complete { .. } => Lifecycle::Complete,
            State::Error { .. } => Lifecycle::Error,
        }
    }

    pub fn completion(&self) -> Option<StepCompletion> {
        self.completion
    }

    /// Feed one event; returns the new phase when it changed.
    fn fire(&mut self, event: StepEvent) -> Option<Lifecycle> {
        let before = self.lifecycle();
        self.machine.handle(&event);
        let after = self.lifecycle();
        (before != after).then_some(after)
    }

    pub fn prepare(&mut self) -> bool {
        self.fire(StepEvent::Prepare).is_some()
    }

    pub fn miss(&mut self) -> bool {
        self.fire(StepEvent::Miss).is_some()
    }

    pub fn settle(&mut self) -> bool {
        self.fire(StepEvent::Settle).is_some()
    }

    /// Complete the step. Calling this again before the next `enter` is a
    /// no-op that reports the first completion.
    pub fn complete(&mut self, action: Action) -> Completion {
        if let Some(done) = self.completion {
            return Completion::AlreadyCompleted(done);
        }
        match self.fire(StepEvent::Complete { action }) {
            Some(Lifecycle::Complete) => {
                let done = StepCompletion {
                    index: self.index,
                    action,
                };
                self.completion = Some(done);
                Completion::Completed(done)
            }
            _ => Completion::NotCompletable(self.lifecycle()),
        }
    }
}

// Tour Module - step orchestrator for guided walkthroughs
//
// The run controller decides every transition, the step lifecycle machine
// tracks the active step, and the emitter reports each committed transition
// to the host as one CallbackEvent.

pub mod types;
pub mod errors;
pub mod traits;
pub mod resolver;
pub mod state_machine;
pub mod timer;
pub mod classify;
pub mod emitter;
pub mod controller;
pub mod handle;

#[cfg(test)]
pub mod mocks;

#[cfg(test)]
pub mod tests;

pub use types::{Action, CallbackEvent, EventType, Lifecycle, Status, TourRun, TourSnapshot};
pub use errors::TourError;
pub use traits::{ElementHandle, TargetResolution, TargetResolver};
pub use resolver::StaticResolver;
pub use state_machine::{Completion, StepCompletion, StepLifecycleMachine};
pub use classify::{classify, RunDecision};
pub use emitter::{EventEmitter, HostMailbox, HostRequest, TransitionFacts};
pub use controller::TourController;
pub use handle::{Tour, WeakTour, REJECTED_CAPACITY};

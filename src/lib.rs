// Tourguide Library - step orchestrator for guided product tours
// This exposes the core components for hosts, testing and the binary

pub mod catalog;
pub mod cli;
pub mod config;
pub mod telemetry;
pub mod tour;

// Re-export key types for easy access
pub use catalog::{MissingTargetPolicy, Placement, StepCatalog, StepDescriptor, StepOverrides, TourOptions};
pub use config::{config, init_config, TourGuideConfig};
pub use telemetry::{create_tour_span, init_telemetry, shutdown_telemetry};
pub use tour::{
    classify, Action, CallbackEvent, ElementHandle, EventType, HostRequest, Lifecycle, RunDecision,
    StaticResolver, Status, TargetResolution, TargetResolver, Tour, TourController, TourError,
    TourRun, TourSnapshot, WeakTour, REJECTED_CAPACITY,
};

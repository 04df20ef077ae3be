// Step Catalog - immutable, ordered tour stops plus tour-wide options

pub mod types;

pub use types::{
    MissingTargetPolicy, Placement, StepCatalog, StepDescriptor, StepOverrides, TourOptions,
};

//! Entity type definitions
//!
//! The FMEDA data model is a small relational graph:
//!
//! - [`Project`] - the analysis root, carrying the operating lifetime
//! - [`SafetyFunction`] - a function whose hardware metrics are assessed
//! - [`Component`] - a part with a base failure rate, linked many-to-many to
//!   safety functions
//! - [`FailureMode`] - one failure mode of exactly one component, with its
//!   SPF/MPF classification and diagnostic coverage

pub mod component;
pub mod failure_mode;
pub mod project;
pub mod safety_function;

pub use component::{Component, ComponentPatch, NewComponent};
pub use failure_mode::{FailureMode, FailureModePatch, FailureModeRates, NewFailureMode};
pub use project::{Project, ProjectPatch};
pub use safety_function::{
    NewSafetyFunction, SafetyFunction, SafetyFunctionPatch, SafetyMetrics,
};

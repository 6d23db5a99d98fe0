//! Core module - identity, storage, workspace and configuration

pub mod config;
pub mod entity;
pub mod identity;
pub mod lenient;
pub mod store;
pub mod workspace;

pub use config::Config;
pub use entity::Entity;
pub use identity::{
    ComponentId, EntityKind, FailureModeId, IdCounters, IdParseError, ProjectId,
    SafetyFunctionId,
};
pub use store::{Dataset, Store, StoreError};
pub use workspace::{Workspace, WorkspaceError};

//! Entity trait - common interface for all entity types

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;

use crate::core::identity::EntityKind;

/// Common trait for all FMEDA entities
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity kind
    const KIND: EntityKind;

    /// The typed internal id of this entity kind
    type Id: Copy + Eq + Ord + Display;

    /// Get the entity's internal id
    fn id(&self) -> Self::Id;

    /// Get the user-facing label (external id, or name for projects)
    fn label(&self) -> &str;
}

//! Typed internal identifiers
//!
//! Every entity kind gets its own integer newtype so an id minted for one
//! kind can never be used to look up another, and so an internal id can never
//! be confused with an external string id (`sf_id`, `comp_id`). The newtypes
//! serialize as bare integers and parse back from their decimal form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The four kinds of entity held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    SafetyFunction,
    Component,
    FailureMode,
}

impl EntityKind {
    /// Human-readable name, used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::SafetyFunction => "safety function",
            EntityKind::Component => "component",
            EntityKind::FailureMode => "failure mode",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

macro_rules! internal_id {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw integer id
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Get the raw integer value
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| IdParseError::NotAnInteger {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

internal_id!(
    /// Internal id of a [`Project`](crate::entities::Project)
    ProjectId => EntityKind::Project
);
internal_id!(
    /// Internal id of a [`SafetyFunction`](crate::entities::SafetyFunction)
    SafetyFunctionId => EntityKind::SafetyFunction
);
internal_id!(
    /// Internal id of a [`Component`](crate::entities::Component)
    ComponentId => EntityKind::Component
);
internal_id!(
    /// Internal id of a [`FailureMode`](crate::entities::FailureMode)
    FailureModeId => EntityKind::FailureMode
);

/// Per-kind id counters
///
/// Each counter holds the next id to hand out. Ids are never reused while
/// the store is live; [`IdCounters::reset`] is only called on clear-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    pub project: u64,
    pub safety_function: u64,
    pub component: u64,
    pub failure_mode: u64,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            project: 1,
            safety_function: 1,
            component: 1,
            failure_mode: 1,
        }
    }
}

impl IdCounters {
    pub fn next_project(&mut self) -> ProjectId {
        ProjectId(Self::bump(&mut self.project))
    }

    pub fn next_safety_function(&mut self) -> SafetyFunctionId {
        SafetyFunctionId(Self::bump(&mut self.safety_function))
    }

    pub fn next_component(&mut self) -> ComponentId {
        ComponentId(Self::bump(&mut self.component))
    }

    pub fn next_failure_mode(&mut self) -> FailureModeId {
        FailureModeId(Self::bump(&mut self.failure_mode))
    }

    /// Restart every counter at 1
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn bump(counter: &mut u64) -> u64 {
        let id = *counter;
        *counter += 1;
        id
    }
}

/// Errors that can occur when parsing internal ids
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid {kind} id '{value}': expected a positive integer")]
    NotAnInteger { kind: EntityKind, value: String },
}

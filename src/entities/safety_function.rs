//! Safety function entity type - a function whose hardware metrics are assessed

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityKind, ProjectId, SafetyFunctionId};

/// Aggregated hardware metrics of a safety function
///
/// Rates are in FIT. `spfm` and `lfm` are fractions (multiply by 100 for a
/// percentage) and are not clamped. Only the aggregator writes these values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyMetrics {
    /// Residual fault rate (sum over related failure modes)
    #[serde(rename = "RF")]
    pub rf: f64,

    /// Latent multiple point fault rate
    #[serde(rename = "MPFL")]
    pub mpfl: f64,

    /// Detected multiple point fault rate
    #[serde(rename = "MPFD")]
    pub mpfd: f64,

    /// Multiple point hazardous failure probability over the lifetime
    #[serde(rename = "MPHF")]
    pub mphf: f64,

    /// Single point fault metric
    #[serde(rename = "SPFM")]
    pub spfm: f64,

    /// Latent fault metric
    #[serde(rename = "LFM")]
    pub lfm: f64,

    /// Sum of the failure rates of all related components
    pub safetyrelated: f64,

    /// Store revision these values were calculated at; `None` if never calculated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_at: Option<u64>,
}

/// A SafetyFunction entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyFunction {
    /// Internal id
    pub id: SafetyFunctionId,

    /// Owning project
    pub project: ProjectId,

    /// External, user-facing identifier (e.g. "SF-01")
    pub sf_id: String,

    /// What the function does
    #[serde(default)]
    pub description: String,

    /// Target integrity level, carried as an opaque label (e.g. "ASIL D")
    #[serde(default)]
    pub target_integrity_level: String,

    /// Derived metrics, written by the aggregator
    #[serde(default)]
    pub(crate) metrics: SafetyMetrics,
}

impl Entity for SafetyFunction {
    const KIND: EntityKind = EntityKind::SafetyFunction;
    type Id = SafetyFunctionId;

    fn id(&self) -> SafetyFunctionId {
        self.id
    }

    fn label(&self) -> &str {
        &self.sf_id
    }
}

impl SafetyFunction {
    pub fn new(id: SafetyFunctionId, input: NewSafetyFunction) -> Self {
        Self {
            id,
            project: input.project,
            sf_id: input.sf_id,
            description: input.description,
            target_integrity_level: input.target_integrity_level,
            metrics: SafetyMetrics::default(),
        }
    }

    /// Last aggregated metrics; may be stale, see [`crate::analysis`]
    pub fn metrics(&self) -> &SafetyMetrics {
        &self.metrics
    }

    /// Apply a partial update, replacing every field present in the patch
    pub fn apply(&mut self, patch: SafetyFunctionPatch) {
        if let Some(sf_id) = patch.sf_id {
            self.sf_id = sf_id;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(level) = patch.target_integrity_level {
            self.target_integrity_level = level;
        }
    }
}

/// Input for creating a safety function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSafetyFunction {
    pub project: ProjectId,
    pub sf_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_integrity_level: String,
}

/// Settable safety function fields; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyFunctionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sf_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_integrity_level: Option<String>,
}

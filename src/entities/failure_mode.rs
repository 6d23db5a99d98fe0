//! Failure mode entity type - one way a component can fail, with its diagnostics

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{ComponentId, EntityKind, FailureModeId};

/// Derived fault rates of a single failure mode, in FIT
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureModeRates {
    /// Residual fault rate (SPF portion not covered by the safety mechanism)
    #[serde(rename = "RF")]
    pub rf: f64,

    /// Latent multiple point fault rate
    #[serde(rename = "MPFL")]
    pub mpfl: f64,

    /// Detected multiple point fault rate
    #[serde(rename = "MPFD")]
    pub mpfd: f64,
}

/// A FailureMode entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureMode {
    /// Internal id
    pub id: FailureModeId,

    /// Owning component
    pub component: ComponentId,

    /// Failure mode description (e.g. "stuck-at output")
    #[serde(default)]
    pub description: String,

    /// Share of the component failure rate attributed to this mode, in FIT
    pub failure_rate_total: f64,

    /// Effect at system level
    #[serde(default)]
    pub system_level_effect: String,

    /// Single point failure flag
    #[serde(rename = "is_SPF", default)]
    pub is_spf: bool,

    /// Safety mechanism covering the single point fault
    #[serde(rename = "SPF_safety_mechanism", default)]
    pub spf_safety_mechanism: String,

    /// Diagnostic coverage of the SPF mechanism, percent
    #[serde(rename = "SPF_diagnostic_coverage", default)]
    pub spf_diagnostic_coverage: f64,

    /// Multiple point failure flag
    #[serde(rename = "is_MPF", default)]
    pub is_mpf: bool,

    /// Safety mechanism covering the latent fault
    #[serde(rename = "MPF_safety_mechanism", default)]
    pub mpf_safety_mechanism: String,

    /// Diagnostic coverage of the MPF mechanism, percent
    #[serde(rename = "MPF_diagnostic_coverage", default)]
    pub mpf_diagnostic_coverage: f64,

    /// Derived rates, refreshed on every write and every aggregation walk
    #[serde(default)]
    pub(crate) rates: FailureModeRates,
}

impl Entity for FailureMode {
    const KIND: EntityKind = EntityKind::FailureMode;
    type Id = FailureModeId;

    fn id(&self) -> FailureModeId {
        self.id
    }

    fn label(&self) -> &str {
        &self.description
    }
}

impl FailureMode {
    /// Build a failure mode; derived rates start at zero until the store
    /// recalculates them on insert
    pub fn new(id: FailureModeId, input: NewFailureMode) -> Self {
        Self {
            id,
            component: input.component,
            description: input.description,
            failure_rate_total: input.failure_rate_total,
            system_level_effect: input.system_level_effect,
            is_spf: input.is_spf,
            spf_safety_mechanism: input.spf_safety_mechanism,
            spf_diagnostic_coverage: input.spf_diagnostic_coverage,
            is_mpf: input.is_mpf,
            mpf_safety_mechanism: input.mpf_safety_mechanism,
            mpf_diagnostic_coverage: input.mpf_diagnostic_coverage,
            rates: FailureModeRates::default(),
        }
    }

    /// Current derived rates
    pub fn rates(&self) -> &FailureModeRates {
        &self.rates
    }

    /// Apply a partial update, replacing every field present in the patch
    ///
    /// Derived rates are not touched here; the store recomputes them.
    pub fn apply(&mut self, patch: FailureModePatch) {
        if let Some(component) = patch.component {
            self.component = component;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(rate) = patch.failure_rate_total {
            self.failure_rate_total = rate;
        }
        if let Some(effect) = patch.system_level_effect {
            self.system_level_effect = effect;
        }
        if let Some(flag) = patch.is_spf {
            self.is_spf = flag;
        }
        if let Some(mechanism) = patch.spf_safety_mechanism {
            self.spf_safety_mechanism = mechanism;
        }
        if let Some(dc) = patch.spf_diagnostic_coverage {
            self.spf_diagnostic_coverage = dc;
        }
        if let Some(flag) = patch.is_mpf {
            self.is_mpf = flag;
        }
        if let Some(mechanism) = patch.mpf_safety_mechanism {
            self.mpf_safety_mechanism = mechanism;
        }
        if let Some(dc) = patch.mpf_diagnostic_coverage {
            self.mpf_diagnostic_coverage = dc;
        }
    }
}

/// Input for creating a failure mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewFailureMode {
    pub component: ComponentId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub failure_rate_total: f64,
    #[serde(default)]
    pub system_level_effect: String,
    #[serde(default)]
    pub is_spf: bool,
    #[serde(default)]
    pub spf_safety_mechanism: String,
    #[serde(default)]
    pub spf_diagnostic_coverage: f64,
    #[serde(default)]
    pub is_mpf: bool,
    #[serde(default)]
    pub mpf_safety_mechanism: String,
    #[serde(default)]
    pub mpf_diagnostic_coverage: f64,
}

/// Settable failure mode fields; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureModePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_rate_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_level_effect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_spf: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spf_safety_mechanism: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spf_diagnostic_coverage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mpf: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpf_safety_mechanism: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpf_diagnostic_coverage: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_replaces_coverage_only() {
        let mut fm = FailureMode::new(
            FailureModeId::new(1),
            NewFailureMode {
                component: ComponentId::new(1),
                description: "Short circuit".to_string(),
                failure_rate_total: 600.0,
                is_spf: true,
                spf_diagnostic_coverage: 90.0,
                ..Default::default()
            },
        );
        fm.apply(FailureModePatch {
            spf_diagnostic_coverage: Some(99.0),
            ..Default::default()
        });
        assert_eq!(fm.spf_diagnostic_coverage, 99.0);
        assert_eq!(fm.failure_rate_total, 600.0);
        assert!(fm.is_spf);
    }

    #[test]
    fn test_flags_serialize_with_csv_column_names() {
        let fm = FailureMode::new(
            FailureModeId::new(2),
            NewFailureMode {
                component: ComponentId::new(1),
                is_mpf: true,
                ..Default::default()
            },
        );
        let yaml = serde_yml::to_string(&fm).unwrap();
        assert!(yaml.contains("is_MPF: true"));
        assert!(yaml.contains("MPF_diagnostic_coverage:"));
    }
}

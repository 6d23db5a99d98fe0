//! Component entity type - a hardware part with a base failure rate

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::entity::Entity;
use crate::core::identity::{ComponentId, EntityKind, ProjectId, SafetyFunctionId};

/// A Component entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Internal id
    pub id: ComponentId,

    /// Owning project
    pub project: ProjectId,

    /// External, user-facing identifier (e.g. "U12")
    pub comp_id: String,

    /// Component type (free text, e.g. "MCU", "resistor")
    #[serde(rename = "type", default)]
    pub component_type: String,

    /// Base failure rate in FIT
    pub failure_rate: f64,

    /// Whether the component is safety related
    #[serde(default)]
    pub is_safety_related: bool,

    /// Safety functions this component contributes to
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub related_sfs: BTreeSet<SafetyFunctionId>,
}

impl Entity for Component {
    const KIND: EntityKind = EntityKind::Component;
    type Id = ComponentId;

    fn id(&self) -> ComponentId {
        self.id
    }

    fn label(&self) -> &str {
        &self.comp_id
    }
}

impl Component {
    pub fn new(id: ComponentId, input: NewComponent) -> Self {
        Self {
            id,
            project: input.project,
            comp_id: input.comp_id,
            component_type: input.component_type,
            failure_rate: input.failure_rate,
            is_safety_related: input.is_safety_related,
            related_sfs: input.related_sfs,
        }
    }

    /// Whether this component contributes to the given safety function
    pub fn is_related_to(&self, sf: SafetyFunctionId) -> bool {
        self.related_sfs.contains(&sf)
    }

    /// Apply a partial update; a present `related_sfs` replaces the whole set
    pub fn apply(&mut self, patch: ComponentPatch) {
        if let Some(comp_id) = patch.comp_id {
            self.comp_id = comp_id;
        }
        if let Some(component_type) = patch.component_type {
            self.component_type = component_type;
        }
        if let Some(rate) = patch.failure_rate {
            self.failure_rate = rate;
        }
        if let Some(flag) = patch.is_safety_related {
            self.is_safety_related = flag;
        }
        if let Some(related) = patch.related_sfs {
            self.related_sfs = related;
        }
    }
}

/// Input for creating a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComponent {
    pub project: ProjectId,
    pub comp_id: String,
    #[serde(rename = "type", default)]
    pub component_type: String,
    #[serde(default)]
    pub failure_rate: f64,
    #[serde(default)]
    pub is_safety_related: bool,
    #[serde(default)]
    pub related_sfs: BTreeSet<SafetyFunctionId>,
}

/// Settable component fields; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comp_id: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_safety_related: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_sfs: Option<BTreeSet<SafetyFunctionId>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Component {
        Component::new(
            ComponentId::new(1),
            NewComponent {
                project: ProjectId::new(1),
                comp_id: "C1".to_string(),
                component_type: "MCU".to_string(),
                failure_rate: 1000.0,
                is_safety_related: true,
                related_sfs: [SafetyFunctionId::new(1), SafetyFunctionId::new(2)]
                    .into_iter()
                    .collect(),
            },
        )
    }

    #[test]
    fn test_related_sfs_patch_replaces_set() {
        let mut cmp = sample();
        cmp.apply(ComponentPatch {
            related_sfs: Some([SafetyFunctionId::new(3)].into_iter().collect()),
            ..Default::default()
        });
        assert!(!cmp.is_related_to(SafetyFunctionId::new(1)));
        assert!(cmp.is_related_to(SafetyFunctionId::new(3)));
        assert_eq!(cmp.related_sfs.len(), 1);
        assert_eq!(cmp.failure_rate, 1000.0);
    }

    #[test]
    fn test_type_field_serializes_as_type() {
        let yaml = serde_yml::to_string(&sample()).unwrap();
        assert!(yaml.contains("type: MCU"));
    }

    #[test]
    fn test_component_roundtrip_keeps_integer_links() {
        let cmp = sample();
        let json = serde_json::to_string(&cmp).unwrap();
        assert!(json.contains("\"related_sfs\":[1,2]"));
        let parsed: Component = serde_json::from_str(&json).unwrap();
        assert_eq!(cmp, parsed);
    }
}

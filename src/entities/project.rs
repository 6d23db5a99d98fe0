//! Project entity type - the root that owns every other entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityKind, ProjectId};

/// A Project - one FMEDA analysis with its operating lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Internal id
    pub id: ProjectId,

    /// Project name
    pub name: String,

    /// Operating lifetime in hours, used for MPHF
    pub lifetime: f64,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Last modification timestamp
    pub updated: DateTime<Utc>,
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;
    type Id = ProjectId;

    fn id(&self) -> ProjectId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Project {
    pub fn new(id: ProjectId, name: String, lifetime: f64) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            lifetime,
            created: now,
            updated: now,
        }
    }

    /// Apply a partial update, replacing every field present in the patch
    pub fn apply(&mut self, patch: ProjectPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(lifetime) = patch.lifetime {
            self.lifetime = lifetime;
        }
        self.updated = Utc::now();
    }
}

/// Settable project fields; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_replaces_present_fields_only() {
        let mut project = Project::new(ProjectId::new(1), "Brake ECU".to_string(), 1000.0);
        project.apply(ProjectPatch {
            lifetime: Some(8760.0),
            ..Default::default()
        });
        assert_eq!(project.name, "Brake ECU");
        assert_eq!(project.lifetime, 8760.0);
    }

    #[test]
    fn test_project_roundtrip() {
        let project = Project::new(ProjectId::new(3), "Steering".to_string(), 100000.0);
        let yaml = serde_yml::to_string(&project).unwrap();
        let parsed: Project = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(project, parsed);
    }
}

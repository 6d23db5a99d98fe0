//! Entity store - the single live project and everything it owns
//!
//! Entities are kept in per-kind ordered maps keyed by their typed internal
//! id. Ids come from per-kind counters that only go up while the store is
//! live. Every input mutation bumps [`Store::revision`]; aggregation does not.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::analysis::{aggregate, calculator, MetricResult, StoredResult};
use crate::core::identity::{
    ComponentId, EntityKind, FailureModeId, IdCounters, ProjectId, SafetyFunctionId,
};
use crate::entities::{
    Component, ComponentPatch, FailureMode, FailureModePatch, NewComponent, NewFailureMode,
    NewSafetyFunction, Project, ProjectPatch, SafetyFunction, SafetyFunctionPatch,
};

/// Errors raised by store operations
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    #[diagnostic(
        code(fmeda::store::not_found),
        help("run the matching `list` command to see existing ids")
    )]
    NotFound { kind: EntityKind, id: u64 },

    #[error("{kind} {id} belongs to project {actual}, not project {expected}")]
    #[diagnostic(code(fmeda::store::project_mismatch))]
    ProjectMismatch {
        kind: EntityKind,
        id: u64,
        expected: ProjectId,
        actual: ProjectId,
    },

    #[error("{kind} external id must not be blank")]
    #[diagnostic(
        code(fmeda::store::blank_id),
        help("related_sf_ids cannot carry an empty id, so pick a non-empty one")
    )]
    BlankExternalId { kind: EntityKind },
}

impl StoreError {
    fn not_found(kind: EntityKind, id: u64) -> Self {
        StoreError::NotFound { kind, id }
    }
}

/// External ids (`sf_id`, `comp_id`) must contain something besides whitespace
fn check_external_id(kind: EntityKind, external_id: &str) -> Result<(), StoreError> {
    if external_id.trim().is_empty() {
        return Err(StoreError::BlankExternalId { kind });
    }
    Ok(())
}

/// Serializable snapshot of a whole store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub counters: IdCounters,

    #[serde(default)]
    pub revision: u64,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub safety_functions: Vec<SafetyFunction>,

    #[serde(default)]
    pub components: Vec<Component>,

    #[serde(default)]
    pub failure_modes: Vec<FailureMode>,
}

/// In-memory entity store
#[derive(Debug, Clone, Default)]
pub struct Store {
    projects: BTreeMap<ProjectId, Project>,
    safety_functions: BTreeMap<SafetyFunctionId, SafetyFunction>,
    components: BTreeMap<ComponentId, Component>,
    failure_modes: BTreeMap<FailureModeId, FailureMode>,
    counters: IdCounters,
    revision: u64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the store holds no entities at all
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
            && self.safety_functions.is_empty()
            && self.components.is_empty()
            && self.failure_modes.is_empty()
    }

    /// Counter bumped on every input mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Remove every entity and restart all id counters at 1
    pub fn clear_all(&mut self) {
        self.projects.clear();
        self.safety_functions.clear();
        self.components.clear();
        self.failure_modes.clear();
        self.counters.reset();
        self.touch();
        tracing::debug!("store cleared");
    }

    // ---------------------------------------------------------------------
    // Projects
    // ---------------------------------------------------------------------

    /// Create a project, replacing everything currently in the store
    pub fn create_project(&mut self, name: impl Into<String>, lifetime: f64) -> &Project {
        self.clear_all();
        let id = self.counters.next_project();
        let project = Project::new(id, name.into(), lifetime);
        tracing::debug!(%id, name = %project.name, lifetime, "project created");
        self.projects.entry(id).or_insert(project)
    }

    pub fn project(&self, id: ProjectId) -> Result<&Project, StoreError> {
        self.projects
            .get(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Project, id.get()))
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> + '_ {
        self.projects.values()
    }

    /// The live project, if any
    pub fn current_project(&self) -> Option<&Project> {
        self.projects.values().next()
    }

    pub fn patch_project(
        &mut self,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<&Project, StoreError> {
        let project = self
            .projects
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Project, id.get()))?;
        project.apply(patch);
        self.touch();
        self.project(id)
    }

    /// Delete a project together with all of its safety functions,
    /// components and their failure modes
    pub fn delete_project(&mut self, id: ProjectId) -> Result<Project, StoreError> {
        let project = self
            .projects
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Project, id.get()))?;

        self.safety_functions.retain(|_, sf| sf.project != id);

        let removed: BTreeSet<ComponentId> = self
            .components
            .values()
            .filter(|c| c.project == id)
            .map(|c| c.id)
            .collect();
        self.components.retain(|_, c| c.project != id);
        self.failure_modes
            .retain(|_, fm| !removed.contains(&fm.component));

        self.touch();
        Ok(project)
    }

    fn require_project(&self, id: ProjectId) -> Result<(), StoreError> {
        self.project(id).map(|_| ())
    }

    // ---------------------------------------------------------------------
    // Safety functions
    // ---------------------------------------------------------------------

    pub fn safety_function(&self, id: SafetyFunctionId) -> Result<&SafetyFunction, StoreError> {
        self.safety_functions
            .get(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::SafetyFunction, id.get()))
    }

    /// List safety functions, optionally restricted to one project
    pub fn safety_functions(
        &self,
        project: Option<ProjectId>,
    ) -> impl Iterator<Item = &SafetyFunction> + '_ {
        self.safety_functions
            .values()
            .filter(move |sf| project.map_or(true, |p| sf.project == p))
    }

    /// Look up a safety function by its external id
    ///
    /// When several share the same `sf_id` the most recently created wins.
    pub fn find_safety_function(
        &self,
        project: ProjectId,
        sf_id: &str,
    ) -> Option<&SafetyFunction> {
        self.safety_functions
            .values()
            .rev()
            .find(|sf| sf.project == project && sf.sf_id == sf_id)
    }

    pub fn create_safety_function(
        &mut self,
        input: NewSafetyFunction,
    ) -> Result<&SafetyFunction, StoreError> {
        self.require_project(input.project)?;
        check_external_id(EntityKind::SafetyFunction, &input.sf_id)?;
        let id = self.counters.next_safety_function();
        let sf = SafetyFunction::new(id, input);
        tracing::debug!(%id, sf_id = %sf.sf_id, "safety function created");
        self.touch();
        Ok(self.safety_functions.entry(id).or_insert(sf))
    }

    pub fn patch_safety_function(
        &mut self,
        id: SafetyFunctionId,
        patch: SafetyFunctionPatch,
    ) -> Result<&SafetyFunction, StoreError> {
        if let Some(sf_id) = &patch.sf_id {
            check_external_id(EntityKind::SafetyFunction, sf_id)?;
        }
        let sf = self
            .safety_functions
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::SafetyFunction, id.get()))?;
        sf.apply(patch);
        self.touch();
        self.safety_function(id)
    }

    /// Delete a safety function and unlink it from every component
    pub fn delete_safety_function(
        &mut self,
        id: SafetyFunctionId,
    ) -> Result<SafetyFunction, StoreError> {
        let sf = self
            .safety_functions
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::SafetyFunction, id.get()))?;
        for component in self.components.values_mut() {
            component.related_sfs.remove(&id);
        }
        self.touch();
        Ok(sf)
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    pub fn component(&self, id: ComponentId) -> Result<&Component, StoreError> {
        self.components
            .get(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Component, id.get()))
    }

    /// List components, optionally restricted to one project
    pub fn components(&self, project: Option<ProjectId>) -> impl Iterator<Item = &Component> + '_ {
        self.components
            .values()
            .filter(move |c| project.map_or(true, |p| c.project == p))
    }

    /// Look up a component by its external id; the most recent one wins
    pub fn find_component(&self, project: ProjectId, comp_id: &str) -> Option<&Component> {
        self.components
            .values()
            .rev()
            .find(|c| c.project == project && c.comp_id == comp_id)
    }

    /// Every linked safety function must exist and belong to `project`
    fn check_related(
        &self,
        project: ProjectId,
        related: &BTreeSet<SafetyFunctionId>,
    ) -> Result<(), StoreError> {
        for &sf_id in related {
            let sf = self.safety_function(sf_id)?;
            if sf.project != project {
                return Err(StoreError::ProjectMismatch {
                    kind: EntityKind::SafetyFunction,
                    id: sf_id.get(),
                    expected: project,
                    actual: sf.project,
                });
            }
        }
        Ok(())
    }

    pub fn create_component(&mut self, input: NewComponent) -> Result<&Component, StoreError> {
        self.require_project(input.project)?;
        check_external_id(EntityKind::Component, &input.comp_id)?;
        self.check_related(input.project, &input.related_sfs)?;
        let id = self.counters.next_component();
        let component = Component::new(id, input);
        tracing::debug!(%id, comp_id = %component.comp_id, "component created");
        self.touch();
        Ok(self.components.entry(id).or_insert(component))
    }

    pub fn patch_component(
        &mut self,
        id: ComponentId,
        patch: ComponentPatch,
    ) -> Result<&Component, StoreError> {
        let project = self.component(id)?.project;
        if let Some(comp_id) = &patch.comp_id {
            check_external_id(EntityKind::Component, comp_id)?;
        }
        if let Some(related) = &patch.related_sfs {
            self.check_related(project, related)?;
        }
        let component = self
            .components
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Component, id.get()))?;
        component.apply(patch);
        self.touch();
        self.component(id)
    }

    /// Delete a component and all of its failure modes
    pub fn delete_component(&mut self, id: ComponentId) -> Result<Component, StoreError> {
        let component = self
            .components
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Component, id.get()))?;
        self.failure_modes.retain(|_, fm| fm.component != id);
        self.touch();
        Ok(component)
    }

    // ---------------------------------------------------------------------
    // Failure modes
    // ---------------------------------------------------------------------

    pub fn failure_mode(&self, id: FailureModeId) -> Result<&FailureMode, StoreError> {
        self.failure_modes
            .get(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::FailureMode, id.get()))
    }

    /// List failure modes, optionally restricted to one project through
    /// their owning component
    pub fn failure_modes(
        &self,
        project: Option<ProjectId>,
    ) -> impl Iterator<Item = &FailureMode> + '_ {
        self.failure_modes.values().filter(move |fm| match project {
            None => true,
            Some(p) => self
                .components
                .get(&fm.component)
                .is_some_and(|c| c.project == p),
        })
    }

    /// Failure modes owned by one component
    pub fn failure_modes_of(
        &self,
        component: ComponentId,
    ) -> impl Iterator<Item = &FailureMode> + '_ {
        self.failure_modes
            .values()
            .filter(move |fm| fm.component == component)
    }

    pub fn create_failure_mode(
        &mut self,
        input: NewFailureMode,
    ) -> Result<&FailureMode, StoreError> {
        self.component(input.component)?;
        let id = self.counters.next_failure_mode();
        let mut fm = FailureMode::new(id, input);
        calculator::refresh(&mut fm);
        tracing::debug!(%id, component = %fm.component, "failure mode created");
        self.touch();
        Ok(self.failure_modes.entry(id).or_insert(fm))
    }

    /// Patch a failure mode and recompute its derived rates
    ///
    /// Moving it to another component is allowed within the same project.
    pub fn patch_failure_mode(
        &mut self,
        id: FailureModeId,
        patch: FailureModePatch,
    ) -> Result<&FailureMode, StoreError> {
        let current = self.failure_mode(id)?.component;
        if let Some(target) = patch.component {
            let target_project = self.component(target)?.project;
            if let Ok(owner) = self.component(current) {
                if owner.project != target_project {
                    return Err(StoreError::ProjectMismatch {
                        kind: EntityKind::Component,
                        id: target.get(),
                        expected: owner.project,
                        actual: target_project,
                    });
                }
            }
        }
        let fm = self
            .failure_modes
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::FailureMode, id.get()))?;
        fm.apply(patch);
        calculator::refresh(fm);
        self.touch();
        self.failure_mode(id)
    }

    pub fn delete_failure_mode(&mut self, id: FailureModeId) -> Result<FailureMode, StoreError> {
        let fm = self
            .failure_modes
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::FailureMode, id.get()))?;
        self.touch();
        Ok(fm)
    }

    // ---------------------------------------------------------------------
    // Metrics
    // ---------------------------------------------------------------------

    /// Aggregate every safety function of a project and return fresh metrics
    pub fn calculate(&mut self, project: ProjectId) -> Result<Vec<MetricResult>, StoreError> {
        let lifetime = self.project(project)?.lifetime;
        let revision = self.revision;

        let Self {
            safety_functions,
            components,
            failure_modes,
            ..
        } = self;

        let mut results = Vec::new();
        for sf in safety_functions
            .values_mut()
            .filter(|sf| sf.project == project)
        {
            aggregate(
                sf,
                components.values(),
                failure_modes.values_mut(),
                lifetime,
                revision,
            );
            results.push(MetricResult::from_safety_function(sf));
        }

        tracing::debug!(%project, safety_functions = results.len(), revision, "calculated");
        Ok(results)
    }

    /// Last calculated metrics of every safety function, without recalculating
    pub fn stored_results(&self, project: ProjectId) -> Result<Vec<StoredResult>, StoreError> {
        self.require_project(project)?;
        Ok(self
            .safety_functions(Some(project))
            .map(|sf| StoredResult {
                result: MetricResult::from_safety_function(sf),
                stale: self.is_stale(sf),
            })
            .collect())
    }

    /// True when the metrics were never calculated, or predate the latest
    /// mutation of the store
    pub fn is_stale(&self, sf: &SafetyFunction) -> bool {
        sf.metrics()
            .calculated_at
            .map_or(true, |at| at < self.revision)
    }

    // ---------------------------------------------------------------------
    // Snapshots
    // ---------------------------------------------------------------------

    pub fn to_dataset(&self) -> Dataset {
        Dataset {
            counters: self.counters,
            revision: self.revision,
            projects: self.projects.values().cloned().collect(),
            safety_functions: self.safety_functions.values().cloned().collect(),
            components: self.components.values().cloned().collect(),
            failure_modes: self.failure_modes.values().cloned().collect(),
        }
    }

    /// Rebuild a store from a snapshot
    ///
    /// Counters are raised past the highest id present so a hand-edited
    /// snapshot can never cause an id to be handed out twice.
    pub fn from_dataset(dataset: Dataset) -> Self {
        let mut counters = dataset.counters;
        counters.project = counters
            .project
            .max(next_free(dataset.projects.iter().map(|p| p.id.get())));
        counters.safety_function = counters
            .safety_function
            .max(next_free(dataset.safety_functions.iter().map(|s| s.id.get())));
        counters.component = counters
            .component
            .max(next_free(dataset.components.iter().map(|c| c.id.get())));
        counters.failure_mode = counters
            .failure_mode
            .max(next_free(dataset.failure_modes.iter().map(|f| f.id.get())));

        Self {
            projects: dataset.projects.into_iter().map(|p| (p.id, p)).collect(),
            safety_functions: dataset
                .safety_functions
                .into_iter()
                .map(|s| (s.id, s))
                .collect(),
            components: dataset.components.into_iter().map(|c| (c.id, c)).collect(),
            failure_modes: dataset
                .failure_modes
                .into_iter()
                .map(|f| (f.id, f))
                .collect(),
            counters,
            revision: dataset.revision,
        }
    }
}

/// One past the highest id in `ids`, or 1 when there are none
fn next_free(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().map_or(1, |max| max + 1)
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay
//!
//! The in-memory view of every project, its component/task tree, its
//! baselines and its re-baseline history. Only [`MaterializedState::apply`]
//! mutates it, and every apply validates the operation first, so a batch
//! that fails part-way can be discarded by dropping the staged clone.

use std::collections::BTreeMap;
use thiserror::Error;
use zm_core::{
    Baseline, BaselineHistory, BaselineId, BaselineType, DomainError, Operation, Project,
    ProjectId, ProjectTree,
};

/// Error applying an operation to state
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApplyError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("project {project_id} is at version {actual}, expected {expected}")]
    VersionMismatch {
        project_id: ProjectId,
        expected: u64,
        actual: u64,
    },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Materialized state built from WAL operations
#[derive(Debug, Clone, Default)]
pub struct MaterializedState {
    projects: BTreeMap<ProjectId, Project>,
    trees: BTreeMap<ProjectId, ProjectTree>,
    baselines: BTreeMap<BaselineId, Baseline>,
    active: BTreeMap<(ProjectId, BaselineType), BaselineId>,
    history: Vec<BaselineHistory>,
}

impl MaterializedState {
    /// A project record, including soft-deleted ones
    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn tree(&self, id: &ProjectId) -> Option<&ProjectTree> {
        self.trees.get(id)
    }

    /// Whether the project has any tasks or components yet
    pub fn has_progress_data(&self, id: &ProjectId) -> bool {
        self.trees.get(id).is_some_and(|t| !t.is_empty())
    }

    pub fn baseline(&self, id: &BaselineId) -> Option<&Baseline> {
        self.baselines.get(id)
    }

    /// All baselines of a project, ordered by type then version
    pub fn baselines_of(&self, project_id: &ProjectId) -> Vec<&Baseline> {
        let mut out: Vec<&Baseline> = self
            .baselines
            .values()
            .filter(|b| &b.project_id == project_id)
            .collect();
        out.sort_by_key(|b| (b.baseline_type, b.version));
        out
    }

    /// Highest version of a (project, type), if any
    pub fn latest_baseline(
        &self,
        project_id: &ProjectId,
        baseline_type: BaselineType,
    ) -> Option<&Baseline> {
        self.baselines
            .values()
            .filter(|b| &b.project_id == project_id && b.baseline_type == baseline_type)
            .max_by_key(|b| b.version)
    }

    /// The baseline variance is measured against for a (project, type)
    pub fn active_baseline(
        &self,
        project_id: &ProjectId,
        baseline_type: BaselineType,
    ) -> Option<&Baseline> {
        match self.active.get(&(project_id.clone(), baseline_type)) {
            Some(id) => self.baselines.get(id),
            None => self.latest_baseline(project_id, baseline_type),
        }
    }

    /// Active baselines of every type that has one
    pub fn active_baselines(&self, project_id: &ProjectId) -> Vec<&Baseline> {
        BaselineType::ALL
            .iter()
            .filter_map(|t| self.active_baseline(project_id, *t))
            .collect()
    }

    /// Re-baseline history of a project, oldest first
    pub fn history_of(&self, project_id: &ProjectId) -> Vec<&BaselineHistory> {
        self.history
            .iter()
            .filter(|h| &h.project_id == project_id)
            .collect()
    }

    fn tree_mut(&mut self, id: &ProjectId) -> Result<&mut ProjectTree, ApplyError> {
        self.trees.get_mut(id).ok_or_else(|| ApplyError::NotFound {
            kind: "project",
            id: id.to_string(),
        })
    }

    fn project_mut(&mut self, id: &ProjectId) -> Result<&mut Project, ApplyError> {
        self.projects.get_mut(id).ok_or_else(|| ApplyError::NotFound {
            kind: "project",
            id: id.to_string(),
        })
    }

    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) -> Result<(), ApplyError> {
        match op {
            Operation::ProjectCreate { project } => {
                if self.projects.contains_key(&project.id) {
                    return Err(ApplyError::AlreadyExists {
                        kind: "project",
                        id: project.id.to_string(),
                    });
                }
                project.validate()?;
                self.trees
                    .insert(project.id.clone(), ProjectTree::new(project.id.clone()));
                self.projects.insert(project.id.clone(), project.clone());
            }

            Operation::ProjectDelete { id, at } => {
                let project = self.project_mut(id)?;
                project.deleted = true;
                project.updated_at = *at;
            }

            Operation::ComponentUpsert { component } => {
                let tree = self.tree_mut(&component.project_id)?;
                if tree.component(&component.id).is_some() {
                    tree.replace_component(component.clone())?;
                } else {
                    tree.insert_component(component.clone())?;
                }
            }

            Operation::ComponentReparent {
                project_id,
                id,
                parent_id,
            } => {
                self.tree_mut(project_id)?.reparent(id, parent_id.clone())?;
            }

            Operation::TaskUpsert { task } => {
                let tree = self.tree_mut(&task.project_id)?;
                if tree.task(&task.id).is_some() {
                    tree.replace_task(task.clone())?;
                } else {
                    tree.insert_task(task.clone())?;
                }
            }

            Operation::RollupApply {
                project_id,
                expected_version,
                progress_percent,
                cost,
                components,
                at,
            } => {
                let project = self.project_mut(project_id)?;
                if project.version() != *expected_version {
                    return Err(ApplyError::VersionMismatch {
                        project_id: project_id.clone(),
                        expected: *expected_version,
                        actual: project.version(),
                    });
                }
                project.apply_rollup(*progress_percent, *cost, *at);

                let tree = self.tree_mut(project_id)?;
                for values in components {
                    let mut component = tree
                        .component(&values.id)
                        .ok_or_else(|| DomainError::not_found("component", &values.id))?
                        .clone();
                    component.progress_percent = values.progress_percent;
                    component.cost = values.cost;
                    tree.replace_component(component)?;
                }
            }

            Operation::BaselineInsert { baseline } => {
                if self.baselines.contains_key(&baseline.id) {
                    return Err(ApplyError::AlreadyExists {
                        kind: "baseline",
                        id: baseline.id.to_string(),
                    });
                }
                if !self.projects.contains_key(&baseline.project_id) {
                    return Err(ApplyError::NotFound {
                        kind: "project",
                        id: baseline.project_id.to_string(),
                    });
                }
                if let Some(latest) =
                    self.latest_baseline(&baseline.project_id, baseline.baseline_type)
                {
                    if baseline.version <= latest.version {
                        return Err(ApplyError::AlreadyExists {
                            kind: "baseline version",
                            id: format!(
                                "{} {} v{}",
                                baseline.project_id, baseline.baseline_type, baseline.version
                            ),
                        });
                    }
                }
                baseline.plan.validate()?;
                self.baselines.insert(baseline.id.clone(), baseline.clone());
            }

            Operation::BaselineReplace { baseline } => {
                let existing = self.baselines.get(&baseline.id).ok_or_else(|| {
                    ApplyError::NotFound {
                        kind: "baseline",
                        id: baseline.id.to_string(),
                    }
                })?;
                if existing.project_id != baseline.project_id
                    || existing.baseline_type != baseline.baseline_type
                    || existing.version != baseline.version
                {
                    return Err(DomainError::validation(format!(
                        "baseline {} cannot change project, type or version",
                        baseline.id
                    ))
                    .into());
                }
                baseline.plan.validate()?;
                self.baselines.insert(baseline.id.clone(), baseline.clone());
            }

            Operation::BaselineActivate {
                project_id,
                baseline_type,
                baseline_id,
            } => {
                let baseline = self.baselines.get(baseline_id).ok_or_else(|| {
                    ApplyError::NotFound {
                        kind: "baseline",
                        id: baseline_id.to_string(),
                    }
                })?;
                if &baseline.project_id != project_id || baseline.baseline_type != *baseline_type
                {
                    return Err(DomainError::validation(format!(
                        "baseline {} is not a {} baseline of project {}",
                        baseline_id, baseline_type, project_id
                    ))
                    .into());
                }
                self.active
                    .insert((project_id.clone(), *baseline_type), baseline_id.clone());
            }

            Operation::HistoryAppend { history } => {
                if !self.baselines.contains_key(&history.baseline_id) {
                    return Err(ApplyError::NotFound {
                        kind: "baseline",
                        id: history.baseline_id.to_string(),
                    });
                }
                self.history.push(history.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

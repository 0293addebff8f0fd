// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress-store mutations and the project rollup
//!
//! Each mutation runs under the project lock: the change is applied to a
//! copy of the project tree, the rollup is computed on that copy, and the
//! mutation plus the rolled values are committed together.

use crate::error::EngineError;
use crate::runtime::{visible_project, Engine};
use chrono::NaiveDate;
use serde::Serialize;
use zm_core::error::{validate_amount, validate_percent};
use zm_core::event::{
    ComponentCostUpdated, ComponentProgressUpdated, RollupUpdated, TaskStatusChanged,
    VarianceUpdated,
};
use zm_core::{
    compute_rollup, compute_variance, Actor, Clock, Component, ComponentId, ComponentValues,
    DomainError, Event, EventMeta, IdGen, Operation, Priority, Project, ProjectId, ProjectStatus,
    ProjectTree, Publisher, RollupResult, RollupTrigger, Task, TaskId, TaskInput, TaskStatus,
    VarianceResult,
};

/// Fields for a new project
#[derive(Debug, Clone, Default)]
pub struct ProjectDraft {
    /// Generated when absent
    pub id: Option<ProjectId>,
    pub name: String,
    pub budget: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub priority: Priority,
    pub status: ProjectStatus,
}

/// Fields for a new component
#[derive(Debug, Clone, Default)]
pub struct ComponentDraft {
    pub id: Option<ComponentId>,
    pub name: String,
    pub parent_id: Option<ComponentId>,
    pub own_cost: f64,
    pub progress_percent: f64,
}

/// Fields for a new task
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub id: Option<TaskId>,
    pub name: String,
    pub component_id: Option<ComponentId>,
    pub priority: Priority,
    pub estimated_hours: Option<f64>,
    pub dependencies: Vec<TaskId>,
    pub conditional_tag: Option<String>,
    pub hidden: bool,
    pub progress_percent: f64,
}

/// What a rollup computed and what it emitted
#[derive(Debug, Clone, Serialize)]
pub struct RollupOutcome {
    pub rollup: RollupResult,
    /// Whether the change crossed the configured thresholds
    pub significant: bool,
    /// Variance recomputed against active baselines after a significant rollup
    pub variances: Vec<VarianceResult>,
}

/// A change staged against a project tree
struct Mutation<T> {
    value: T,
    trigger: RollupTrigger,
    ops: Vec<Operation>,
    events: Vec<Event>,
}

impl<T> Mutation<T> {
    fn new(value: T, trigger: RollupTrigger) -> Self {
        Self {
            value,
            trigger,
            ops: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl<P, C, I> Engine<P, C, I>
where
    P: Publisher,
    C: Clock,
    I: IdGen,
{
    pub async fn create_project(
        &self,
        actor: &Actor,
        draft: ProjectDraft,
    ) -> Result<Project, EngineError> {
        let id = draft
            .id
            .unwrap_or_else(|| ProjectId::new(self.id_gen.next("project")));
        let mut project = Project::new(
            id,
            actor.tenant_id.clone(),
            draft.name,
            actor.id.clone(),
            self.clock.now(),
        )
        .with_budget(draft.budget)
        .with_priority(draft.priority)
        .with_status(draft.status);
        project.start_date = draft.start_date;
        project.end_date = draft.end_date;
        project.validate()?;

        let _guard = self.lock_project(&project.id, "create_project").await?;
        // Same answer whoever owns the id, so other tenants' projects stay invisible
        if self.read(|state, _| state.project(&project.id).is_some()) {
            return Err(EngineError::Conflict(format!(
                "project id {} is unavailable",
                project.id
            )));
        }
        self.commit(
            "create_project",
            vec![Operation::ProjectCreate {
                project: project.clone(),
            }],
        )?;
        tracing::info!(project_id = %project.id, tenant_id = %project.tenant_id, "project created");
        Ok(project)
    }

    /// Soft-delete a project; it disappears from every query
    pub async fn delete_project(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
    ) -> Result<(), EngineError> {
        let _guard = self.lock_project(project_id, "delete_project").await?;
        self.read(|state, _| visible_project(state, actor, project_id).map(|_| ()))?;
        self.commit(
            "delete_project",
            vec![Operation::ProjectDelete {
                id: project_id.clone(),
                at: self.clock.now(),
            }],
        )?;
        tracing::info!(project_id = %project_id, "project deleted");
        Ok(())
    }

    pub async fn add_component(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        draft: ComponentDraft,
    ) -> Result<(Component, RollupOutcome), EngineError> {
        let id = draft
            .id
            .unwrap_or_else(|| ComponentId::new(self.id_gen.next("component")));
        self.mutate(actor, project_id, "add_component", |project, tree, _| {
            let mut component = Component::new(id, project.id.clone(), draft.name)
                .with_own_cost(draft.own_cost)
                .with_progress(draft.progress_percent);
            component.parent_id = draft.parent_id;
            tree.insert_component(component.clone())?;

            let mut m = Mutation::new(component.clone(), RollupTrigger::Component(component.id.clone()));
            m.ops.push(Operation::ComponentUpsert { component });
            Ok(m)
        })
        .await
    }

    /// Move a component under another parent, or to the root with `None`
    pub async fn reparent_component(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        component_id: &ComponentId,
        parent_id: Option<ComponentId>,
    ) -> Result<(Component, RollupOutcome), EngineError> {
        self.mutate(actor, project_id, "reparent_component", |project, tree, _| {
            let component = tree.reparent(component_id, parent_id.clone())?.clone();
            let mut m = Mutation::new(component, RollupTrigger::Component(component_id.clone()));
            m.ops.push(Operation::ComponentReparent {
                project_id: project.id.clone(),
                id: component_id.clone(),
                parent_id,
            });
            Ok(m)
        })
        .await
    }

    pub async fn add_task(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        draft: TaskDraft,
    ) -> Result<(Task, RollupOutcome), EngineError> {
        let id = draft
            .id
            .unwrap_or_else(|| TaskId::new(self.id_gen.next("task")));
        self.mutate(actor, project_id, "add_task", |project, tree, _| {
            let mut task = Task::new(id, project.id.clone(), draft.name)
                .with_priority(draft.priority)
                .with_dependencies(draft.dependencies);
            task.component_id = draft.component_id;
            task.estimated_hours = draft.estimated_hours;
            task.conditional_tag = draft.conditional_tag;
            task.hidden = draft.hidden;
            if draft.progress_percent > 0.0 {
                ensure_dependencies_done(tree, &task)?;
                task = task
                    .transition(TaskInput::Progress {
                        percent: draft.progress_percent,
                    })?
                    .0;
            }
            tree.insert_task(task.clone())?;

            let mut m = Mutation::new(task.clone(), RollupTrigger::Task(task.id.clone()));
            m.ops.push(Operation::TaskUpsert { task });
            Ok(m)
        })
        .await
    }

    pub async fn set_task_progress(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        task_id: &TaskId,
        percent: f64,
    ) -> Result<(Task, RollupOutcome), EngineError> {
        self.apply_task_input(actor, project_id, task_id, TaskInput::Progress { percent }, "set_task_progress")
            .await
    }

    /// Hold, cancel or resume a task
    pub async fn set_task_status(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        task_id: &TaskId,
        input: TaskInput,
    ) -> Result<(Task, RollupOutcome), EngineError> {
        if matches!(input, TaskInput::Progress { .. }) {
            return Err(EngineError::Validation(
                "task progress is set with set_task_progress".to_string(),
            ));
        }
        self.apply_task_input(actor, project_id, task_id, input, "set_task_status")
            .await
    }

    pub async fn set_task_actual_hours(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        task_id: &TaskId,
        hours: f64,
    ) -> Result<(Task, RollupOutcome), EngineError> {
        validate_amount("actual hours", hours)?;
        self.mutate(actor, project_id, "set_task_actual_hours", |_, tree, _| {
            let mut task = tree
                .task(task_id)
                .cloned()
                .ok_or_else(|| EngineError::not_found("task", task_id))?;
            task.actual_hours = hours;
            tree.replace_task(task.clone())?;

            let mut m = Mutation::new(task.clone(), RollupTrigger::Task(task_id.clone()));
            m.ops.push(Operation::TaskUpsert { task });
            Ok(m)
        })
        .await
    }

    /// Set manual progress on a component with no eligible tasks or children
    pub async fn set_component_progress(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        component_id: &ComponentId,
        percent: f64,
    ) -> Result<(Component, RollupOutcome), EngineError> {
        validate_percent("component progress", percent)?;
        self.mutate(actor, project_id, "set_component_progress", |project, tree, meta| {
            let mut component = tree
                .component(component_id)
                .cloned()
                .ok_or_else(|| EngineError::not_found("component", component_id))?;
            if tree.has_contributors(component_id) {
                return Err(EngineError::Validation(format!(
                    "progress of component {} is derived from its tasks and children",
                    component_id
                )));
            }
            let old = component.progress_percent;
            component = component.with_progress(percent);
            tree.replace_component(component.clone())?;

            let mut m = Mutation::new(component.clone(), RollupTrigger::Component(component_id.clone()));
            if old != percent {
                m.events.push(Event::ComponentProgressUpdated(ComponentProgressUpdated {
                    project_id: project.id.clone(),
                    component_id: component_id.clone(),
                    old_progress: old,
                    new_progress: percent,
                    meta: meta.clone(),
                }));
            }
            m.ops.push(Operation::ComponentUpsert { component });
            Ok(m)
        })
        .await
    }

    /// Set a component's own cost; its rolled cost follows in the same commit
    pub async fn set_component_cost(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        component_id: &ComponentId,
        own_cost: f64,
    ) -> Result<(Component, RollupOutcome), EngineError> {
        validate_amount("component cost", own_cost)?;
        self.mutate(actor, project_id, "set_component_cost", |project, tree, meta| {
            let mut component = tree
                .component(component_id)
                .cloned()
                .ok_or_else(|| EngineError::not_found("component", component_id))?;
            let old = component.own_cost;
            component.own_cost = own_cost;
            tree.replace_component(component.clone())?;

            let mut m = Mutation::new(component.clone(), RollupTrigger::Component(component_id.clone()));
            if old != own_cost {
                m.events.push(Event::ComponentCostUpdated(ComponentCostUpdated {
                    project_id: project.id.clone(),
                    component_id: component_id.clone(),
                    old_cost: old,
                    new_cost: own_cost,
                    meta: meta.clone(),
                }));
            }
            m.ops.push(Operation::ComponentUpsert { component });
            Ok(m)
        })
        .await
    }

    /// Recompute and persist a project's rollup without any other change
    pub async fn recompute_project_rollup(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        trigger: RollupTrigger,
    ) -> Result<RollupOutcome, EngineError> {
        let ((), outcome) = self
            .mutate(actor, project_id, "recompute_project_rollup", |_, _, _| {
                Ok(Mutation::new((), trigger))
            })
            .await?;
        Ok(outcome)
    }

    async fn apply_task_input(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        task_id: &TaskId,
        input: TaskInput,
        operation: &'static str,
    ) -> Result<(Task, RollupOutcome), EngineError> {
        self.mutate(actor, project_id, operation, |project, tree, meta| {
            let task = tree
                .task(task_id)
                .cloned()
                .ok_or_else(|| EngineError::not_found("task", task_id))?;
            let (next, change) = task.transition(input)?;

            if is_started(next.status) && !is_started(task.status) {
                ensure_dependencies_done(tree, &task)?;
            }
            tree.replace_task(next.clone())?;

            let mut m = Mutation::new(next.clone(), RollupTrigger::Task(task_id.clone()));
            if let Some(change) = change {
                m.events.push(Event::TaskStatusChanged(TaskStatusChanged {
                    project_id: project.id.clone(),
                    task_id: task_id.clone(),
                    component_id: next.component_id.clone(),
                    old_status: change.from,
                    new_status: change.to,
                    meta: meta.clone(),
                }));
            }
            m.ops.push(Operation::TaskUpsert { task: next });
            Ok(m)
        })
        .await
    }

    /// Stage a change on a copy of the tree, roll it up, commit both at once
    async fn mutate<T, F>(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        operation: &'static str,
        stage: F,
    ) -> Result<(T, RollupOutcome), EngineError>
    where
        F: FnOnce(&Project, &mut ProjectTree, &EventMeta) -> Result<Mutation<T>, EngineError>,
    {
        let guard = self.lock_project(project_id, operation).await?;

        let (project, mut tree) = self.read(|state, _| -> Result<_, EngineError> {
            let project = visible_project(state, actor, project_id)?.clone();
            let tree = state
                .tree(project_id)
                .cloned()
                .ok_or_else(|| EngineError::not_found("project", project_id))?;
            Ok((project, tree))
        })?;

        let meta = EventMeta::new(actor, self.clock.now());
        let Mutation {
            value,
            trigger,
            mut ops,
            mut events,
        } = stage(&project, &mut tree, &meta)?;

        let (apply, rollup_events, outcome) = self.plan_rollup(&project, &tree, trigger, &meta)?;
        ops.extend(apply);
        events.extend(rollup_events);

        if !ops.is_empty() {
            self.commit(operation, ops)?;
        }
        drop(guard);

        if outcome.significant {
            tracing::info!(
                project_id = %project_id,
                old_progress = outcome.rollup.old_progress,
                new_progress = outcome.rollup.new_progress,
                old_cost = outcome.rollup.old_cost,
                new_cost = outcome.rollup.new_cost,
                "rollup updated"
            );
        }
        self.publish_all(events);
        Ok((value, outcome))
    }

    /// Compute the rollup of a staged tree and what committing it implies
    fn plan_rollup(
        &self,
        project: &Project,
        tree: &ProjectTree,
        trigger: RollupTrigger,
        meta: &EventMeta,
    ) -> Result<(Option<Operation>, Vec<Event>, RollupOutcome), EngineError> {
        let policy = &self.config.rollup;
        let rollup = compute_rollup(project, tree, trigger, policy).map_err(|e| {
            if let DomainError::Consistency(msg) = &e {
                tracing::error!(project_id = %project.id, error = %msg, "rollup aborted");
            }
            EngineError::from(e)
        })?;
        let significant = rollup.has_significant_change(policy);

        let apply = rollup.changes_anything().then(|| Operation::RollupApply {
            project_id: project.id.clone(),
            expected_version: project.version(),
            progress_percent: rollup.new_progress,
            cost: rollup.new_cost,
            components: rollup
                .affected_components
                .iter()
                .filter_map(|id| {
                    rollup.components.get(id).map(|c| ComponentValues {
                        id: id.clone(),
                        progress_percent: c.progress_percent,
                        cost: c.cost,
                    })
                })
                .collect(),
            at: meta.timestamp,
        });

        let mut events = Vec::new();
        let mut variances = Vec::new();
        if significant {
            events.push(Event::RollupUpdated(RollupUpdated {
                project_id: project.id.clone(),
                trigger_kind: rollup.trigger.kind().to_string(),
                trigger_id: rollup.trigger.id().map(str::to_string),
                old_progress: rollup.old_progress,
                new_progress: rollup.new_progress,
                old_cost: rollup.old_cost,
                new_cost: rollup.new_cost,
                affected_component_ids: rollup.affected_components.clone(),
                meta: meta.clone(),
            }));

            if self.config.engine.variance_on_rollup {
                let mut rolled = project.clone();
                rolled.apply_rollup(rollup.new_progress, rollup.new_cost, meta.timestamp);
                let baselines = self.read(|state, _| {
                    state
                        .active_baselines(&project.id)
                        .into_iter()
                        .cloned()
                        .collect::<Vec<_>>()
                });
                let today = self.clock.today();
                for baseline in baselines {
                    let variance = compute_variance(
                        &rolled,
                        !tree.is_empty(),
                        &baseline,
                        today,
                        &self.config.health,
                    )?;
                    events.push(Event::VarianceUpdated(VarianceUpdated {
                        project_id: project.id.clone(),
                        baseline_id: baseline.id.clone(),
                        variance_data: variance.clone(),
                        meta: meta.clone(),
                    }));
                    variances.push(variance);
                }
            }
        }

        Ok((
            apply,
            events,
            RollupOutcome {
                rollup,
                significant,
                variances,
            },
        ))
    }
}

fn is_started(status: TaskStatus) -> bool {
    matches!(status, TaskStatus::InProgress | TaskStatus::Completed)
}

/// A task may only start once every dependency is completed
fn ensure_dependencies_done(tree: &ProjectTree, task: &Task) -> Result<(), EngineError> {
    if task.can_start(|dep| tree.task(dep).map(|t| t.status)) {
        Ok(())
    } else {
        Err(EngineError::Validation(format!(
            "task {} has unfinished dependencies",
            task.id
        )))
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;

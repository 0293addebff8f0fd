// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component/task tree of a single project
//!
//! Components live in an arena keyed by id with parent links. Every edge
//! added through [`ProjectTree::insert_component`] or
//! [`ProjectTree::reparent`] is checked with an ancestor walk, so the tree
//! stays acyclic.

use crate::component::Component;
use crate::error::DomainError;
use crate::id::{ComponentId, ProjectId, TaskId};
use crate::task::Task;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct ProjectTree {
    project_id: ProjectId,
    components: BTreeMap<ComponentId, Component>,
    tasks: BTreeMap<TaskId, Task>,
}

impl ProjectTree {
    pub fn new(project_id: impl Into<ProjectId>) -> Self {
        Self {
            project_id: project_id.into(),
            components: BTreeMap::new(),
            tasks: BTreeMap::new(),
        }
    }

    /// Build a tree from already-validated records
    pub fn from_parts(
        project_id: ProjectId,
        components: impl IntoIterator<Item = Component>,
        tasks: impl IntoIterator<Item = Task>,
    ) -> Self {
        Self {
            project_id,
            components: components.into_iter().map(|c| (c.id.clone(), c)).collect(),
            tasks: tasks.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.tasks.is_empty()
    }

    /// Components without a parent
    pub fn roots(&self) -> impl Iterator<Item = &Component> {
        self.components.values().filter(|c| c.parent_id.is_none())
    }

    pub fn children(&self, id: &ComponentId) -> impl Iterator<Item = &Component> + '_ {
        let id = id.clone();
        self.components
            .values()
            .filter(move |c| c.parent_id.as_ref() == Some(&id))
    }

    /// Tasks directly under a component, or directly under the project for `None`
    pub fn tasks_of<'a>(
        &'a self,
        component: Option<&'a ComponentId>,
    ) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks
            .values()
            .filter(move |t| t.component_id.as_ref() == component)
    }

    /// Whether a component has child components or tasks that count toward rollup
    pub fn has_contributors(&self, id: &ComponentId) -> bool {
        self.children(id).next().is_some()
            || self.tasks_of(Some(id)).any(|t| t.counts_toward_rollup())
    }

    /// Parent chain of a component, nearest first
    pub fn ancestors(&self, id: &ComponentId) -> Vec<ComponentId> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = self.components.get(id).and_then(|c| c.parent_id.clone());
        while let Some(parent) = current {
            if !seen.insert(parent.clone()) {
                break;
            }
            current = self.components.get(&parent).and_then(|c| c.parent_id.clone());
            chain.push(parent);
        }
        chain
    }

    /// Components ordered so that every child precedes its parent.
    ///
    /// Only components reachable from a root are visited.
    pub fn post_order(&self) -> Vec<ComponentId> {
        let mut order = Vec::with_capacity(self.components.len());
        let mut stack: Vec<(ComponentId, bool)> =
            self.roots().map(|c| (c.id.clone(), false)).collect();
        stack.reverse();

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id.clone(), true));
            let mut children: Vec<ComponentId> = self.children(&id).map(|c| c.id.clone()).collect();
            children.reverse();
            stack.extend(children.into_iter().map(|c| (c, false)));
        }
        order
    }

    /// Add a new component, validating its parent link
    pub fn insert_component(&mut self, component: Component) -> Result<(), DomainError> {
        component.validate()?;
        if component.project_id != self.project_id {
            return Err(DomainError::validation(format!(
                "component {} belongs to project {}, not {}",
                component.id, component.project_id, self.project_id
            )));
        }
        if self.components.contains_key(&component.id) {
            return Err(DomainError::validation(format!(
                "component {} already exists",
                component.id
            )));
        }
        if let Some(parent) = &component.parent_id {
            self.check_parent(&component.id, parent)?;
        }
        self.components.insert(component.id.clone(), component);
        Ok(())
    }

    /// Move a component under a new parent (or to the root for `None`)
    pub fn reparent(
        &mut self,
        id: &ComponentId,
        parent: Option<ComponentId>,
    ) -> Result<&Component, DomainError> {
        if !self.components.contains_key(id) {
            return Err(DomainError::not_found("component", id));
        }
        if let Some(parent) = &parent {
            self.check_parent(id, parent)?;
        }
        let component = self
            .components
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("component", id))?;
        component.parent_id = parent;
        Ok(component)
    }

    /// Replace a component record in place (progress, cost, name)
    pub fn replace_component(&mut self, component: Component) -> Result<(), DomainError> {
        match self.components.get(&component.id) {
            Some(existing) if existing.parent_id == component.parent_id => {
                component.validate()?;
                self.components.insert(component.id.clone(), component);
                Ok(())
            }
            Some(_) => Err(DomainError::validation(format!(
                "component {} must be moved with reparent",
                component.id
            ))),
            None => Err(DomainError::not_found("component", &component.id)),
        }
    }

    /// Add a new task, validating its component and dependencies
    pub fn insert_task(&mut self, task: Task) -> Result<(), DomainError> {
        if self.tasks.contains_key(&task.id) {
            return Err(DomainError::validation(format!(
                "task {} already exists",
                task.id
            )));
        }
        self.check_task(&task)?;
        self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    /// Replace an existing task record
    pub fn replace_task(&mut self, task: Task) -> Result<(), DomainError> {
        if !self.tasks.contains_key(&task.id) {
            return Err(DomainError::not_found("task", &task.id));
        }
        self.check_task(&task)?;
        self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    fn check_task(&self, task: &Task) -> Result<(), DomainError> {
        task.validate()?;
        if task.project_id != self.project_id {
            return Err(DomainError::validation(format!(
                "task {} belongs to project {}, not {}",
                task.id, task.project_id, self.project_id
            )));
        }
        if let Some(component) = &task.component_id {
            if !self.components.contains_key(component) {
                return Err(DomainError::not_found("component", component));
            }
        }
        for dep in &task.dependencies {
            if !self.tasks.contains_key(dep) {
                return Err(DomainError::validation(format!(
                    "task {} depends on unknown task {}",
                    task.id, dep
                )));
            }
        }
        Ok(())
    }

    fn check_parent(&self, id: &ComponentId, parent: &ComponentId) -> Result<(), DomainError> {
        if !self.components.contains_key(parent) {
            return Err(DomainError::not_found("component", parent));
        }
        if parent == id || self.ancestors(parent).contains(id) {
            return Err(DomainError::validation(format!(
                "moving component {} under {} would create a cycle",
                id, parent
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "hierarchy_tests.rs"]
mod tests;

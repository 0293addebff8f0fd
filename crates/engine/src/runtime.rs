// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine that serializes mutations and publishes their events
//!
//! Every write goes through the same shape: take the relevant lock, read a
//! snapshot of state, compute the full batch of operations and events,
//! commit the batch as one WAL entry, release the lock, then publish.
//! Readers never take the async locks; they see the last committed state.

use crate::error::EngineError;
use crate::locks::{LockGuard, LockTable};
use std::sync::{Arc, RwLock};
use zm_core::{
    Actor, Baseline, BaselineId, BaselineType, Clock, EngineConfig, Event, IdGen, Operation,
    Project, ProjectId, ProjectTree, Publisher,
};
use zm_storage::{MaterializedState, Store};

/// Storage and delivery dependencies of the engine
pub struct EngineDeps<P> {
    pub store: Arc<RwLock<Store>>,
    pub publisher: P,
}

impl<P> EngineDeps<P> {
    pub fn new(store: Store, publisher: P) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            publisher,
        }
    }
}

/// Progress, baseline and variance engine
pub struct Engine<P, C: Clock, I: IdGen> {
    pub(crate) store: Arc<RwLock<Store>>,
    pub(crate) publisher: P,
    pub(crate) config: EngineConfig,
    pub(crate) clock: C,
    pub(crate) id_gen: I,
    /// Serializes progress mutations and rollups, per project
    project_locks: LockTable<ProjectId>,
    /// Serializes version assignment, per (project, baseline type)
    baseline_locks: LockTable<(ProjectId, BaselineType)>,
}

impl<P, C, I> Engine<P, C, I>
where
    P: Publisher,
    C: Clock,
    I: IdGen,
{
    pub fn new(deps: EngineDeps<P>, config: EngineConfig, clock: C, id_gen: I) -> Self {
        Self {
            store: deps.store,
            publisher: deps.publisher,
            config,
            clock,
            id_gen,
            project_locks: LockTable::new(),
            baseline_locks: LockTable::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Sequence number of the last committed WAL entry
    pub fn sequence(&self) -> u64 {
        self.read(|_, store_sequence| store_sequence)
    }

    pub fn get_project(&self, actor: &Actor, project_id: &ProjectId) -> Result<Project, EngineError> {
        self.read(|state, _| visible_project(state, actor, project_id).cloned())
    }

    /// Projects of the actor's tenant, excluding deleted ones
    pub fn list_projects(&self, actor: &Actor) -> Vec<Project> {
        self.read(|state, _| {
            state
                .projects()
                .filter(|p| p.is_visible_to(&actor.tenant_id))
                .cloned()
                .collect()
        })
    }

    pub fn project_tree(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
    ) -> Result<ProjectTree, EngineError> {
        self.read(|state, _| -> Result<_, EngineError> {
            visible_project(state, actor, project_id)?;
            state
                .tree(project_id)
                .cloned()
                .ok_or_else(|| EngineError::not_found("project", project_id))
        })
    }

    /// Run `f` against the committed state
    pub(crate) fn read<R>(&self, f: impl FnOnce(&MaterializedState, u64) -> R) -> R {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        f(store.state(), store.sequence())
    }

    /// Commit one batch as a single WAL entry
    pub(crate) fn commit(&self, operation: &'static str, ops: Vec<Operation>) -> Result<u64, EngineError> {
        let count = ops.len();
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        match store.commit(ops) {
            Ok(seq) => {
                tracing::debug!(operation, seq, ops = count, "committed");
                Ok(seq)
            }
            Err(e) => {
                tracing::warn!(operation, error = %e, "commit rejected");
                Err(e.into())
            }
        }
    }

    /// Deliver events in order; only ever called after a successful commit
    pub(crate) fn publish_all(&self, events: Vec<Event>) {
        for event in events {
            tracing::info!(event = %event.log_summary(), "publishing");
            self.publisher.publish(event);
        }
    }

    pub(crate) async fn lock_project(
        &self,
        project_id: &ProjectId,
        operation: &'static str,
    ) -> Result<LockGuard<ProjectId>, EngineError> {
        self.project_locks
            .acquire(project_id, self.config.engine.operation_timeout, operation)
            .await
    }

    pub(crate) async fn lock_baselines(
        &self,
        project_id: &ProjectId,
        baseline_type: BaselineType,
        operation: &'static str,
    ) -> Result<LockGuard<(ProjectId, BaselineType)>, EngineError> {
        self.baseline_locks
            .acquire(
                &(project_id.clone(), baseline_type),
                self.config.engine.operation_timeout,
                operation,
            )
            .await
    }
}

/// A live project of the actor's tenant; anything else reads as missing
pub(crate) fn visible_project<'a>(
    state: &'a MaterializedState,
    actor: &Actor,
    project_id: &ProjectId,
) -> Result<&'a Project, EngineError> {
    state
        .project(project_id)
        .filter(|p| p.is_visible_to(&actor.tenant_id))
        .ok_or_else(|| EngineError::not_found("project", project_id))
}

/// A baseline whose project is visible to the actor
pub(crate) fn visible_baseline<'a>(
    state: &'a MaterializedState,
    actor: &Actor,
    baseline_id: &BaselineId,
) -> Result<&'a Baseline, EngineError> {
    let baseline = state
        .baseline(baseline_id)
        .filter(|b| b.is_visible_to(&actor.tenant_id))
        .ok_or_else(|| EngineError::not_found("baseline", baseline_id))?;
    visible_project(state, actor, &baseline.project_id)
        .map_err(|_| EngineError::not_found("baseline", baseline_id))?;
    Ok(baseline)
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;

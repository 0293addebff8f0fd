// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Baseline lifecycle: create, update, finalize, re-baseline, revert, compare
//!
//! Version assignment and activation for a (project, baseline type) pair are
//! serialized by the baseline lock table. Versions are never reused: a revert
//! only moves the active pointer, and the next re-baseline still takes
//! `max(version) + 1`.

use crate::error::EngineError;
use crate::runtime::{visible_baseline, visible_project, Engine};
use serde::Serialize;
use std::collections::BTreeMap;
use zm_core::event::{BaselineCompared, BaselineCreated, BaselineRebaselined, BaselineUpdated};
use zm_core::{
    compare_baselines, compute_variance, next_version, Actor, Baseline, BaselineComparison,
    BaselineHistory, BaselineId, BaselineType, BaselineUpdate, Clock, Event, EventMeta,
    FieldChange, HistoryId, IdGen, Operation, PlanData, ProjectId, Publisher, VarianceResult,
    VersionDirection,
};
use zm_storage::MaterializedState;

/// Result of a re-baseline or revert
#[derive(Debug, Clone, Serialize)]
pub struct RebaselineOutcome {
    /// The baseline that is now active
    pub baseline: Baseline,
    pub history: BaselineHistory,
    /// Variance against the outgoing baseline at the moment of transition
    pub variance: VarianceResult,
}

impl<P, C, I> Engine<P, C, I>
where
    P: Publisher,
    C: Clock,
    I: IdGen,
{
    /// Create the next baseline version of a type and make it active
    pub async fn create_baseline(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        baseline_type: BaselineType,
        plan: PlanData,
        note: Option<String>,
    ) -> Result<Baseline, EngineError> {
        plan.validate()?;
        let _guard = self
            .lock_baselines(project_id, baseline_type, "create_baseline")
            .await?;

        let now = self.clock.now();
        let baseline = self.read(|state, _| -> Result<_, EngineError> {
            let project = visible_project(state, actor, project_id)?;
            let version = next_version(versions_of(state, project_id, baseline_type));
            let id = BaselineId::new(self.id_gen.next("baseline"));
            let mut baseline =
                Baseline::new(id, project, baseline_type, version, plan, actor.id.clone(), now);
            baseline.note = note;
            Ok(baseline)
        })?;

        self.commit(
            "create_baseline",
            vec![
                Operation::BaselineInsert {
                    baseline: baseline.clone(),
                },
                activate(&baseline),
            ],
        )?;
        drop(_guard);

        tracing::info!(
            project_id = %project_id,
            baseline_id = %baseline.id,
            baseline_type = %baseline_type,
            version = baseline.version,
            "baseline created"
        );
        self.publish_all(vec![Event::BaselineCreated(BaselineCreated {
            project_id: project_id.clone(),
            baseline_id: baseline.id.clone(),
            baseline_type,
            version: baseline.version,
            start_date: baseline.plan.start_date,
            end_date: baseline.plan.end_date,
            planned_cost: baseline.plan.planned_cost,
            meta: EventMeta::new(actor, now),
        })]);
        Ok(baseline)
    }

    /// Apply a partial update to an unlocked baseline.
    ///
    /// An update that changes nothing is neither committed nor published.
    pub async fn update_baseline(
        &self,
        actor: &Actor,
        baseline_id: &BaselineId,
        update: BaselineUpdate,
    ) -> Result<Baseline, EngineError> {
        let (project_id, baseline_type) = self.baseline_key(actor, baseline_id)?;
        let _guard = self
            .lock_baselines(&project_id, baseline_type, "update_baseline")
            .await?;

        let now = self.clock.now();
        let current = self.read(|state, _| visible_baseline(state, actor, baseline_id).cloned())?;
        let (updated, changes) = current.apply_update(&update, now)?;
        if changes.is_empty() {
            return Ok(current);
        }

        self.commit(
            "update_baseline",
            vec![Operation::BaselineReplace {
                baseline: updated.clone(),
            }],
        )?;
        drop(_guard);

        tracing::info!(
            baseline_id = %baseline_id,
            fields = ?changes.keys().collect::<Vec<_>>(),
            "baseline updated"
        );
        self.publish_all(vec![updated_event(actor, &updated, changes, now)]);
        Ok(updated)
    }

    /// Lock a baseline against further edits. Locking twice is a no-op.
    pub async fn finalize_baseline(
        &self,
        actor: &Actor,
        baseline_id: &BaselineId,
    ) -> Result<Baseline, EngineError> {
        let (project_id, baseline_type) = self.baseline_key(actor, baseline_id)?;
        let _guard = self
            .lock_baselines(&project_id, baseline_type, "finalize_baseline")
            .await?;

        let now = self.clock.now();
        let current = self.read(|state, _| visible_baseline(state, actor, baseline_id).cloned())?;
        if current.locked {
            return Ok(current);
        }

        let mut locked = current;
        locked.locked = true;
        locked.updated_at = now;
        self.commit(
            "finalize_baseline",
            vec![Operation::BaselineReplace {
                baseline: locked.clone(),
            }],
        )?;
        drop(_guard);

        let mut changes = BTreeMap::new();
        changes.insert(
            "locked".to_string(),
            FieldChange {
                old: serde_json::Value::Bool(false),
                new: serde_json::Value::Bool(true),
            },
        );
        tracing::info!(baseline_id = %baseline_id, "baseline finalized");
        self.publish_all(vec![updated_event(actor, &locked, changes, now)]);
        Ok(locked)
    }

    /// Replace the active baseline of a type with a new version.
    ///
    /// The outgoing version is locked and a history row records the
    /// transition with a variance snapshot. With `expected_version`, the
    /// call fails with a conflict unless that version is still active.
    pub async fn rebaseline_project(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        baseline_type: BaselineType,
        reason: &str,
        plan: PlanData,
        expected_version: Option<u32>,
    ) -> Result<RebaselineOutcome, EngineError> {
        require_reason(reason)?;
        plan.validate()?;
        let _guard = self
            .lock_baselines(project_id, baseline_type, "rebaseline_project")
            .await?;

        let now = self.clock.now();
        let today = self.clock.today();
        let (current, incoming, variance) = self.read(|state, _| -> Result<_, EngineError> {
            let project = visible_project(state, actor, project_id)?;
            let current = active_of(state, project_id, baseline_type)?.clone();
            if let Some(expected) = expected_version {
                if expected != current.version {
                    return Err(EngineError::Conflict(format!(
                        "{} baseline of project {} is at v{}, expected v{}",
                        baseline_type, project_id, current.version, expected
                    )));
                }
            }
            let variance = compute_variance(
                project,
                state.has_progress_data(project_id),
                &current,
                today,
                &self.config.health,
            )?;
            let version = next_version(versions_of(state, project_id, baseline_type));
            let id = BaselineId::new(self.id_gen.next("baseline"));
            let incoming = Baseline::new(id, project, baseline_type, version, plan, actor.id.clone(), now)
                .with_note(reason);
            Ok((current, incoming, variance))
        })?;

        let history = BaselineHistory {
            id: HistoryId::new(self.id_gen.next("history")),
            project_id: project_id.clone(),
            baseline_type,
            baseline_id: incoming.id.clone(),
            from_version: current.version,
            to_version: incoming.version,
            note: reason.to_string(),
            created_by: actor.id.clone(),
            created_at: now,
            variance_snapshot: Some(variance.clone()),
        };

        let mut ops = Vec::new();
        if !current.locked {
            let mut outgoing = current.clone();
            outgoing.locked = true;
            outgoing.updated_at = now;
            ops.push(Operation::BaselineReplace { baseline: outgoing });
        }
        ops.push(Operation::BaselineInsert {
            baseline: incoming.clone(),
        });
        ops.push(activate(&incoming));
        ops.push(Operation::HistoryAppend {
            history: history.clone(),
        });
        self.commit("rebaseline_project", ops)?;
        drop(_guard);

        tracing::info!(
            project_id = %project_id,
            baseline_type = %baseline_type,
            old_version = current.version,
            new_version = incoming.version,
            "project re-baselined"
        );
        self.publish_all(vec![rebaselined_event(
            actor, &current, &incoming, reason, &variance, now,
        )]);
        Ok(RebaselineOutcome {
            baseline: incoming,
            history,
            variance,
        })
    }

    /// Point the active baseline of a type back at an older version
    pub async fn revert_baseline(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        baseline_type: BaselineType,
        target_version: u32,
        reason: &str,
    ) -> Result<RebaselineOutcome, EngineError> {
        require_reason(reason)?;
        let _guard = self
            .lock_baselines(project_id, baseline_type, "revert_baseline")
            .await?;

        let now = self.clock.now();
        let today = self.clock.today();
        let (current, target, variance) = self.read(|state, _| -> Result<_, EngineError> {
            let project = visible_project(state, actor, project_id)?;
            let current = active_of(state, project_id, baseline_type)?.clone();
            let target = state
                .baselines_of(project_id)
                .into_iter()
                .find(|b| b.baseline_type == baseline_type && b.version == target_version)
                .cloned()
                .ok_or_else(|| {
                    EngineError::not_found(
                        "baseline",
                        format!("{} {} v{}", project_id, baseline_type, target_version),
                    )
                })?;
            if target.version >= current.version {
                return Err(EngineError::Validation(format!(
                    "revert target v{} must be older than the active v{}",
                    target.version, current.version
                )));
            }
            let variance = compute_variance(
                project,
                state.has_progress_data(project_id),
                &current,
                today,
                &self.config.health,
            )?;
            Ok((current, target, variance))
        })?;

        let history = BaselineHistory {
            id: HistoryId::new(self.id_gen.next("history")),
            project_id: project_id.clone(),
            baseline_type,
            baseline_id: target.id.clone(),
            from_version: current.version,
            to_version: target.version,
            note: reason.to_string(),
            created_by: actor.id.clone(),
            created_at: now,
            variance_snapshot: Some(variance.clone()),
        };
        self.commit(
            "revert_baseline",
            vec![
                activate(&target),
                Operation::HistoryAppend {
                    history: history.clone(),
                },
            ],
        )?;
        drop(_guard);

        tracing::info!(
            project_id = %project_id,
            baseline_type = %baseline_type,
            from_version = current.version,
            to_version = target.version,
            "baseline reverted"
        );
        self.publish_all(vec![rebaselined_event(
            actor, &current, &target, reason, &variance, now,
        )]);
        Ok(RebaselineOutcome {
            baseline: target,
            history,
            variance,
        })
    }

    /// Compare two baselines of the same project and type
    pub fn compare_baselines(
        &self,
        actor: &Actor,
        first: &BaselineId,
        second: &BaselineId,
    ) -> Result<BaselineComparison, EngineError> {
        let comparison = self.read(|state, _| -> Result<_, EngineError> {
            let a = visible_baseline(state, actor, first)?;
            let b = visible_baseline(state, actor, second)?;
            Ok(compare_baselines(a, b)?)
        })?;

        self.publish_all(vec![Event::BaselineCompared(BaselineCompared {
            comparison: comparison.clone(),
            meta: EventMeta::new(actor, self.clock.now()),
        })]);
        Ok(comparison)
    }

    pub fn get_baseline(
        &self,
        actor: &Actor,
        baseline_id: &BaselineId,
    ) -> Result<Baseline, EngineError> {
        self.read(|state, _| visible_baseline(state, actor, baseline_id).cloned())
    }

    /// The baseline variance is measured against, if the type has any
    pub fn active_baseline(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        baseline_type: BaselineType,
    ) -> Result<Option<Baseline>, EngineError> {
        self.read(|state, _| -> Result<_, EngineError> {
            visible_project(state, actor, project_id)?;
            Ok(state.active_baseline(project_id, baseline_type).cloned())
        })
    }

    /// Every baseline of a project, ordered by type then version
    pub fn list_baselines(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
    ) -> Result<Vec<Baseline>, EngineError> {
        self.read(|state, _| -> Result<_, EngineError> {
            visible_project(state, actor, project_id)?;
            Ok(state
                .baselines_of(project_id)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    /// Re-baseline and revert transitions, oldest first
    pub fn baseline_history(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
    ) -> Result<Vec<BaselineHistory>, EngineError> {
        self.read(|state, _| -> Result<_, EngineError> {
            visible_project(state, actor, project_id)?;
            Ok(state.history_of(project_id).into_iter().cloned().collect())
        })
    }

    fn baseline_key(
        &self,
        actor: &Actor,
        baseline_id: &BaselineId,
    ) -> Result<(ProjectId, BaselineType), EngineError> {
        self.read(|state, _| -> Result<_, EngineError> {
            visible_baseline(state, actor, baseline_id)
                .map(|b| (b.project_id.clone(), b.baseline_type))
        })
    }
}

fn versions_of(
    state: &MaterializedState,
    project_id: &ProjectId,
    baseline_type: BaselineType,
) -> Vec<u32> {
    state
        .baselines_of(project_id)
        .into_iter()
        .filter(|b| b.baseline_type == baseline_type)
        .map(|b| b.version)
        .collect()
}

fn active_of<'a>(
    state: &'a MaterializedState,
    project_id: &ProjectId,
    baseline_type: BaselineType,
) -> Result<&'a Baseline, EngineError> {
    state
        .active_baseline(project_id, baseline_type)
        .ok_or_else(|| {
            EngineError::not_found("baseline", format!("{} {}", project_id, baseline_type))
        })
}

fn activate(baseline: &Baseline) -> Operation {
    Operation::BaselineActivate {
        project_id: baseline.project_id.clone(),
        baseline_type: baseline.baseline_type,
        baseline_id: baseline.id.clone(),
    }
}

fn require_reason(reason: &str) -> Result<(), EngineError> {
    if reason.trim().is_empty() {
        return Err(EngineError::Validation(
            "a reason is required to change the active baseline".to_string(),
        ));
    }
    Ok(())
}

fn updated_event(
    actor: &Actor,
    baseline: &Baseline,
    changes: BTreeMap<String, FieldChange>,
    at: chrono::DateTime<chrono::Utc>,
) -> Event {
    Event::BaselineUpdated(BaselineUpdated {
        project_id: baseline.project_id.clone(),
        baseline_id: baseline.id.clone(),
        baseline_type: baseline.baseline_type,
        version: baseline.version,
        changed_fields: changes.keys().cloned().collect(),
        changes,
        meta: EventMeta::new(actor, at),
    })
}

fn rebaselined_event(
    actor: &Actor,
    from: &Baseline,
    to: &Baseline,
    reason: &str,
    variance: &VarianceResult,
    at: chrono::DateTime<chrono::Utc>,
) -> Event {
    Event::BaselineRebaselined(BaselineRebaselined {
        project_id: from.project_id.clone(),
        baseline_type: from.baseline_type,
        old_baseline_id: from.id.clone(),
        new_baseline_id: to.id.clone(),
        old_version: from.version,
        new_version: to.version,
        direction: VersionDirection::between(from.version, to.version),
        reason: reason.to_string(),
        variance_data: Some(variance.clone()),
        meta: EventMeta::new(actor, at),
    })
}

#[cfg(test)]
#[path = "baselines_tests.rs"]
mod tests;

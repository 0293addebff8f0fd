// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-demand variance against a baseline

use crate::error::EngineError;
use crate::runtime::{visible_baseline, visible_project, Engine};
use zm_core::event::VarianceUpdated;
use zm_core::{
    compute_variance, Actor, BaselineId, BaselineType, Clock, Event, EventMeta, IdGen, ProjectId,
    Publisher, VarianceResult,
};

impl<P, C, I> Engine<P, C, I>
where
    P: Publisher,
    C: Clock,
    I: IdGen,
{
    /// Variance of a project against one of its baselines, as of today.
    ///
    /// Reads one committed snapshot, so two calls with no change in between
    /// on the same day return identical results.
    pub fn compute_variance(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        baseline_id: &BaselineId,
    ) -> Result<VarianceResult, EngineError> {
        let today = self.clock.today();
        let result = self.read(|state, _| -> Result<_, EngineError> {
            let project = visible_project(state, actor, project_id)?;
            let baseline = visible_baseline(state, actor, baseline_id)?;
            Ok(compute_variance(
                project,
                state.has_progress_data(project_id),
                baseline,
                today,
                &self.config.health,
            )?)
        })?;

        tracing::info!(
            project_id = %project_id,
            baseline_id = %baseline_id,
            health = %result.overall_health,
            "variance computed"
        );
        self.publish_all(vec![Event::VarianceUpdated(VarianceUpdated {
            project_id: project_id.clone(),
            baseline_id: baseline_id.clone(),
            variance_data: result.clone(),
            meta: EventMeta::new(actor, self.clock.now()),
        })]);
        Ok(result)
    }

    /// Variance against the active baseline of a type
    pub fn compute_active_variance(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        baseline_type: BaselineType,
    ) -> Result<VarianceResult, EngineError> {
        let baseline = self
            .active_baseline(actor, project_id, baseline_type)?
            .ok_or_else(|| {
                EngineError::not_found("baseline", format!("{} {}", project_id, baseline_type))
            })?;
        self.compute_variance(actor, project_id, &baseline.id)
    }
}

#[cfg(test)]
#[path = "variance_tests.rs"]
mod tests;

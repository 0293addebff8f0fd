// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine unit tests

use crate::{ComponentDraft, Engine, EngineDeps, ProjectDraft, TaskDraft};
use chrono::NaiveDate;
use std::sync::Arc;
use zm_core::{
    Actor, ComponentId, EngineConfig, Event, EventBus, EventReceiver, FakeClock, PlanData,
    ProjectId, SequentialIdGen, TaskId,
};
use zm_storage::Store;

pub(crate) type TestEngine = Engine<EventBus, FakeClock, SequentialIdGen>;

pub(crate) fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, m, d).unwrap()
}

/// 100 days from Jan 1, 10_000 budget; half is planned by Feb 20
pub(crate) fn plan() -> PlanData {
    PlanData::new(date(1, 1), date(4, 11), 10_000.0)
}

pub(crate) fn actor() -> Actor {
    Actor::new("pm", "tenant-a")
}

pub(crate) fn stranger() -> Actor {
    Actor::new("intruder", "tenant-b")
}

pub(crate) struct Harness {
    pub engine: Arc<TestEngine>,
    pub clock: FakeClock,
    pub events: EventReceiver,
    pub actor: Actor,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_store(Store::in_memory(), config)
    }

    pub fn with_store(store: Store, config: EngineConfig) -> Self {
        let bus = EventBus::new();
        let events = bus.set_global_handler();
        let clock = FakeClock::on(date(2, 20));
        let engine = Engine::new(
            EngineDeps::new(store, bus),
            config,
            clock.clone(),
            SequentialIdGen::new(),
        );
        Self {
            engine: Arc::new(engine),
            clock,
            events,
            actor: actor(),
        }
    }

    /// Everything published since the last drain
    pub fn drain(&mut self) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    pub fn drain_names(&mut self) -> Vec<&'static str> {
        self.drain().iter().map(Event::name).collect()
    }

    pub async fn project(&self, id: &str) -> ProjectId {
        self.engine
            .create_project(
                &self.actor,
                ProjectDraft {
                    id: Some(ProjectId::new(id)),
                    name: format!("Project {id}"),
                    budget: 10_000.0,
                    ..ProjectDraft::default()
                },
            )
            .await
            .unwrap()
            .id
    }

    pub async fn component(&self, project: &ProjectId, id: &str, parent: Option<&str>) -> ComponentId {
        self.engine
            .add_component(
                &self.actor,
                project,
                ComponentDraft {
                    id: Some(ComponentId::new(id)),
                    name: format!("Component {id}"),
                    parent_id: parent.map(ComponentId::new),
                    ..ComponentDraft::default()
                },
            )
            .await
            .unwrap()
            .0
            .id
    }

    pub async fn task(
        &self,
        project: &ProjectId,
        id: &str,
        component: Option<&str>,
        hours: Option<f64>,
    ) -> TaskId {
        self.engine
            .add_task(
                &self.actor,
                project,
                TaskDraft {
                    id: Some(TaskId::new(id)),
                    name: format!("Task {id}"),
                    component_id: component.map(ComponentId::new),
                    estimated_hours: hours,
                    ..TaskDraft::default()
                },
            )
            .await
            .unwrap()
            .0
            .id
    }
}

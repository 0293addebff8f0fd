// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrent writers against one engine

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;
use zm_core::{
    Actor, BaselineType, EngineConfig, EventBus, FakeClock, PlanData, ProjectId, SequentialIdGen,
    TaskId,
};
use zm_engine::{ComponentDraft, Engine, EngineDeps, EngineError, ProjectDraft, TaskDraft};
use zm_storage::Store;

type TestEngine = Engine<EventBus, FakeClock, SequentialIdGen>;

fn engine() -> Arc<TestEngine> {
    let date = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
    Arc::new(Engine::new(
        EngineDeps::new(Store::in_memory(), EventBus::new()),
        EngineConfig::default(),
        FakeClock::on(date),
        SequentialIdGen::new(),
    ))
}

fn actor() -> Actor {
    Actor::new("pm", "tenant-a")
}

fn plan() -> PlanData {
    PlanData::new(
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 4, 11).unwrap(),
        10_000.0,
    )
}

async fn project(engine: &TestEngine) -> ProjectId {
    engine
        .create_project(
            &actor(),
            ProjectDraft {
                id: Some(ProjectId::new("p-1")),
                name: "Tower".to_string(),
                ..ProjectDraft::default()
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_task_updates_all_land() {
    const WRITERS: usize = 20;
    let engine = engine();
    let p = project(&engine).await;
    engine
        .add_component(
            &actor(),
            &p,
            ComponentDraft {
                id: Some("c-1".into()),
                name: "Core".to_string(),
                ..ComponentDraft::default()
            },
        )
        .await
        .unwrap();
    for i in 0..WRITERS {
        engine
            .add_task(
                &actor(),
                &p,
                TaskDraft {
                    id: Some(TaskId::new(format!("t-{i}"))),
                    name: format!("Task {i}"),
                    component_id: Some("c-1".into()),
                    estimated_hours: Some(5.0),
                    ..TaskDraft::default()
                },
            )
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for i in 0..WRITERS {
        let engine = Arc::clone(&engine);
        let p = p.clone();
        handles.push(tokio::spawn(async move {
            engine
                .set_task_progress(&actor(), &p, &TaskId::new(format!("t-{i}")), 100.0)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let project = engine.get_project(&actor(), &p).unwrap();
    assert_eq!(project.progress_percent(), 100.0);
    assert_eq!(project.version(), WRITERS as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn waiting_rebaselines_take_the_next_free_version() {
    const CALLERS: u32 = 6;
    let engine = engine();
    let p = project(&engine).await;
    engine
        .create_baseline(&actor(), &p, BaselineType::Contract, plan(), None)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..CALLERS {
        let engine = Arc::clone(&engine);
        let p = p.clone();
        handles.push(tokio::spawn(async move {
            engine
                .rebaseline_project(
                    &actor(),
                    &p,
                    BaselineType::Contract,
                    &format!("change {i}"),
                    plan(),
                    None,
                )
                .await
        }));
    }

    let mut versions = BTreeSet::new();
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        versions.insert(outcome.baseline.version);
    }
    assert_eq!(versions, (2..=CALLERS + 1).collect::<BTreeSet<_>>());

    let history = engine.baseline_history(&actor(), &p).unwrap();
    assert_eq!(history.len(), CALLERS as usize);
    assert!(history.windows(2).all(|w| w[0].to_version < w[1].to_version));
    assert!(history.windows(2).all(|w| w[0].to_version == w[1].from_version));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_rebaselines_with_expected_version_have_one_winner() {
    const CALLERS: u32 = 6;
    let engine = engine();
    let p = project(&engine).await;
    engine
        .create_baseline(&actor(), &p, BaselineType::Execution, plan(), None)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..CALLERS {
        let engine = Arc::clone(&engine);
        let p = p.clone();
        handles.push(tokio::spawn(async move {
            engine
                .rebaseline_project(
                    &actor(),
                    &p,
                    BaselineType::Execution,
                    &format!("change {i}"),
                    plan(),
                    Some(1),
                )
                .await
        }));
    }

    let mut winners = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(outcome) => {
                assert_eq!(outcome.baseline.version, 2);
                winners += 1;
            }
            Err(EngineError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!((winners, conflicts), (1, CALLERS - 1));
}

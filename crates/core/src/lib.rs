// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! zm-core: Domain model and pure calculators for project progress tracking
//!
//! This crate provides:
//! - Projects, components, tasks and the component hierarchy
//! - The bottom-up progress/cost rollup
//! - Baselines, re-baseline history and baseline comparison
//! - Earned-value variance against a baseline
//! - Event payload contracts, the event bus and the audit log
//! - WAL operations, configuration, clock and id abstractions

pub mod actor;
pub mod baseline;
pub mod clock;
pub mod component;
pub mod config;
pub mod error;
pub mod event;
pub mod events;
pub mod hierarchy;
pub mod id;
pub mod operation;
pub mod project;
pub mod rollup;
pub mod task;
pub mod variance;

pub use actor::Actor;
pub use baseline::{
    compare_baselines, next_version, Baseline, BaselineComparison, BaselineHistory,
    BaselineType, BaselineUpdate, FieldChange, PlanData, PlanPoint, VersionDirection,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use component::{Component, Kpi};
pub use config::{ConfigError, EngineConfig, EngineSettings};
pub use error::DomainError;
pub use event::{Event, EventMeta};
pub use events::{
    EventBus, EventLog, EventPattern, EventQuery, EventReceiver, Publisher, Subscription,
};
pub use hierarchy::ProjectTree;
pub use id::{
    ActorId, BaselineId, ComponentId, HistoryId, IdGen, ProjectId, SequentialIdGen, TaskId,
    TenantId, UuidIdGen,
};
pub use operation::{ComponentValues, Operation};
pub use project::{Priority, Project, ProjectStatus};
pub use rollup::{
    compute_rollup, ComponentRollup, CostThresholdMode, RollupPolicy, RollupResult,
    RollupTrigger, Weighting,
};
pub use task::{StatusChange, Task, TaskInput, TaskStatus};
pub use variance::{
    compute_variance, CostVariance, EarnedValueData, Health, HealthPolicy, ScheduleVariance,
    VarianceResult,
};

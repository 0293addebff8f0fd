// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process delivery of committed events

use super::subscription::Subscription;
use crate::event::Event;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

pub type EventSender = mpsc::UnboundedSender<Event>;
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// Where committed events go.
///
/// Publishing is fire-and-forget: implementations must not block and must
/// not fail the caller when a consumer has gone away.
pub trait Publisher: Clone + Send + Sync + 'static {
    fn publish(&self, event: Event);
}

#[derive(Default)]
struct Routes {
    /// Sees every event of every tenant
    audit: Option<EventSender>,
    subscribers: Vec<(Subscription, EventSender)>,
}

/// Routes events to tenant-scoped subscribers and one audit channel.
///
/// Clones share the same routes. A subscriber whose receiver was dropped
/// is forgotten on the next publish.
#[derive(Clone, Default)]
pub struct EventBus {
    routes: Arc<RwLock<Routes>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive events the subscription accepts; an existing subscription
    /// with the same id is replaced
    pub fn subscribe(&self, subscription: Subscription) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut routes = self.routes.write().unwrap_or_else(|e| e.into_inner());
        routes.subscribers.retain(|(s, _)| s.id != subscription.id);
        routes.subscribers.push((subscription, tx));
        rx
    }

    /// Receive every event, replacing any previous audit receiver
    pub fn set_global_handler(&self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.routes.write().unwrap_or_else(|e| e.into_inner()).audit = Some(tx);
        rx
    }

}

impl Publisher for EventBus {
    fn publish(&self, event: Event) {
        tracing::debug!(event = event.name(), project = %event.project_id(), "publish");

        let mut routes = self.routes.write().unwrap_or_else(|e| e.into_inner());
        let audit_closed = routes
            .audit
            .as_ref()
            .is_some_and(|tx| tx.send(event.clone()).is_err());
        if audit_closed {
            tracing::warn!(event = event.name(), "audit receiver closed");
            routes.audit = None;
        }
        routes.subscribers.retain(|(subscription, tx)| {
            if tx.is_closed() {
                tracing::debug!(subscriber = %subscription.id.0, "dropping closed subscriber");
                return false;
            }
            if subscription.accepts(&event) {
                let _ = tx.send(event.clone());
            }
            true
        });
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;

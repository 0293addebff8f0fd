// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event pattern matching and subscriptions

use crate::event::Event;
use crate::id::TenantId;

/// Pattern for matching dotted event names
/// Supports:
///   - Exact: "Project.Baseline.Created"
///   - Single wildcard: "Project.Baseline.*" matches every baseline event
///   - Remainder: "Project.**" matches every project event
#[derive(Clone, Debug)]
pub struct EventPattern(String);

impl EventPattern {
    pub fn new(pattern: &str) -> Self {
        Self(pattern.to_string())
    }

    /// Check if this pattern matches an event name
    pub fn matches(&self, event_name: &str) -> bool {
        // Empty pattern matches nothing
        if self.0.is_empty() {
            return false;
        }

        if self.0 == "**" {
            return true;
        }

        let pattern_parts: Vec<&str> = self.0.split('.').collect();
        let event_parts: Vec<&str> = event_name.split('.').collect();

        Self::match_segments(&pattern_parts, &event_parts)
    }

    fn match_segments(pattern: &[&str], event: &[&str]) -> bool {
        match (pattern.first(), event.first()) {
            (None, None) => true,
            (Some(&"**"), _) => true,
            (Some(&"*"), Some(_)) => Self::match_segments(&pattern[1..], &event[1..]),
            (Some(p), Some(e)) if *p == *e => Self::match_segments(&pattern[1..], &event[1..]),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Subscriber handle for unsubscribing
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub String);

/// A subscription to specific event patterns
#[derive(Clone, Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub patterns: Vec<EventPattern>,
    pub description: String,
    /// When set, only this tenant's events are delivered
    pub tenant: Option<TenantId>,
}

impl Subscription {
    pub fn new(
        id: impl Into<String>,
        patterns: Vec<EventPattern>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: SubscriberId(id.into()),
            patterns,
            description: description.into(),
            tenant: None,
        }
    }

    pub fn for_tenant(mut self, tenant: impl Into<TenantId>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Check if any pattern matches the event name
    pub fn matches(&self, event_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(event_name))
    }

    /// Name match plus tenant scope
    pub fn accepts(&self, event: &Event) -> bool {
        let in_scope = match &self.tenant {
            Some(tenant) => tenant == event.tenant_id(),
            None => true,
        };
        in_scope && self.matches(event.name())
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;

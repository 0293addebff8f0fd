// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The caller identity threaded through every operation

use crate::id::{ActorId, TenantId};
use serde::{Deserialize, Serialize};

/// Who is performing an operation, and on behalf of which tenant.
///
/// Every engine operation takes an `Actor` explicitly; nothing reads the
/// caller from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub tenant_id: TenantId,
}

impl Actor {
    pub fn new(id: impl Into<ActorId>, tenant_id: impl Into<TenantId>) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
        }
    }

    /// The actor used for integration-driven and automatic changes
    pub fn system(tenant_id: impl Into<TenantId>) -> Self {
        Self::new("system", tenant_id)
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyed async locks with bounded waits

use crate::error::EngineError;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

type Slots<K> = Arc<Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>>;

/// One async mutex per key, created on first use.
///
/// Holding the returned guard serializes every operation on that key. A
/// key's entry lives only while a guard or a waiter refers to it.
pub struct LockTable<K> {
    slots: Slots<K>,
}

/// Exclusive hold on one key of a [`LockTable`]
#[derive(Debug)]
pub struct LockGuard<K: Eq + Hash> {
    guard: Option<OwnedMutexGuard<()>>,
    key: K,
    slots: Slots<K>,
}

impl<K> LockTable<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Wait up to `timeout` for the lock on `key`
    pub async fn acquire(
        &self,
        key: &K,
        timeout: Duration,
        operation: &'static str,
    ) -> Result<LockGuard<K>, EngineError> {
        let lock = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let guard = match Arc::clone(&lock).try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::debug!(?key, operation, "waiting for lock");
                let waited = tokio::time::timeout(timeout, lock.lock_owned()).await;
                match waited {
                    Ok(guard) => guard,
                    Err(_) => {
                        tracing::warn!(?key, operation, ?timeout, "lock wait timed out");
                        release_slot(&self.slots, key);
                        return Err(EngineError::Timeout {
                            operation,
                            after: timeout,
                        });
                    }
                }
            }
        };

        Ok(LockGuard {
            guard: Some(guard),
            key: key.clone(),
            slots: Arc::clone(&self.slots),
        })
    }

    /// Number of keys currently held or waited on
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K> Default for LockTable<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> Drop for LockGuard<K> {
    fn drop(&mut self) {
        // Unlock first so the slot's only remaining owner can be the table
        self.guard.take();
        release_slot(&self.slots, &self.key);
    }
}

/// Forget a key's mutex once nothing but the table refers to it
fn release_slot<K: Eq + Hash>(slots: &Slots<K>, key: &K) {
    let mut slots = slots.lock().unwrap_or_else(|e| e.into_inner());
    if slots.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
        slots.remove(key);
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;

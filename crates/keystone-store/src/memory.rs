//! # In-Memory Counter Store
//!
//! A mutex-guarded map instantiation of [`CounterStore`]. Suitable for tests
//! and single-process deployments where durability is handled elsewhere;
//! the concurrency contract is identical to the SQLite backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use keystone_core::{SequenceCounter, SequenceKey};

use crate::error::{StoreError, StoreResult};
use crate::store::{CounterLease, CounterStore, CreateMode, KeyedLock, LeaseCommit};

type CounterMap = Arc<Mutex<HashMap<SequenceKey, SequenceCounter>>>;

/// Counter store backed by process memory.
#[derive(Default)]
pub struct MemoryCounterStore {
    locks: Arc<KeyedLock>,
    counters: CounterMap,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        MemoryCounterStore::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn lease(
        &self,
        key: &SequenceKey,
        create: CreateMode,
        timeout: Duration,
    ) -> StoreResult<CounterLease> {
        let guard = self.locks.acquire(key, timeout).await?;

        // The map mutex is held only for the lookup; the per-key guard is
        // what keeps the read-modify-write exclusive.
        let snapshot = {
            let counters = self.counters.lock().await;
            counters.get(key).cloned()
        };

        let counter = match snapshot {
            Some(counter) => counter,
            None => match create {
                CreateMode::IfAbsent => {
                    debug!(key = %key, "lazily creating counter");
                    SequenceCounter::new(key.clone())
                }
                CreateMode::Never => {
                    return Err(StoreError::UnknownKey {
                        key: key.canonical(),
                    })
                }
            },
        };

        Ok(CounterLease::new(
            counter,
            Box::new(MemoryLeaseCommit {
                counters: self.counters.clone(),
            }),
            guard,
        ))
    }

    async fn peek(&self, key: &SequenceKey) -> StoreResult<Option<SequenceCounter>> {
        Ok(self.counters.lock().await.get(key).cloned())
    }
}

struct MemoryLeaseCommit {
    counters: CounterMap,
}

#[async_trait]
impl LeaseCommit for MemoryLeaseCommit {
    async fn commit(&mut self, counter: &SequenceCounter) -> StoreResult<()> {
        self.counters
            .lock()
            .await
            .insert(counter.key.clone(), counter.clone());
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

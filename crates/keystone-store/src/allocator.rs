//! # Atomic Sequence Allocator
//!
//! Exactly-once, gap-free issuance of sequence values under concurrency.
//!
//! ## Allocation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  One Allocation (single critical section)               │
//! │                                                                         │
//! │   next(key) / reserve_range(key, n)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   lease(key, IfAbsent, lock_timeout) ── may block, bounded             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   candidate range = last_issued+1 ..= last_issued+n                    │
//! │       │                                                                 │
//! │       ├── past ceiling? ──► drop lease, Err(Overflow)   (NO MUTATION)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   commit { last_issued += n, total_issued += n }                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   Ok(range)                                                              │
//! │                                                                         │
//! │   reserve_range is ONE critical section, never n calls to next: an     │
//! │   interleaving caller must never slice a contiguous block.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! For a fixed key, values ordered by lease acquisition are strictly
//! increasing with no gaps and no repeats, except across an explicit
//! administrative [`reset`](SequenceAllocator::reset).

use std::time::Duration;

use tracing::{debug, warn};

use keystone_core::SequenceKey;

use crate::error::{StoreError, StoreResult};
use crate::store::{CounterStore, CreateMode};

// =============================================================================
// Configuration
// =============================================================================

/// Allocator tuning.
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// Longest a mutating call may wait for a key's lease before surfacing
    /// a retryable [`StoreError::LockTimeout`].
    pub lock_timeout: Duration,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        AllocatorConfig {
            lock_timeout: Duration::from_secs(5),
        }
    }
}

impl AllocatorConfig {
    /// Sets the lease wait bound.
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}

// =============================================================================
// Allocator
// =============================================================================

/// Atomic counter allocator over any [`CounterStore`].
pub struct SequenceAllocator<S: CounterStore> {
    store: S,
    config: AllocatorConfig,
}

impl<S: CounterStore> SequenceAllocator<S> {
    /// Allocator with default configuration.
    pub fn new(store: S) -> Self {
        SequenceAllocator {
            store,
            config: AllocatorConfig::default(),
        }
    }

    /// Allocator with explicit configuration.
    pub fn with_config(store: S, config: AllocatorConfig) -> Self {
        SequenceAllocator { store, config }
    }

    /// The underlying store (for peeking outside the allocator API).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Atomically issues the next value for `key`.
    ///
    /// Creates a zero-initialized counter on first use. Fails with
    /// [`StoreError::Overflow`] past the ceiling, mutating nothing.
    pub async fn next(&self, key: &SequenceKey) -> StoreResult<u64> {
        let (start, _end) = self.reserve_range(key, 1).await?;
        Ok(start)
    }

    /// Returns what [`next`](Self::next) would currently produce.
    ///
    /// Guaranteed not to mutate state and not to take the key's lease.
    /// Best-effort preview only: a racing `next` may consume the value.
    /// Errors with [`StoreError::UnknownKey`] if no counter exists yet.
    pub async fn peek(&self, key: &SequenceKey) -> StoreResult<u64> {
        match self.store.peek(key).await? {
            Some(counter) if counter.would_overflow(1) => Err(StoreError::Overflow {
                key: key.canonical(),
                requested: 1,
                last_issued: counter.last_issued,
                max_allowed: counter.max_allowed,
            }),
            Some(counter) => Ok(counter.last_issued + 1),
            None => Err(StoreError::UnknownKey {
                key: key.canonical(),
            }),
        }
    }

    /// Atomically reserves a contiguous block of `n >= 1` values,
    /// returning the inclusive `(start, end)` of newly issued integers.
    ///
    /// All-or-nothing: a request that would pass the ceiling fails with
    /// [`StoreError::Overflow`] and leaves the counter untouched.
    pub async fn reserve_range(&self, key: &SequenceKey, n: u64) -> StoreResult<(u64, u64)> {
        if n == 0 {
            return Err(StoreError::EmptyReservation);
        }

        let lease = self
            .store
            .lease(key, CreateMode::IfAbsent, self.config.lock_timeout)
            .await?;
        let mut counter = lease.counter().clone();

        if counter.would_overflow(n) {
            // Dropping the lease releases the lock with no mutation.
            return Err(StoreError::Overflow {
                key: key.canonical(),
                requested: n,
                last_issued: counter.last_issued,
                max_allowed: counter.max_allowed,
            });
        }

        let start = counter.last_issued + 1;
        let end = counter.last_issued + n;
        counter.last_issued = end;
        counter.total_issued += n;
        lease.commit(counter).await?;

        debug!(key = %key, start, end, "issued sequence range");
        Ok((start, end))
    }

    /// Administrative override: sets `last_issued = value`.
    ///
    /// The correction tool for operators. Resetting downward CAN cause
    /// duplicate issuance; callers own the audit consequences. Fails with
    /// [`StoreError::UnknownKey`] if the counter was never created, and
    /// with [`StoreError::Overflow`] for a value past the ceiling (the
    /// counter invariant survives even corrections).
    pub async fn reset(&self, key: &SequenceKey, value: u64) -> StoreResult<()> {
        let lease = self
            .store
            .lease(key, CreateMode::Never, self.config.lock_timeout)
            .await?;
        let mut counter = lease.counter().clone();

        if value > counter.max_allowed {
            return Err(StoreError::Overflow {
                key: key.canonical(),
                requested: value,
                last_issued: counter.last_issued,
                max_allowed: counter.max_allowed,
            });
        }

        warn!(
            key = %key,
            from = counter.last_issued,
            to = value,
            "administrative counter reset"
        );
        counter.last_issued = value;
        lease.commit(counter).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

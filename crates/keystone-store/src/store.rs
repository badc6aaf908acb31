//! # Counter Store Abstraction
//!
//! "SELECT FOR UPDATE" generalized: an exclusive, bounded-wait lease on one
//! counter record for the duration of its read-modify-write.
//!
//! ## Lease Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Counter Lease Protocol                            │
//! │                                                                         │
//! │  Caller A                         Caller B (same key)                  │
//! │  ────────                         ────────────────────                  │
//! │  lease(key) ── acquires ─┐                                              │
//! │                          │        lease(key) ── blocks (bounded) ──┐   │
//! │  read snapshot           │                                          │   │
//! │  compute next values     │             waits ≤ timeout              │   │
//! │  commit(counter) ────────┘                                          │   │
//! │                          released ──► acquires ◄────────────────────┘   │
//! │                                                                         │
//! │  Dropping a lease WITHOUT commit releases the lock with no mutation    │
//! │  (this is how overflow stays all-or-nothing).                           │
//! │                                                                         │
//! │  Different keys never share a lock: a PO counter lease never blocks    │
//! │  a barcode serial lease.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backends: [`MemoryCounterStore`](crate::memory::MemoryCounterStore) for
//! tests/single-process use, [`SqliteCounterStore`](crate::sqlite::SqliteCounterStore)
//! for durable deployments. Both take per-key exclusivity from [`KeyedLock`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use keystone_core::{SequenceCounter, SequenceKey};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Trait
// =============================================================================

/// Behavior when leasing a key that has no counter yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    /// Zero-initialize a counter with the key's default ceiling.
    /// Used by allocation: counters are created lazily on first use.
    IfAbsent,
    /// Fail with [`StoreError::UnknownKey`]. Used by administrative resets.
    Never,
}

/// Durable, lockable key→counter records.
///
/// Implementations guarantee:
/// - `lease` is exclusive per key and bounded by `timeout`
/// - `peek` never blocks on a key's lease and never mutates
/// - counters are never deleted
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Acquires the exclusive lease on `key`'s counter record.
    async fn lease(
        &self,
        key: &SequenceKey,
        create: CreateMode,
        timeout: Duration,
    ) -> StoreResult<CounterLease>;

    /// Lock-free snapshot of a counter, `None` if it was never created.
    ///
    /// Best-effort preview: racing with concurrent leases is expected and
    /// acceptable; callers must not treat the result as a reservation.
    async fn peek(&self, key: &SequenceKey) -> StoreResult<Option<SequenceCounter>>;
}

// =============================================================================
// Lease
// =============================================================================

/// Backend-specific commit half of a lease.
#[async_trait]
pub trait LeaseCommit: Send {
    /// Persists the new counter values. Runs while the per-key lock is
    /// still held, so commit order equals lease order.
    async fn commit(&mut self, counter: &SequenceCounter) -> StoreResult<()>;
}

/// An exclusive lease on one counter record.
///
/// Holds the per-key lock from acquisition until drop. Consuming the lease
/// via [`commit`](Self::commit) persists new values; dropping it without
/// commit releases the lock and mutates nothing.
pub struct CounterLease {
    counter: SequenceCounter,
    committer: Box<dyn LeaseCommit>,
    // Released on drop, after any commit completes.
    _guard: OwnedMutexGuard<()>,
}

impl std::fmt::Debug for CounterLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterLease")
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

impl CounterLease {
    pub fn new(
        counter: SequenceCounter,
        committer: Box<dyn LeaseCommit>,
        guard: OwnedMutexGuard<()>,
    ) -> Self {
        CounterLease {
            counter,
            committer,
            _guard: guard,
        }
    }

    /// The counter snapshot as of lease acquisition.
    pub fn counter(&self) -> &SequenceCounter {
        &self.counter
    }

    /// Persists `counter` and releases the lease.
    pub async fn commit(mut self, counter: SequenceCounter) -> StoreResult<()> {
        self.committer.commit(&counter).await
    }
}

// =============================================================================
// Keyed Lock
// =============================================================================

/// A lazily grown map of per-key async mutexes.
///
/// One mutex per [`SequenceKey`]; acquiring key A never contends with key B.
/// The outer map lock is held only long enough to clone the per-key handle.
/// Entries are never removed: the key space (document types × fiscal years,
/// models × suppliers × months) is small and append-only, matching the
/// never-deleted counter records they guard.
#[derive(Debug, Default)]
pub struct KeyedLock {
    locks: Mutex<HashMap<SequenceKey, Arc<Mutex<()>>>>,
}

impl KeyedLock {
    pub fn new() -> Self {
        KeyedLock::default()
    }

    /// Acquires the exclusive lock for `key`, waiting at most `timeout`.
    pub async fn acquire(
        &self,
        key: &SequenceKey,
        timeout: Duration,
    ) -> StoreResult<OwnedMutexGuard<()>> {
        let handle = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        tokio::time::timeout(timeout, handle.lock_owned())
            .await
            .map_err(|_| StoreError::LockTimeout {
                key: key.canonical(),
                waited: timeout,
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(model: &str) -> SequenceKey {
        SequenceKey::for_serial(model, "FS", "AA", 'A')
    }

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = KeyedLock::new();
        let k = key("IEL");

        let held = locks.acquire(&k, Duration::from_secs(1)).await.unwrap();

        let err = locks
            .acquire(&k, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::LockTimeout { .. }));

        drop(held);
        assert!(locks.acquire(&k, Duration::from_secs(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_different_keys_do_not_contend() {
        let locks = KeyedLock::new();

        let _held = locks
            .acquire(&key("IEL"), Duration::from_secs(1))
            .await
            .unwrap();

        // A different key acquires immediately even while IEL is held.
        let other = locks.acquire(&key("XKQ"), Duration::from_millis(20)).await;
        assert!(other.is_ok());
    }
}

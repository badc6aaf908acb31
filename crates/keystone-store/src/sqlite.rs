//! # SQLite Counter Store
//!
//! Durable [`CounterStore`] backed by the `sequence_counters` table.
//!
//! ## Locking Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 SQLite Counter Store Locking                            │
//! │                                                                         │
//! │  Per-key exclusivity comes from the in-process KeyedLock (the system   │
//! │  has a single logical owner per key); SQLite provides durability and   │
//! │  a single atomic upsert per commit.                                     │
//! │                                                                         │
//! │  lease(key):  KeyedLock.acquire(key)  ──►  SELECT row snapshot          │
//! │  commit:      INSERT .. ON CONFLICT(key) DO UPDATE  (one statement)     │
//! │  drop:        release KeyedLock, row untouched                          │
//! │                                                                         │
//! │  Counters are created on FIRST COMMIT, not at lease time, so an        │
//! │  abandoned lease leaves no trace.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use keystone_core::{SequenceCounter, SequenceKey};

use crate::db::Database;
use crate::error::{StoreError, StoreResult};
use crate::store::{CounterLease, CounterStore, CreateMode, KeyedLock, LeaseCommit};

/// Counter store backed by SQLite.
#[derive(Clone)]
pub struct SqliteCounterStore {
    pool: SqlitePool,
    locks: Arc<KeyedLock>,
}

impl SqliteCounterStore {
    /// Builds a counter store over `db`.
    ///
    /// The per-key locks live on the [`Database`], so any number of stores
    /// built over the same handle mutually exclude on each key.
    pub fn new(db: &Database) -> Self {
        SqliteCounterStore {
            pool: db.pool().clone(),
            locks: db.counter_locks(),
        }
    }

    async fn fetch(&self, key: &SequenceKey) -> StoreResult<Option<SequenceCounter>> {
        let row = sqlx::query(
            r#"
            SELECT last_issued, max_allowed, total_issued
            FROM sequence_counters
            WHERE key = ?1
            "#,
        )
        .bind(key.canonical())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| SequenceCounter {
            key: key.clone(),
            last_issued: row.get::<i64, _>("last_issued") as u64,
            max_allowed: row.get::<i64, _>("max_allowed") as u64,
            total_issued: row.get::<i64, _>("total_issued") as u64,
        }))
    }
}

#[async_trait]
impl CounterStore for SqliteCounterStore {
    async fn lease(
        &self,
        key: &SequenceKey,
        create: CreateMode,
        timeout: Duration,
    ) -> StoreResult<CounterLease> {
        let guard = self.locks.acquire(key, timeout).await?;

        let counter = match self.fetch(key).await? {
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
            Box::new(SqliteLeaseCommit {
                pool: self.pool.clone(),
            }),
            guard,
        ))
    }

    async fn peek(&self, key: &SequenceKey) -> StoreResult<Option<SequenceCounter>> {
        // Plain read: never touches the KeyedLock.
        self.fetch(key).await
    }
}

struct SqliteLeaseCommit {
    pool: SqlitePool,
}

#[async_trait]
impl LeaseCommit for SqliteLeaseCommit {
    async fn commit(&mut self, counter: &SequenceCounter) -> StoreResult<()> {
        let now = Utc::now();

        // Single upsert statement: atomic in SQLite, and the KeyedLock is
        // still held, so commit order equals lease order.
        sqlx::query(
            r#"
            INSERT INTO sequence_counters (key, last_issued, max_allowed, total_issued, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(key) DO UPDATE SET
                last_issued = excluded.last_issued,
                total_issued = excluded.total_issued,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(counter.key.canonical())
        .bind(counter.last_issued as i64)
        .bind(counter.max_allowed as i64)
        .bind(counter.total_issued as i64)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConfig;

    const TIMEOUT: Duration = Duration::from_secs(1);

    async fn store() -> SqliteCounterStore {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        SqliteCounterStore::new(&db)
    }

    fn key() -> SequenceKey {
        SequenceKey::for_serial("IEL", "FS", "AA", 'A')
    }

    #[tokio::test]
    async fn test_commit_round_trips_through_sqlite() {
        let store = store().await;
        let k = key();

        let lease = store.lease(&k, CreateMode::IfAbsent, TIMEOUT).await.unwrap();
        let mut counter = lease.counter().clone();
        assert_eq!(counter.last_issued, 0);
        assert_eq!(counter.max_allowed, 999_999);

        counter.last_issued = 7;
        counter.total_issued = 7;
        lease.commit(counter).await.unwrap();

        let peeked = store.peek(&k).await.unwrap().unwrap();
        assert_eq!(peeked.last_issued, 7);
        assert_eq!(peeked.total_issued, 7);
        assert_eq!(peeked.key, k);
    }

    #[tokio::test]
    async fn test_abandoned_lease_leaves_no_row() {
        let store = store().await;
        let k = key();

        let lease = store.lease(&k, CreateMode::IfAbsent, TIMEOUT).await.unwrap();
        drop(lease);

        assert!(store.peek(&k).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_mode_never_rejects_unknown_key() {
        let store = store().await;
        let err = store
            .lease(&key(), CreateMode::Never, TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownKey { .. }));
    }

    #[tokio::test]
    async fn test_stores_over_one_database_share_key_locks() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let first = SqliteCounterStore::new(&db);
        let second = SqliteCounterStore::new(&db);
        let k = key();

        let held = first.lease(&k, CreateMode::IfAbsent, TIMEOUT).await.unwrap();

        // A second store built over the same database contends on the key.
        let err = second
            .lease(&k, CreateMode::IfAbsent, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::LockTimeout { .. }));

        drop(held);
        assert!(second.lease(&k, CreateMode::IfAbsent, TIMEOUT).await.is_ok());
    }

    #[tokio::test]
    async fn test_held_lease_blocks_same_key_only() {
        let store = store().await;
        let k = key();
        let other = SequenceKey::for_serial("XKQ", "FS", "AA", 'A');

        let held = store.lease(&k, CreateMode::IfAbsent, TIMEOUT).await.unwrap();

        let err = store
            .lease(&k, CreateMode::IfAbsent, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::LockTimeout { .. }));

        // A different key leases fine while the first is held.
        let ok = store
            .lease(&other, CreateMode::IfAbsent, Duration::from_millis(20))
            .await;
        assert!(ok.is_ok());

        drop(held);
    }
}

//! # Store Error Types
//!
//! Error types for allocation and persistence operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        keystone-core errors                │
//! │       │                             (CodecError, TransitionError)      │
//! │       ▼                                       │                          │
//! │  StoreError (this module) ◄───────────────────┘                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ERP API layer → caller                                                │
//! │                                                                         │
//! │  Nothing here is logged-and-ignored: a miscounted identifier corrupts  │
//! │  an audit trail. Only LockTimeout is meant for automatic retry.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use thiserror::Error;

use keystone_core::{CodecError, TransitionError};

/// Allocation and persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested allocation would exceed the counter ceiling.
    ///
    /// ## When This Occurs
    /// - `next`/`reserve_range` past `max_allowed`
    /// - A reset value beyond the ceiling
    ///
    /// Never partially applied: the counter is untouched.
    #[error(
        "sequence exhausted for {key}: requested {requested}, \
         last issued {last_issued}, ceiling {max_allowed}"
    )]
    Overflow {
        key: String,
        requested: u64,
        last_issued: u64,
        max_allowed: u64,
    },

    /// `peek`/`reset` on a key with no counter and no implicit creation.
    #[error("no counter exists for key {key}")]
    UnknownKey { key: String },

    /// Bounded wait for a counter lease expired.
    ///
    /// The one retryable error in this crate; callers should back off and
    /// retry, everything else needs business-level handling.
    #[error("timed out after {waited:?} waiting for lease on {key}")]
    LockTimeout { key: String, waited: Duration },

    /// Encode attempted with a supplier/model code absent from the registry.
    #[error("{kind} code '{code}' is not registered")]
    UnregisteredCode { kind: &'static str, code: String },

    /// `reserve_range` called with a zero quantity.
    #[error("range reservation requires quantity >= 1")]
    EmptyReservation,

    /// Barcode field failed to encode or decode.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Illegal lifecycle transition.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (e.g. duplicate barcode).
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Internal store error.
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether a caller may retry this operation automatically (with
    /// backoff). True only for lease timeouts.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::LockTimeout { .. })
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → StoreError::ConnectionFailed
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => {
                StoreError::ConnectionFailed("pool exhausted".to_string())
            }

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("pool is closed".to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_message_names_key_and_bounds() {
        let err = StoreError::Overflow {
            key: "SER/IEL/FS/AA/A".to_string(),
            requested: 2,
            last_issued: 999_998,
            max_allowed: 999_999,
        };
        let msg = err.to_string();
        assert!(msg.contains("SER/IEL/FS/AA/A"));
        assert!(msg.contains("999999"));
    }

    #[test]
    fn test_only_lock_timeout_is_retryable() {
        let timeout = StoreError::LockTimeout {
            key: "DOC/PO/25-26".to_string(),
            waited: Duration::from_secs(5),
        };
        assert!(timeout.is_retryable());

        let overflow = StoreError::Overflow {
            key: "k".to_string(),
            requested: 1,
            last_issued: 9,
            max_allowed: 9,
        };
        assert!(!overflow.is_retryable());
    }
}

//! # Code Registry
//!
//! Read-only lookups used to validate that a supplier/model code is
//! registered before it is encoded into a barcode. Registry CRUD belongs to
//! the wider ERP; this subsystem only asks "does this code exist?".

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::Database;
use crate::error::StoreResult;

// =============================================================================
// Trait
// =============================================================================

/// Registered-code lookups consumed by barcode minting.
#[async_trait]
pub trait CodeRegistry: Send + Sync {
    /// Is this 2-letter supplier code registered?
    async fn supplier_registered(&self, code: &str) -> StoreResult<bool>;

    /// Is this model code registered for the given item type?
    async fn model_registered(&self, code: &str, item_type: &str) -> StoreResult<bool>;
}

// =============================================================================
// SQLite Registry
// =============================================================================

/// Registry over the `supplier_codes` / `model_codes` tables.
#[derive(Clone)]
pub struct SqliteCodeRegistry {
    pool: SqlitePool,
}

impl SqliteCodeRegistry {
    pub fn new(db: &Database) -> Self {
        SqliteCodeRegistry {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl CodeRegistry for SqliteCodeRegistry {
    async fn supplier_registered(&self, code: &str) -> StoreResult<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM supplier_codes WHERE code = ?1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists != 0)
    }

    async fn model_registered(&self, code: &str, item_type: &str) -> StoreResult<bool> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM model_codes WHERE code = ?1 AND item_type = ?2)",
        )
        .bind(code)
        .bind(item_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists != 0)
    }
}

// =============================================================================
// In-Memory Registry
// =============================================================================

/// Builder-style registry for tests and embedded use.
///
/// ## Example
/// ```rust,ignore
/// let registry = MemoryCodeRegistry::new()
///     .with_supplier("FS")
///     .with_model("IEL", "appliance");
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryCodeRegistry {
    suppliers: HashSet<String>,
    models: HashSet<(String, String)>,
}

impl MemoryCodeRegistry {
    pub fn new() -> Self {
        MemoryCodeRegistry::default()
    }

    pub fn with_supplier(mut self, code: impl Into<String>) -> Self {
        self.suppliers.insert(code.into());
        self
    }

    pub fn with_model(mut self, code: impl Into<String>, item_type: impl Into<String>) -> Self {
        self.models.insert((code.into(), item_type.into()));
        self
    }
}

#[async_trait]
impl CodeRegistry for MemoryCodeRegistry {
    async fn supplier_registered(&self, code: &str) -> StoreResult<bool> {
        Ok(self.suppliers.contains(code))
    }

    async fn model_registered(&self, code: &str, item_type: &str) -> StoreResult<bool> {
        Ok(self
            .models
            .contains(&(code.to_string(), item_type.to_string())))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConfig;

    #[tokio::test]
    async fn test_memory_registry_lookups() {
        let registry = MemoryCodeRegistry::new()
            .with_supplier("FS")
            .with_model("IEL", "appliance");

        assert!(registry.supplier_registered("FS").await.unwrap());
        assert!(!registry.supplier_registered("ZZ").await.unwrap());
        assert!(registry.model_registered("IEL", "appliance").await.unwrap());
        assert!(!registry.model_registered("IEL", "spare").await.unwrap());
    }

    #[tokio::test]
    async fn test_sqlite_registry_lookups() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO supplier_codes (code, name) VALUES ('FS', 'FastSupply')")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO model_codes (code, item_type, name) VALUES ('IEL', 'appliance', 'Iso-Elite')")
            .execute(db.pool())
            .await
            .unwrap();

        let registry = SqliteCodeRegistry::new(&db);
        assert!(registry.supplier_registered("FS").await.unwrap());
        assert!(!registry.supplier_registered("QQ").await.unwrap());
        assert!(registry.model_registered("IEL", "appliance").await.unwrap());
        assert!(!registry.model_registered("XKQ", "appliance").await.unwrap());
    }
}

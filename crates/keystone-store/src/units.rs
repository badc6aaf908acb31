//! # Serial Unit Repository
//!
//! Persistence for issued barcodes: unit rows, append-only custody history,
//! guarded transitions, and the bulk export tuple stream.
//!
//! ## Transition Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              One Transition (per-unit atomicity)                        │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │ load unit row + history                                            │
//! │    ▼                                                                    │
//! │  core state machine validates the edge ── illegal? ROLLBACK, error     │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  UPDATE serial_units SET status, linkage ref, updated_at               │
//! │  INSERT serial_unit_history (from, to, at, actor, context)             │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Two different units never contend: no cross-unit locking exists.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use keystone_core::{IdentifierFields, SerialStatus, SerialUnit, TransitionRecord};

use crate::db::Database;
use crate::error::{StoreError, StoreResult};

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, FromRow)]
struct UnitRow {
    id: String,
    barcode: String,
    brand_prefix: String,
    supplier_code: String,
    year: i64,
    month: i64,
    model_code: String,
    serial: i64,
    status: SerialStatus,
    grn_ref: Option<String>,
    stock_ref: Option<String>,
    order_ref: Option<String>,
    created_at: DateTime<Utc>,
}

impl UnitRow {
    fn into_unit(self, history: Vec<TransitionRecord>) -> SerialUnit {
        SerialUnit {
            id: self.id,
            barcode: self.barcode,
            fields: IdentifierFields {
                brand_prefix: self.brand_prefix,
                supplier_code: self.supplier_code,
                year: self.year as i32,
                month: self.month as u32,
                model_code: self.model_code,
                serial: self.serial as u32,
            },
            status: self.status,
            grn_ref: self.grn_ref,
            stock_ref: self.stock_ref,
            order_ref: self.order_ref,
            created_at: self.created_at,
            history,
        }
    }
}

#[derive(Debug, FromRow)]
struct HistoryRow {
    from_status: SerialStatus,
    to_status: SerialStatus,
    at: DateTime<Utc>,
    actor_ref: String,
    context_ref: Option<String>,
}

impl From<HistoryRow> for TransitionRecord {
    fn from(row: HistoryRow) -> Self {
        TransitionRecord {
            from: row.from_status,
            to: row.to_status,
            at: row.at,
            actor_ref: row.actor_ref,
            context_ref: row.context_ref,
        }
    }
}

const SELECT_UNIT: &str = r#"
    SELECT id, barcode, brand_prefix, supplier_code, year, month,
           model_code, serial, status, grn_ref, stock_ref, order_ref,
           created_at
    FROM serial_units
"#;

const SELECT_HISTORY: &str = r#"
    SELECT from_status, to_status, at, actor_ref, context_ref
    FROM serial_unit_history
    WHERE unit_id = ?1
    ORDER BY at, id
"#;

// =============================================================================
// Export Record
// =============================================================================

/// One row of the bulk export stream consumed by reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitExportRecord {
    pub barcode: String,
    pub model_code: String,
    pub serial: u32,
    pub status: SerialStatus,
}

impl UnitExportRecord {
    /// Renders the record as one delimited line. The file format around
    /// these lines belongs to the reporting collaborator.
    pub fn delimited_line(&self, sep: char) -> String {
        format!(
            "{}{sep}{}{sep}{}{sep}{}",
            self.barcode,
            self.model_code,
            self.serial,
            self.status.as_str()
        )
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for serial unit persistence.
#[derive(Debug, Clone)]
pub struct SerialUnitRepository {
    pool: SqlitePool,
}

impl SerialUnitRepository {
    pub fn new(db: &Database) -> Self {
        SerialUnitRepository {
            pool: db.pool().clone(),
        }
    }

    /// Inserts a freshly minted batch, units and their issuance anchor
    /// records, in one transaction.
    pub async fn insert_minted(&self, units: &[SerialUnit]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for unit in units {
            sqlx::query(
                r#"
                INSERT INTO serial_units (
                    id, barcode, brand_prefix, supplier_code, year, month,
                    model_code, serial, status, grn_ref, stock_ref, order_ref,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
            )
            .bind(&unit.id)
            .bind(&unit.barcode)
            .bind(&unit.fields.brand_prefix)
            .bind(&unit.fields.supplier_code)
            .bind(unit.fields.year as i64)
            .bind(unit.fields.month as i64)
            .bind(&unit.fields.model_code)
            .bind(unit.fields.serial as i64)
            .bind(unit.status)
            .bind(&unit.grn_ref)
            .bind(&unit.stock_ref)
            .bind(&unit.order_ref)
            .bind(unit.created_at)
            .bind(unit.created_at)
            .execute(&mut *tx)
            .await?;

            for record in &unit.history {
                insert_history(&mut tx, &unit.id, record).await?;
            }
        }

        tx.commit().await?;
        debug!(count = units.len(), "inserted minted units");
        Ok(())
    }

    /// Loads a unit (with full custody history) by surrogate id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<SerialUnit>> {
        let row = sqlx::query_as::<_, UnitRow>(&format!("{SELECT_UNIT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let history = self.history(&row.id).await?;
                Ok(Some(row.into_unit(history)))
            }
            None => Ok(None),
        }
    }

    /// Loads a unit (with full custody history) by barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> StoreResult<Option<SerialUnit>> {
        let row = sqlx::query_as::<_, UnitRow>(&format!("{SELECT_UNIT} WHERE barcode = ?1"))
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let history = self.history(&row.id).await?;
                Ok(Some(row.into_unit(history)))
            }
            None => Ok(None),
        }
    }

    /// The unit's custody history, oldest first.
    pub async fn history(&self, unit_id: &str) -> StoreResult<Vec<TransitionRecord>> {
        let rows = sqlx::query_as::<_, HistoryRow>(SELECT_HISTORY)
            .bind(unit_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(TransitionRecord::from).collect())
    }

    /// Applies a guarded lifecycle transition in one transaction.
    ///
    /// The edge is validated by the core state machine; an illegal edge
    /// rolls back with [`StoreError::Transition`] and mutates nothing.
    /// The context reference is also captured on the unit's linkage slot
    /// for the states that define one (GRN on receipt, stock record on
    /// assignment, sales order on sale).
    pub async fn transition(
        &self,
        unit_id: &str,
        target: SerialStatus,
        actor_ref: &str,
        context_ref: Option<&str>,
    ) -> StoreResult<SerialUnit> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UnitRow>(&format!("{SELECT_UNIT} WHERE id = ?1"))
            .bind(unit_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("SerialUnit", unit_id))?;

        let history = sqlx::query_as::<_, HistoryRow>(SELECT_HISTORY)
            .bind(unit_id)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(TransitionRecord::from)
            .collect();

        let mut unit = row.into_unit(history);
        let now = Utc::now();
        unit.transition_to(target, actor_ref, context_ref, now)?;

        if let Some(context) = context_ref {
            match target {
                SerialStatus::Received => unit.grn_ref = Some(context.to_string()),
                SerialStatus::Assigned => unit.stock_ref = Some(context.to_string()),
                SerialStatus::Sold => unit.order_ref = Some(context.to_string()),
                _ => {}
            }
        }

        sqlx::query(
            r#"
            UPDATE serial_units SET
                status = ?2,
                grn_ref = ?3,
                stock_ref = ?4,
                order_ref = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(unit_id)
        .bind(unit.status)
        .bind(&unit.grn_ref)
        .bind(&unit.stock_ref)
        .bind(&unit.order_ref)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // The transition above appended exactly one record.
        if let Some(record) = unit.history.last() {
            insert_history(&mut tx, unit_id, record).await?;
        }

        tx.commit().await?;
        debug!(unit_id, status = unit.status.as_str(), "unit transitioned");
        Ok(unit)
    }

    /// Bulk export: `(barcode, model, serial, status)` per unit, optionally
    /// filtered by model code and/or status.
    pub async fn export(
        &self,
        model_code: Option<&str>,
        status: Option<SerialStatus>,
    ) -> StoreResult<Vec<UnitExportRecord>> {
        let rows = sqlx::query_as::<_, UnitRow>(&format!(
            "{SELECT_UNIT} \
             WHERE (?1 IS NULL OR model_code = ?1) \
               AND (?2 IS NULL OR status = ?2) \
             ORDER BY model_code, serial"
        ))
        .bind(model_code)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| UnitExportRecord {
                barcode: row.barcode,
                model_code: row.model_code,
                serial: row.serial as u32,
                status: row.status,
            })
            .collect())
    }
}

async fn insert_history(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    unit_id: &str,
    record: &TransitionRecord,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO serial_unit_history (
            id, unit_id, from_status, to_status, at, actor_ref, context_ref
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(unit_id)
    .bind(record.from)
    .bind(record.to)
    .bind(record.at)
    .bind(&record.actor_ref)
    .bind(&record.context_ref)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

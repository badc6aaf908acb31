//! # Batch Serial Minting
//!
//! Turns a mint request into a contiguous block of barcoded units.
//!
//! ## Mint Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    mint_batch(request)                                  │
//! │                                                                         │
//! │  1. field validation (brand, supplier, model, quantity)                 │
//! │  2. registry lookups ── unregistered code? reject, counter untouched   │
//! │  3. reserve_range on SER/{model}/{supplier}/{year}/{month}             │
//! │  4. encode one barcode per reserved serial                             │
//! │  5. insert units + issuance anchors in one transaction                 │
//! │                                                                         │
//! │  Everything that can fail cheaply fails BEFORE the range is taken,     │
//! │  so a rejected request never burns serial numbers.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use keystone_core::{
    alphabet, validation, BarcodeCodec, IdentifierFields, SequenceKey, SerialUnit,
};

use crate::allocator::SequenceAllocator;
use crate::error::{StoreError, StoreResult};
use crate::registry::CodeRegistry;
use crate::store::CounterStore;
use crate::units::SerialUnitRepository;

/// One request to mint a batch of serialized units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintRequest {
    pub brand_prefix: String,
    pub supplier_code: String,
    pub model_code: String,
    /// Registry scope for the model code (e.g. `"ELEVATOR"`).
    pub item_type: String,
    pub year: i32,
    /// Calendar month, 1..=12.
    pub month: u32,
    pub quantity: u64,
    pub actor_ref: String,
    /// Usually the purchase-order line the batch was raised against.
    pub context_ref: Option<String>,
}

/// Mints serial-numbered units: registry-checked, gap-free, persisted.
pub struct SerialMintService<S: CounterStore, R: CodeRegistry> {
    allocator: Arc<SequenceAllocator<S>>,
    registry: R,
    units: SerialUnitRepository,
}

impl<S: CounterStore, R: CodeRegistry> SerialMintService<S, R> {
    pub fn new(
        allocator: Arc<SequenceAllocator<S>>,
        registry: R,
        units: SerialUnitRepository,
    ) -> Self {
        SerialMintService {
            allocator,
            registry,
            units,
        }
    }

    /// Mints `request.quantity` consecutive units.
    ///
    /// Validation and registry lookups run before the range is reserved, so
    /// a rejected request leaves the serial counter untouched. The reserved
    /// block is then encoded and persisted at `Generated` in one
    /// transaction.
    pub async fn mint_batch(&self, request: &MintRequest) -> StoreResult<Vec<SerialUnit>> {
        if request.quantity == 0 {
            return Err(StoreError::EmptyReservation);
        }
        validation::validate_brand_prefix(&request.brand_prefix)?;
        validation::validate_supplier_code(&request.supplier_code)?;
        validation::validate_model_code(&request.model_code)?;

        if !self
            .registry
            .supplier_registered(&request.supplier_code)
            .await?
        {
            return Err(StoreError::UnregisteredCode {
                kind: "supplier",
                code: request.supplier_code.clone(),
            });
        }
        if !self
            .registry
            .model_registered(&request.model_code, &request.item_type)
            .await?
        {
            return Err(StoreError::UnregisteredCode {
                kind: "model",
                code: request.model_code.clone(),
            });
        }

        let year_code = alphabet::year_code(request.year)?;
        let month_code = alphabet::month_code(request.month)?;
        let key = SequenceKey::for_serial(
            &request.model_code,
            &request.supplier_code,
            &year_code,
            month_code,
        );

        let (start, end) = self.allocator.reserve_range(&key, request.quantity).await?;

        let minted_at = Utc::now();
        let mut units = Vec::with_capacity(request.quantity as usize);
        for serial in start..=end {
            let fields = IdentifierFields::new(
                &request.brand_prefix,
                &request.supplier_code,
                request.year,
                request.month,
                &request.model_code,
                serial as u32,
            )?;
            let barcode = BarcodeCodec::encode(&fields)?;
            units.push(SerialUnit::mint(
                barcode,
                fields,
                &request.actor_ref,
                request.context_ref.as_deref(),
                minted_at,
            ));
        }

        self.units.insert_minted(&units).await?;
        info!(
            key = %key,
            start,
            end,
            model = %request.model_code,
            "minted serial batch"
        );
        Ok(units)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, DbConfig};
    use crate::memory::MemoryCounterStore;
    use crate::registry::MemoryCodeRegistry;
    use keystone_core::SerialStatus;

    async fn service() -> SerialMintService<MemoryCounterStore, MemoryCodeRegistry> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let allocator = Arc::new(SequenceAllocator::new(MemoryCounterStore::new()));
        let registry = MemoryCodeRegistry::new()
            .with_supplier("FS")
            .with_model("IEL", "ELEVATOR");
        SerialMintService::new(allocator, registry, SerialUnitRepository::new(&db))
    }

    fn request(quantity: u64) -> MintRequest {
        MintRequest {
            brand_prefix: "AP".to_string(),
            supplier_code: "FS".to_string(),
            model_code: "IEL".to_string(),
            item_type: "ELEVATOR".to_string(),
            year: 2026,
            month: 1,
            quantity,
            actor_ref: "user-1".to_string(),
            context_ref: Some("po-line-9".to_string()),
        }
    }

    #[tokio::test]
    async fn test_batch_mint_is_contiguous_and_persisted() {
        let svc = service().await;
        let units = svc.mint_batch(&request(3)).await.unwrap();

        assert_eq!(units.len(), 3);
        assert_eq!(units[0].barcode, "APFSAAAIEL000001");
        assert_eq!(units[2].barcode, "APFSAAAIEL000003");
        assert!(units.iter().all(|u| u.status == SerialStatus::Generated));

        let loaded = svc
            .units
            .get_by_barcode("APFSAAAIEL000002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.fields.serial, 2);
        assert_eq!(loaded.history.len(), 1);

        // A second batch continues where the first ended.
        let more = svc.mint_batch(&request(2)).await.unwrap();
        assert_eq!(more[0].fields.serial, 4);
        assert_eq!(more[1].fields.serial, 5);
    }

    #[tokio::test]
    async fn test_unregistered_supplier_is_rejected_without_burning_serials() {
        let svc = service().await;
        let mut req = request(2);
        req.supplier_code = "ZZ".to_string();

        let err = svc.mint_batch(&req).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnregisteredCode { kind: "supplier", .. }
        ));

        // The rejected request must not have created or advanced a counter.
        let units = svc.mint_batch(&request(1)).await.unwrap();
        assert_eq!(units[0].fields.serial, 1);
    }

    #[tokio::test]
    async fn test_unregistered_model_scope_is_rejected() {
        let svc = service().await;
        let mut req = request(1);
        req.item_type = "ESCALATOR".to_string();

        let err = svc.mint_batch(&req).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnregisteredCode { kind: "model", .. }
        ));
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let svc = service().await;
        let err = svc.mint_batch(&request(0)).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyReservation));
    }

    #[test]
    fn test_request_json_round_trip() {
        let req = request(3);
        let json = serde_json::to_string(&req).unwrap();
        let back: MintRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.model_code, "IEL");
        assert_eq!(back.quantity, 3);
        assert_eq!(back.context_ref.as_deref(), Some("po-line-9"));
    }

    #[tokio::test]
    async fn test_invalid_month_fails_before_allocation() {
        let svc = service().await;
        let mut req = request(1);
        req.month = 13;

        let err = svc.mint_batch(&req).await.unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));

        let units = svc.mint_batch(&request(1)).await.unwrap();
        assert_eq!(units[0].fields.serial, 1);
    }
}

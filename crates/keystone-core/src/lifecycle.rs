//! # Serial Unit Lifecycle
//!
//! The finite, guarded set of status transitions one issued barcode passes
//! through from issuance to disposition.
//!
//! ## Transition Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Serial Unit State Machine                            │
//! │                                                                         │
//! │   GENERATED ──► PRINTED ──► SENT_TO_VENDOR ──► RECEIVED ──► ASSIGNED   │
//! │       │    └────────────────────►│                 │            │       │
//! │       │            │             │                 ▼            ▼       │
//! │       └────────────┴────────────►CANCELLED      DAMAGED ◄─── (DAMAGED) │
//! │                                                                 │       │
//! │                                                                 ▼       │
//! │                                    RETURNED ◄─────────────── SOLD      │
//! │                                     │    │                              │
//! │                                     ▼    ▼                              │
//! │                                ASSIGNED  DAMAGED                        │
//! │                                                                         │
//! │   Terminal: CANCELLED, DAMAGED                                          │
//! │   Every successful transition appends a custody record; a failed        │
//! │   attempt never mutates the unit.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Post-Sale Returns
//! SOLD → RETURNED is a deliberate extension of the observed behavior: the
//! status enumeration referenced returns but defined no edge. A returned
//! unit can be restocked (RETURNED → ASSIGNED) or written off
//! (RETURNED → DAMAGED). See DESIGN.md.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::codec::IdentifierFields;
use crate::error::TransitionError;

// =============================================================================
// Serial Status
// =============================================================================

/// Status of one issued barcode.
///
/// A closed tagged-variant type; the snake_case string form exists only at
/// the persistence/transport boundary, never inside transition logic.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SerialStatus {
    /// Barcode minted, label not yet produced.
    Generated,
    /// Label printed in-house.
    Printed,
    /// Label dispatched to the vendor for application.
    SentToVendor,
    /// Physical unit received against a GRN.
    Received,
    /// Unit assigned to a stock location.
    Assigned,
    /// Unit sold to a customer.
    Sold,
    /// Sold unit returned by the customer.
    Returned,
    /// Barcode voided before receipt (terminal).
    Cancelled,
    /// Unit damaged and written off (terminal).
    Damaged,
}

impl SerialStatus {
    /// All variants, in lifecycle order. Used by closure tests and exports.
    pub const ALL: [SerialStatus; 9] = [
        SerialStatus::Generated,
        SerialStatus::Printed,
        SerialStatus::SentToVendor,
        SerialStatus::Received,
        SerialStatus::Assigned,
        SerialStatus::Sold,
        SerialStatus::Returned,
        SerialStatus::Cancelled,
        SerialStatus::Damaged,
    ];

    /// The legal targets from this status. Everything else is an
    /// [`TransitionError`].
    pub fn allowed_targets(self) -> &'static [SerialStatus] {
        use SerialStatus::*;
        match self {
            Generated => &[Printed, SentToVendor, Cancelled],
            Printed => &[SentToVendor, Cancelled],
            SentToVendor => &[Received, Cancelled],
            Received => &[Assigned, Damaged],
            Assigned => &[Sold, Damaged],
            Sold => &[Returned],
            Returned => &[Assigned, Damaged],
            Cancelled | Damaged => &[],
        }
    }

    /// Whether `target` is reachable in one step from this status.
    pub fn can_transition_to(self, target: SerialStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Terminal statuses have no outgoing edges.
    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Boundary string form (matches the serde/sqlx snake_case rendering).
    pub fn as_str(self) -> &'static str {
        use SerialStatus::*;
        match self {
            Generated => "generated",
            Printed => "printed",
            SentToVendor => "sent_to_vendor",
            Received => "received",
            Assigned => "assigned",
            Sold => "sold",
            Returned => "returned",
            Cancelled => "cancelled",
            Damaged => "damaged",
        }
    }
}

// =============================================================================
// Transition Record
// =============================================================================

/// One entry in a unit's append-only custody history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransitionRecord {
    /// Status before the transition. Equal to `to` for the issuance anchor
    /// record written when the unit is minted.
    pub from: SerialStatus,

    /// Status after the transition.
    pub to: SerialStatus,

    /// When the transition was applied.
    pub at: DateTime<Utc>,

    /// Who applied it (opaque user/system reference).
    pub actor_ref: String,

    /// What business event drove it (opaque: GRN id, sale id, ...).
    pub context_ref: Option<String>,
}

// =============================================================================
// Serial Unit
// =============================================================================

/// One physical item's issued barcode and its lifecycle state.
///
/// The linkage references are opaque foreign keys owned by external
/// collaborators: stored and carried, never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SerialUnit {
    /// Surrogate id (UUID v4).
    pub id: String,

    /// The encoded barcode string (unique).
    pub barcode: String,

    /// Decomposed semantic payload of the barcode.
    pub fields: IdentifierFields,

    /// Current lifecycle status.
    pub status: SerialStatus,

    /// Receiving document reference, set on receipt.
    pub grn_ref: Option<String>,

    /// Stock record reference, set on assignment.
    pub stock_ref: Option<String>,

    /// Sales order reference, set on sale.
    pub order_ref: Option<String>,

    /// When the barcode was minted.
    pub created_at: DateTime<Utc>,

    /// Append-only custody history, oldest first.
    pub history: Vec<TransitionRecord>,
}

impl SerialUnit {
    /// Mints a new unit at `Generated`, with an issuance anchor record so
    /// the custody chain starts at creation.
    pub fn mint(
        barcode: String,
        fields: IdentifierFields,
        actor_ref: &str,
        context_ref: Option<&str>,
        at: DateTime<Utc>,
    ) -> Self {
        SerialUnit {
            id: Uuid::new_v4().to_string(),
            barcode,
            fields,
            status: SerialStatus::Generated,
            grn_ref: None,
            stock_ref: None,
            order_ref: None,
            created_at: at,
            history: vec![TransitionRecord {
                from: SerialStatus::Generated,
                to: SerialStatus::Generated,
                at,
                actor_ref: actor_ref.to_string(),
                context_ref: context_ref.map(str::to_string),
            }],
        }
    }

    /// Applies a guarded transition.
    ///
    /// Verifies the edge is legal for the current status; on failure returns
    /// [`TransitionError`] naming both states and mutates nothing. On success,
    /// updates the status and appends a custody record.
    pub fn transition_to(
        &mut self,
        target: SerialStatus,
        actor_ref: &str,
        context_ref: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(target) {
            return Err(TransitionError {
                from: self.status,
                to: target,
            });
        }
        self.history.push(TransitionRecord {
            from: self.status,
            to: target,
            at,
            actor_ref: actor_ref.to_string(),
            context_ref: context_ref.map(str::to_string),
        });
        self.status = target;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> SerialUnit {
        let fields = IdentifierFields::new("AP", "FS", 2026, 1, "IEL", 1).unwrap();
        SerialUnit::mint(
            "APFSAAAIEL000001".to_string(),
            fields,
            "user-1",
            Some("po-line-9"),
            Utc::now(),
        )
    }

    #[test]
    fn test_mint_starts_generated_with_anchor_record() {
        let u = unit();
        assert_eq!(u.status, SerialStatus::Generated);
        assert_eq!(u.history.len(), 1);
        assert_eq!(u.history[0].to, SerialStatus::Generated);
        assert_eq!(u.history[0].actor_ref, "user-1");
    }

    #[test]
    fn test_happy_path_to_sold() {
        let mut u = unit();
        let now = Utc::now();
        for target in [
            SerialStatus::Printed,
            SerialStatus::SentToVendor,
            SerialStatus::Received,
            SerialStatus::Assigned,
            SerialStatus::Sold,
        ] {
            u.transition_to(target, "user-1", None, now).unwrap();
            assert_eq!(u.status, target);
        }
        // anchor + 5 transitions
        assert_eq!(u.history.len(), 6);
    }

    #[test]
    fn test_received_cannot_go_back_to_vendor() {
        let mut u = unit();
        let now = Utc::now();
        u.transition_to(SerialStatus::SentToVendor, "user-1", None, now)
            .unwrap();
        u.transition_to(SerialStatus::Received, "user-1", Some("grn-1"), now)
            .unwrap();

        let err = u
            .transition_to(SerialStatus::SentToVendor, "user-1", None, now)
            .unwrap_err();
        assert_eq!(err.from, SerialStatus::Received);
        assert_eq!(err.to, SerialStatus::SentToVendor);
        // Failed attempt must not mutate status or history
        assert_eq!(u.status, SerialStatus::Received);
        assert_eq!(u.history.len(), 3);
    }

    #[test]
    fn test_transition_closure_matches_table() {
        // From every state, exactly the enumerated targets succeed.
        let now = Utc::now();
        for from in SerialStatus::ALL {
            for to in SerialStatus::ALL {
                let mut u = unit();
                u.status = from;
                let result = u.transition_to(to, "user-1", None, now);
                if from.allowed_targets().contains(&to) {
                    assert!(result.is_ok(), "{from:?} -> {to:?} should succeed");
                } else {
                    assert!(result.is_err(), "{from:?} -> {to:?} should fail");
                    assert_eq!(u.status, from);
                }
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(SerialStatus::Cancelled.is_terminal());
        assert!(SerialStatus::Damaged.is_terminal());
        assert!(!SerialStatus::Sold.is_terminal()); // Sold → Returned exists
        assert!(!SerialStatus::Generated.is_terminal());
    }

    #[test]
    fn test_sold_unit_can_be_returned_and_restocked() {
        let mut u = unit();
        u.status = SerialStatus::Sold;
        let now = Utc::now();
        u.transition_to(SerialStatus::Returned, "user-2", Some("rma-7"), now)
            .unwrap();
        u.transition_to(SerialStatus::Assigned, "user-2", None, now)
            .unwrap();
        assert_eq!(u.status, SerialStatus::Assigned);
    }

    #[test]
    fn test_status_serde_is_snake_case() {
        let json = serde_json::to_string(&SerialStatus::SentToVendor).unwrap();
        assert_eq!(json, "\"sent_to_vendor\"");
        let back: SerialStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SerialStatus::SentToVendor);
    }
}

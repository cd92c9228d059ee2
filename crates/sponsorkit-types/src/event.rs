//! Settlement events delivered by the payment processor
//!
//! Delivery is at-least-once: the same logical event may arrive any number
//! of times, and `external id -> applied once` is enforced by the
//! reconciler. Amounts are in processor minor
//! units (cents) and reflect what actually moved.

use serde::{Deserialize, Serialize};

use crate::identity::{DealId, ExternalEventId, PaymentIntentId, PayoutAccountId};

/// A verified, parsed event from the payment processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementEvent {
    /// Globally unique per logical event
    pub event_id: ExternalEventId,
    pub kind: SettlementEventKind,
}

/// What happened at the processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettlementEventKind {
    /// Charge executed; funds split between platform and creator
    ChargeSucceeded {
        deal_id: DealId,
        payment_intent_id: PaymentIntentId,
        /// Gross amount charged, in minor units
        gross_minor: i64,
        /// Platform fee retained, in minor units
        fee_minor: i64,
    },
    /// Charge attempt failed; the brand may retry the payment intent
    ChargeFailed {
        deal_id: DealId,
        reason: Option<String>,
    },
    /// Connected payout account status changed
    AccountUpdated {
        account_id: PayoutAccountId,
        charges_enabled: bool,
        payouts_enabled: bool,
        details_submitted: bool,
    },
    /// Transfer to the creator's connected account was created
    TransferCreated {
        destination: PayoutAccountId,
        amount_minor: i64,
    },
    /// Money landed in the creator's bank
    PayoutPaid { amount_minor: i64 },
    /// Delivered but not handled by this core
    Unknown { kind: String },
}

impl SettlementEventKind {
    /// Whether this kind mutates deal or creator state
    pub fn is_state_changing(&self) -> bool {
        matches!(
            self,
            Self::ChargeSucceeded { .. } | Self::AccountUpdated { .. }
        )
    }
}

//! Deal types for Sponsorkit
//!
//! A deal is a contracted engagement between one brand and one creator
//! with an agreed amount and deliverables. Its status only changes through
//! the transition validator in `sponsorkit-deals`; the fee snapshot taken
//! at creation is never recomputed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::{BrandId, CreatorId, DealId, PaymentIntentId};

/// Status of a deal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    /// Created by the brand, waiting for the creator
    Pending,
    /// Accepted by the creator
    Accepted,
    /// Creator is producing the deliverables
    InProgress,
    /// Deliverables done, waiting for the brand to pay
    Completed,
    /// Settlement confirmed by the payment processor
    Paid,
    /// Declined by the creator
    Rejected,
    /// Withdrawn by the brand
    Cancelled,
}

impl DealStatus {
    /// Whether no transition is legal out of this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Rejected | Self::Cancelled)
    }

    /// Wire/display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Paid => "paid",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of a deal an actor is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Creator,
    Brand,
    Admin,
}

/// Resolved caller identity
///
/// Authentication happens upstream; this core only authorizes based on
/// role and ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    Creator(CreatorId),
    Brand(BrandId),
    Admin,
}

impl Actor {
    pub fn role(&self) -> ActorRole {
        match self {
            Self::Creator(_) => ActorRole::Creator,
            Self::Brand(_) => ActorRole::Brand,
            Self::Admin => ActorRole::Admin,
        }
    }
}

/// Exclusivity window agreed in a deal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusivity {
    None,
    Category { days: u32 },
    Full { days: u32 },
}

impl Default for Exclusivity {
    fn default() -> Self {
        Self::None
    }
}

/// Immutable business terms of a deal
///
/// Not part of the lifecycle core; these round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealTerms {
    /// Ordered list of agreed deliverables
    pub deliverables: Vec<String>,
    /// Free-form description of the engagement
    pub description: Option<String>,
    /// Delivery window, e.g. "14 days"
    pub delivery_window: Option<String>,
    /// Usage rights granted to the brand
    pub usage_rights: Option<String>,
    /// Exclusivity period
    pub exclusivity: Exclusivity,
    /// Number of revision rounds included
    pub revision_rounds: u8,
    /// Brief text supplied by the brand
    pub brief_text: Option<String>,
    /// Agreed due date
    pub due_date: Option<DateTime<Utc>>,
}

/// A sponsorship deal between one brand and one creator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    /// Unique deal ID
    pub id: DealId,
    /// Creator party (immutable after creation)
    pub creator_id: CreatorId,
    /// Brand party (immutable after creation)
    pub brand_id: BrandId,
    /// Agreed amount in dollars
    pub deal_amount: Decimal,
    /// Platform fee rate frozen at creation, in percent (e.g. 18)
    pub platform_fee_percent: Decimal,
    /// Platform fee amount frozen at creation, rounded half-up to cents
    pub platform_fee_amount: Decimal,
    /// Current lifecycle status
    pub status: DealStatus,
    /// Business terms
    pub terms: DealTerms,
    /// When the deal was created
    pub created_at: DateTime<Utc>,
    /// Set exactly once, when the deal first becomes completed or paid
    pub completed_at: Option<DateTime<Utc>>,
    /// Payment intent at the processor; set once, never overwritten
    pub payment_intent_id: Option<PaymentIntentId>,
}

impl Deal {
    /// Net amount routed to the creator once the deal settles
    pub fn creator_payout(&self) -> Decimal {
        self.deal_amount - self.platform_fee_amount
    }
}

/// Request to create a deal (brand action)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDealRequest {
    pub creator_id: CreatorId,
    pub deal_amount: Decimal,
    #[serde(default)]
    pub terms: DealTerms,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_terminal_statuses() {
        assert!(DealStatus::Paid.is_terminal());
        assert!(DealStatus::Rejected.is_terminal());
        assert!(DealStatus::Cancelled.is_terminal());
        assert!(!DealStatus::Pending.is_terminal());
        assert!(!DealStatus::Completed.is_terminal());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(DealStatus::InProgress.to_string(), "in_progress");
        let json = serde_json::to_string(&DealStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_creator_payout() {
        let deal = Deal {
            id: DealId::new(),
            creator_id: CreatorId::new(),
            brand_id: BrandId::new(),
            deal_amount: dec!(5000),
            platform_fee_percent: dec!(18),
            platform_fee_amount: dec!(900.00),
            status: DealStatus::Pending,
            terms: DealTerms::default(),
            created_at: Utc::now(),
            completed_at: None,
            payment_intent_id: None,
        };
        assert_eq!(deal.creator_payout(), dec!(4100.00));
    }
}

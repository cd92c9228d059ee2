//! Creator types for Sponsorkit

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::{CreatorId, PayoutAccountId};

/// Fee tier of a creator, ordered by cumulative earnings
///
/// The band boundaries and rates live in `sponsorkit-fees`; this enum is
/// just the name of the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeTier {
    Launch,
    Growth,
    Scale,
    Partner,
}

impl FeeTier {
    /// Wire/display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Launch => "launch",
            Self::Growth => "growth",
            Self::Scale => "scale",
            Self::Partner => "partner",
        }
    }

    /// The tier above this one, if any
    pub fn next(&self) -> Option<FeeTier> {
        match self {
            Self::Launch => Some(Self::Growth),
            Self::Growth => Some(Self::Scale),
            Self::Scale => Some(Self::Partner),
            Self::Partner => None,
        }
    }
}

impl Default for FeeTier {
    fn default() -> Self {
        Self::Launch
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Readiness of a creator's connected payout account
///
/// Mirrors the flags the payment processor reports on account updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutReadiness {
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub details_submitted: bool,
}

impl PayoutReadiness {
    /// The account can both take charges and receive payouts
    pub fn is_active(&self) -> bool {
        self.charges_enabled && self.payouts_enabled
    }
}

/// A creator on the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    /// Unique creator ID
    pub id: CreatorId,
    /// Public handle
    pub username: String,
    /// Connected payout account at the processor; None means the creator
    /// cannot receive settlements yet
    pub payout_account_id: Option<PayoutAccountId>,
    /// Readiness flags of the connected account
    pub payout_readiness: PayoutReadiness,
    /// Lifetime earnings credited by confirmed settlements; never decreases
    pub cumulative_earnings: Decimal,
    /// Current fee tier; derived from earnings, admin override allowed
    pub fee_tier: FeeTier,
    /// When the creator joined
    pub created_at: DateTime<Utc>,
}

impl Creator {
    /// Create a creator with no earnings at the entry tier
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: CreatorId::new(),
            username: username.into(),
            payout_account_id: None,
            payout_readiness: PayoutReadiness::default(),
            cumulative_earnings: Decimal::ZERO,
            fee_tier: FeeTier::default(),
            created_at: Utc::now(),
        }
    }
}

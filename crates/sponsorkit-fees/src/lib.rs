//! Sponsorkit Fee Policy
//!
//! Maps a creator's cumulative lifetime earnings to a fee tier and the
//! platform's percentage cut. This module is the single source of truth
//! for the band table; deal creation and settlement both call it rather
//! than carrying their own copies.
//!
//! # Fee Structure
//!
//! | Tier    | Lifetime earnings | Fee  |
//! |---------|-------------------|------|
//! | Launch  | $0 - $10K         | 18 % |
//! | Growth  | $10K - $50K       | 15 % |
//! | Scale   | $50K - $100K      | 12 % |
//! | Partner | $100K+            | 10 % |
//!
//! Band lower bounds are inclusive. The policy is pure and total over
//! non-negative input; negative earnings are a precondition violation.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use sponsorkit_types::{round2, FeeTier, PlatformError, Result};

/// One band of the fee table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBand {
    pub tier: FeeTier,
    /// Inclusive lower bound of lifetime earnings, in dollars
    pub lower_bound: Decimal,
    /// Platform cut, in percent
    pub fee_percent: Decimal,
}

/// The canonical ordered band table
pub fn bands() -> [FeeBand; 4] {
    [
        FeeBand {
            tier: FeeTier::Launch,
            lower_bound: Decimal::ZERO,
            fee_percent: dec!(18),
        },
        FeeBand {
            tier: FeeTier::Growth,
            lower_bound: dec!(10_000),
            fee_percent: dec!(15),
        },
        FeeBand {
            tier: FeeTier::Scale,
            lower_bound: dec!(50_000),
            fee_percent: dec!(12),
        },
        FeeBand {
            tier: FeeTier::Partner,
            lower_bound: dec!(100_000),
            fee_percent: dec!(10),
        },
    ]
}

/// A tier with its fee rate, as derived from earnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAssignment {
    pub tier: FeeTier,
    pub fee_percent: Decimal,
}

/// Determine the tier and fee rate for a creator's cumulative earnings
pub fn tier_for(cumulative_earnings: Decimal) -> Result<TierAssignment> {
    if cumulative_earnings.is_sign_negative() {
        return Err(PlatformError::invalid_argument(
            "cumulative_earnings",
            "must not be negative",
        ));
    }

    let band = bands()
        .into_iter()
        .rev()
        .find(|band| cumulative_earnings >= band.lower_bound)
        .unwrap_or_else(|| bands()[0]);

    Ok(TierAssignment {
        tier: band.tier,
        fee_percent: band.fee_percent,
    })
}

/// Inverse lookup: the fee rate of a given tier
///
/// Used when an administrator sets a tier directly.
pub fn fee_percent_for(tier: FeeTier) -> Decimal {
    bands()
        .into_iter()
        .find(|band| band.tier == tier)
        .map(|band| band.fee_percent)
        .unwrap_or_else(|| bands()[0].fee_percent)
}

/// Inclusive lower earnings bound of a tier
pub fn lower_bound(tier: FeeTier) -> Decimal {
    bands()
        .into_iter()
        .find(|band| band.tier == tier)
        .map(|band| band.lower_bound)
        .unwrap_or(Decimal::ZERO)
}

/// Platform fee for a deal amount at a frozen fee rate
///
/// `round2(deal_amount * fee_percent / 100)`, half-up.
pub fn platform_fee(deal_amount: Decimal, fee_percent: Decimal) -> Decimal {
    round2(deal_amount * fee_percent / dec!(100))
}

/// Progress through the current tier, 0-100
///
/// Linear interpolation between the current band's lower bound and the
/// next band's lower bound. Partner always reports 100.
pub fn progress_within_tier(cumulative_earnings: Decimal) -> Result<u8> {
    let assignment = tier_for(cumulative_earnings)?;

    let next = match assignment.tier.next() {
        Some(next) => next,
        None => return Ok(100),
    };

    let floor = lower_bound(assignment.tier);
    let ceiling = lower_bound(next);
    let fraction = (cumulative_earnings - floor) / (ceiling - floor) * dec!(100);

    Ok(fraction.round().to_u8().unwrap_or(100).min(100))
}

/// Tier progress report for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProgress {
    pub tier: FeeTier,
    pub fee_percent: Decimal,
    /// 0-100 within the current band
    pub percent_within_tier: u8,
    pub next_tier: Option<FeeTier>,
    /// Earnings still needed to reach the next tier
    pub remaining_to_next: Option<Decimal>,
}

/// Assemble the progress report for a creator's earnings
pub fn tier_progress(cumulative_earnings: Decimal) -> Result<TierProgress> {
    let assignment = tier_for(cumulative_earnings)?;
    let next_tier = assignment.tier.next();
    let remaining_to_next = next_tier.map(|next| lower_bound(next) - cumulative_earnings);

    Ok(TierProgress {
        tier: assignment.tier,
        fee_percent: assignment.fee_percent,
        percent_within_tier: progress_within_tier(cumulative_earnings)?,
        next_tier,
        remaining_to_next,
    })
}

//! Sponsorkit Store - persistence seam
//!
//! The lifecycle core consumes persistence through these traits and only
//! relies on three atomic primitives:
//!
//! 1. update-with-precondition on a deal's status (compare-and-swap)
//! 2. atomic increment of a creator's cumulative earnings
//! 3. check-and-record of a processed external event id, exactly once
//!
//! Any backend with per-record atomic updates (a transactional database, a
//! unique constraint on the event id) can implement them. The in-memory
//! implementations in [`memory`] hold each mutation under a single write
//! lock and are what the tests and demo wiring run on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use sponsorkit_types::{
    BrandId, Creator, CreatorId, Deal, DealId, DealStatus, ExternalEventId, PaymentIntentId,
    PayoutAccountId, PayoutReadiness, Result,
};

pub mod memory;

pub use memory::{MemoryCreatorStore, MemoryDealStore, MemoryEventStore};

/// Deal persistence
#[async_trait]
pub trait DealStore: Send + Sync {
    /// Persist a new deal
    async fn insert(&self, deal: Deal) -> Result<()>;

    /// Fetch a deal by id
    async fn get(&self, deal_id: &DealId) -> Result<Deal>;

    /// Deals owned by a brand, newest first
    async fn list_by_brand(&self, brand_id: &BrandId) -> Result<Vec<Deal>>;

    /// Deals assigned to a creator, newest first
    async fn list_by_creator(&self, creator_id: &CreatorId) -> Result<Vec<Deal>>;

    /// Move a deal's status, conditional on its current status
    ///
    /// Fails with `InvalidTransition` (carrying the status actually found)
    /// when the precondition no longer holds, so the loser of a race
    /// observes the same error as an illegal request. When `completed_at`
    /// is given it is stamped only if the deal has none yet.
    async fn update_status(
        &self,
        deal_id: &DealId,
        expected: DealStatus,
        to: DealStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Deal>;

    /// Attach a payment intent to a deal, once
    ///
    /// Returns the intent id now on the record: the given one if the slot
    /// was empty, the previously stored one otherwise. A stored id is
    /// never overwritten.
    async fn set_payment_intent_id(
        &self,
        deal_id: &DealId,
        intent_id: PaymentIntentId,
    ) -> Result<PaymentIntentId>;
}

/// Creator persistence
#[async_trait]
pub trait CreatorStore: Send + Sync {
    /// Persist a new creator
    async fn insert(&self, creator: Creator) -> Result<()>;

    /// Fetch a creator by id
    async fn get(&self, creator_id: &CreatorId) -> Result<Creator>;

    /// Atomically add a confirmed settlement's net amount to the
    /// creator's cumulative earnings; returns the new total
    async fn credit_earnings(&self, creator_id: &CreatorId, net: Decimal) -> Result<Decimal>;

    /// Set the creator's fee tier (administrative; may lower it)
    async fn set_fee_tier(
        &self,
        creator_id: &CreatorId,
        tier: sponsorkit_types::FeeTier,
    ) -> Result<()>;

    /// Raise the creator's fee tier to `tier` if it is higher than the
    /// stored one; returns the tier now on the record
    ///
    /// The comparison and write happen atomically, so concurrent
    /// settlements can never lower a tier between each other's reads and
    /// writes.
    async fn promote_fee_tier(
        &self,
        creator_id: &CreatorId,
        tier: sponsorkit_types::FeeTier,
    ) -> Result<sponsorkit_types::FeeTier>;

    /// Link a payout account, once
    ///
    /// Returns the account id now on the record, mirroring
    /// [`DealStore::set_payment_intent_id`].
    async fn set_payout_account(
        &self,
        creator_id: &CreatorId,
        account_id: PayoutAccountId,
    ) -> Result<PayoutAccountId>;

    /// Update payout readiness flags for the creator owning the given
    /// account; returns the creator id, or None when no creator has
    /// linked that account
    async fn update_payout_readiness(
        &self,
        account_id: &PayoutAccountId,
        readiness: PayoutReadiness,
    ) -> Result<Option<CreatorId>>;
}

/// Dedup store for processed settlement events
#[async_trait]
pub trait ProcessedEventStore: Send + Sync {
    /// Reserve an event id for processing
    ///
    /// Returns true exactly once per id across all callers; every later
    /// reservation of the same id returns false. Two processes must never
    /// both win.
    async fn reserve(&self, event_id: &ExternalEventId) -> Result<bool>;

    /// Roll back a reservation after a failed apply so redelivery can
    /// retry
    async fn release(&self, event_id: &ExternalEventId) -> Result<()>;

    /// Whether the event id has a live reservation
    async fn is_processed(&self, event_id: &ExternalEventId) -> Result<bool>;
}

//! In-memory store implementations
//!
//! Thread-safe reference implementations of the persistence traits. Every
//! mutation runs under a single write lock, which is what gives the CAS
//! and increment operations their atomicity.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use sponsorkit_types::{
    BrandId, Creator, CreatorId, Deal, DealId, DealStatus, ExternalEventId, PaymentIntentId,
    PayoutAccountId, PayoutReadiness, PlatformError, Result,
};

use crate::{CreatorStore, DealStore, ProcessedEventStore};

/// In-memory deal store
#[derive(Clone, Default)]
pub struct MemoryDealStore {
    deals: Arc<RwLock<HashMap<DealId, Deal>>>,
}

impl MemoryDealStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DealStore for MemoryDealStore {
    async fn insert(&self, deal: Deal) -> Result<()> {
        self.deals.write().await.insert(deal.id, deal);
        Ok(())
    }

    async fn get(&self, deal_id: &DealId) -> Result<Deal> {
        self.deals
            .read()
            .await
            .get(deal_id)
            .cloned()
            .ok_or_else(|| PlatformError::DealNotFound {
                deal_id: deal_id.to_string(),
            })
    }

    async fn list_by_brand(&self, brand_id: &BrandId) -> Result<Vec<Deal>> {
        let deals = self.deals.read().await;
        let mut found: Vec<Deal> = deals
            .values()
            .filter(|deal| deal.brand_id == *brand_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn list_by_creator(&self, creator_id: &CreatorId) -> Result<Vec<Deal>> {
        let deals = self.deals.read().await;
        let mut found: Vec<Deal> = deals
            .values()
            .filter(|deal| deal.creator_id == *creator_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update_status(
        &self,
        deal_id: &DealId,
        expected: DealStatus,
        to: DealStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Deal> {
        let mut deals = self.deals.write().await;
        let deal = deals
            .get_mut(deal_id)
            .ok_or_else(|| PlatformError::DealNotFound {
                deal_id: deal_id.to_string(),
            })?;

        if deal.status != expected {
            return Err(PlatformError::InvalidTransition {
                from: deal.status,
                requested: to,
            });
        }

        deal.status = to;
        if deal.completed_at.is_none() {
            if let Some(stamp) = completed_at {
                deal.completed_at = Some(stamp);
            }
        }
        Ok(deal.clone())
    }

    async fn set_payment_intent_id(
        &self,
        deal_id: &DealId,
        intent_id: PaymentIntentId,
    ) -> Result<PaymentIntentId> {
        let mut deals = self.deals.write().await;
        let deal = deals
            .get_mut(deal_id)
            .ok_or_else(|| PlatformError::DealNotFound {
                deal_id: deal_id.to_string(),
            })?;

        match &deal.payment_intent_id {
            Some(existing) => Ok(existing.clone()),
            None => {
                deal.payment_intent_id = Some(intent_id.clone());
                Ok(intent_id)
            }
        }
    }
}

/// In-memory creator store
#[derive(Clone, Default)]
pub struct MemoryCreatorStore {
    creators: Arc<RwLock<HashMap<CreatorId, Creator>>>,
}

impl MemoryCreatorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CreatorStore for MemoryCreatorStore {
    async fn insert(&self, creator: Creator) -> Result<()> {
        self.creators.write().await.insert(creator.id, creator);
        Ok(())
    }

    async fn get(&self, creator_id: &CreatorId) -> Result<Creator> {
        self.creators
            .read()
            .await
            .get(creator_id)
            .cloned()
            .ok_or_else(|| PlatformError::CreatorNotFound {
                creator_id: creator_id.to_string(),
            })
    }

    async fn credit_earnings(&self, creator_id: &CreatorId, net: Decimal) -> Result<Decimal> {
        let mut creators = self.creators.write().await;
        let creator =
            creators
                .get_mut(creator_id)
                .ok_or_else(|| PlatformError::CreatorNotFound {
                    creator_id: creator_id.to_string(),
                })?;

        creator.cumulative_earnings += net;
        Ok(creator.cumulative_earnings)
    }

    async fn set_fee_tier(
        &self,
        creator_id: &CreatorId,
        tier: sponsorkit_types::FeeTier,
    ) -> Result<()> {
        let mut creators = self.creators.write().await;
        let creator =
            creators
                .get_mut(creator_id)
                .ok_or_else(|| PlatformError::CreatorNotFound {
                    creator_id: creator_id.to_string(),
                })?;

        creator.fee_tier = tier;
        Ok(())
    }

    async fn promote_fee_tier(
        &self,
        creator_id: &CreatorId,
        tier: sponsorkit_types::FeeTier,
    ) -> Result<sponsorkit_types::FeeTier> {
        let mut creators = self.creators.write().await;
        let creator =
            creators
                .get_mut(creator_id)
                .ok_or_else(|| PlatformError::CreatorNotFound {
                    creator_id: creator_id.to_string(),
                })?;

        if tier > creator.fee_tier {
            creator.fee_tier = tier;
        }
        Ok(creator.fee_tier)
    }

    async fn set_payout_account(
        &self,
        creator_id: &CreatorId,
        account_id: PayoutAccountId,
    ) -> Result<PayoutAccountId> {
        let mut creators = self.creators.write().await;
        let creator =
            creators
                .get_mut(creator_id)
                .ok_or_else(|| PlatformError::CreatorNotFound {
                    creator_id: creator_id.to_string(),
                })?;

        match &creator.payout_account_id {
            Some(existing) => Ok(existing.clone()),
            None => {
                creator.payout_account_id = Some(account_id.clone());
                Ok(account_id)
            }
        }
    }

    async fn update_payout_readiness(
        &self,
        account_id: &PayoutAccountId,
        readiness: PayoutReadiness,
    ) -> Result<Option<CreatorId>> {
        let mut creators = self.creators.write().await;
        let creator = creators
            .values_mut()
            .find(|creator| creator.payout_account_id.as_ref() == Some(account_id));

        match creator {
            Some(creator) => {
                creator.payout_readiness = readiness;
                Ok(Some(creator.id))
            }
            None => Ok(None),
        }
    }
}

/// In-memory processed-event store
///
/// A `HashSet` insert under one write lock stands in for a unique
/// constraint on the event id.
#[derive(Clone, Default)]
pub struct MemoryEventStore {
    seen: Arc<RwLock<HashSet<ExternalEventId>>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessedEventStore for MemoryEventStore {
    async fn reserve(&self, event_id: &ExternalEventId) -> Result<bool> {
        Ok(self.seen.write().await.insert(event_id.clone()))
    }

    async fn release(&self, event_id: &ExternalEventId) -> Result<()> {
        self.seen.write().await.remove(event_id);
        Ok(())
    }

    async fn is_processed(&self, event_id: &ExternalEventId) -> Result<bool> {
        Ok(self.seen.read().await.contains(event_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sponsorkit_types::DealTerms;

    fn sample_deal(status: DealStatus) -> Deal {
        Deal {
            id: DealId::new(),
            creator_id: CreatorId::new(),
            brand_id: BrandId::new(),
            deal_amount: dec!(1000),
            platform_fee_percent: dec!(18),
            platform_fee_amount: dec!(180.00),
            status,
            terms: DealTerms::default(),
            created_at: Utc::now(),
            completed_at: None,
            payment_intent_id: None,
        }
    }

    #[tokio::test]
    async fn cas_rejects_stale_precondition() {
        let store = MemoryDealStore::new();
        let deal = sample_deal(DealStatus::Pending);
        let id = deal.id;
        store.insert(deal).await.unwrap();

        store
            .update_status(&id, DealStatus::Pending, DealStatus::Accepted, None)
            .await
            .unwrap();

        // A second caller still believing the deal is pending loses
        let err = store
            .update_status(&id, DealStatus::Pending, DealStatus::Cancelled, None)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert_eq!(store.get(&id).await.unwrap().status, DealStatus::Accepted);
    }

    #[tokio::test]
    async fn completed_at_is_stamped_once() {
        let store = MemoryDealStore::new();
        let deal = sample_deal(DealStatus::InProgress);
        let id = deal.id;
        store.insert(deal).await.unwrap();

        let first = Utc::now();
        let updated = store
            .update_status(&id, DealStatus::InProgress, DealStatus::Completed, Some(first))
            .await
            .unwrap();
        assert_eq!(updated.completed_at, Some(first));

        let later = Utc::now();
        let updated = store
            .update_status(&id, DealStatus::Completed, DealStatus::Paid, Some(later))
            .await
            .unwrap();
        assert_eq!(updated.completed_at, Some(first));
    }

    #[tokio::test]
    async fn payment_intent_id_is_set_once() {
        let store = MemoryDealStore::new();
        let deal = sample_deal(DealStatus::Completed);
        let id = deal.id;
        store.insert(deal).await.unwrap();

        let first = store
            .set_payment_intent_id(&id, PaymentIntentId::new("pi_1"))
            .await
            .unwrap();
        assert_eq!(first.as_str(), "pi_1");

        let second = store
            .set_payment_intent_id(&id, PaymentIntentId::new("pi_2"))
            .await
            .unwrap();
        assert_eq!(second.as_str(), "pi_1");
    }

    #[tokio::test]
    async fn concurrent_credits_all_land() {
        let store = Arc::new(MemoryCreatorStore::new());
        let creator = Creator::new("ava");
        let id = creator.id;
        store.insert(creator).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.credit_earnings(&id, dec!(25)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let creator = store.get(&id).await.unwrap();
        assert_eq!(creator.cumulative_earnings, dec!(500));
    }

    #[tokio::test]
    async fn payout_account_set_once_and_readiness_lookup() {
        let store = MemoryCreatorStore::new();
        let creator = Creator::new("ben");
        let id = creator.id;
        store.insert(creator).await.unwrap();

        let acct = store
            .set_payout_account(&id, PayoutAccountId::new("acct_1"))
            .await
            .unwrap();
        assert_eq!(acct.as_str(), "acct_1");
        let kept = store
            .set_payout_account(&id, PayoutAccountId::new("acct_2"))
            .await
            .unwrap();
        assert_eq!(kept.as_str(), "acct_1");

        let readiness = PayoutReadiness {
            charges_enabled: true,
            payouts_enabled: true,
            details_submitted: true,
        };
        let found = store
            .update_payout_readiness(&PayoutAccountId::new("acct_1"), readiness)
            .await
            .unwrap();
        assert_eq!(found, Some(id));
        assert!(store.get(&id).await.unwrap().payout_readiness.is_active());

        let missing = store
            .update_payout_readiness(&PayoutAccountId::new("acct_unknown"), readiness)
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn promote_never_lowers_a_tier() {
        use sponsorkit_types::FeeTier;

        let store = MemoryCreatorStore::new();
        let creator = Creator::new("cara");
        let id = creator.id;
        store.insert(creator).await.unwrap();

        let tier = store.promote_fee_tier(&id, FeeTier::Scale).await.unwrap();
        assert_eq!(tier, FeeTier::Scale);

        // a later, lower recompute leaves the tier alone
        let tier = store.promote_fee_tier(&id, FeeTier::Growth).await.unwrap();
        assert_eq!(tier, FeeTier::Scale);
        assert_eq!(store.get(&id).await.unwrap().fee_tier, FeeTier::Scale);

        // administrative set may demote
        store.set_fee_tier(&id, FeeTier::Launch).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().fee_tier, FeeTier::Launch);
    }

    #[tokio::test]
    async fn event_reservation_wins_once() {
        let store = MemoryEventStore::new();
        let event = ExternalEventId::new("evt_1");

        assert!(store.reserve(&event).await.unwrap());
        assert!(!store.reserve(&event).await.unwrap());
        assert!(store.is_processed(&event).await.unwrap());

        store.release(&event).await.unwrap();
        assert!(!store.is_processed(&event).await.unwrap());
        assert!(store.reserve(&event).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_reservations_single_winner() {
        let store = Arc::new(MemoryEventStore::new());
        let event = ExternalEventId::new("evt_race");

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let event = event.clone();
            handles.push(tokio::spawn(async move {
                store.reserve(&event).await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}

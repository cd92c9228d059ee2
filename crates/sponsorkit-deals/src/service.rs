//! Deal service
//!
//! Creates deals with their frozen fee snapshot and drives role-gated
//! status transitions over the store's compare-and-swap primitive, so two
//! mutually exclusive requests on the same deal cannot both succeed.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use sponsorkit_fees::{fee_percent_for, platform_fee, tier_progress, TierProgress};
use sponsorkit_store::{CreatorStore, DealStore};
use sponsorkit_types::{
    Actor, BrandId, CreateDealRequest, Creator, CreatorId, Deal, DealId, DealStatus, FeeTier,
    PlatformError, Result,
};

/// Earnings and pipeline summary for a creator dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorStats {
    /// Sum of deal amounts across paid deals
    pub total_paid_volume: Decimal,
    /// Lifetime settled earnings (net of platform fees)
    pub cumulative_earnings: Decimal,
    pub pending_deals: usize,
    pub completed_deals: usize,
    pub tier: TierProgress,
}

/// Deal lifecycle service
#[derive(Clone)]
pub struct DealService {
    deals: Arc<dyn DealStore>,
    creators: Arc<dyn CreatorStore>,
}

impl DealService {
    pub fn new(deals: Arc<dyn DealStore>, creators: Arc<dyn CreatorStore>) -> Self {
        Self { deals, creators }
    }

    /// Create a deal (brand action)
    ///
    /// The fee rate is snapshotted from the creator's current tier and
    /// frozen on the record; later tier changes never touch this deal.
    pub async fn create_deal(&self, brand_id: BrandId, request: CreateDealRequest) -> Result<Deal> {
        if request.deal_amount <= Decimal::ZERO {
            return Err(PlatformError::invalid_argument(
                "deal_amount",
                "must be positive",
            ));
        }

        let creator = self.creators.get(&request.creator_id).await?;

        let fee_percent = fee_percent_for(creator.fee_tier);
        let fee_amount = platform_fee(request.deal_amount, fee_percent);

        let deal = Deal {
            id: DealId::new(),
            creator_id: creator.id,
            brand_id,
            deal_amount: request.deal_amount,
            platform_fee_percent: fee_percent,
            platform_fee_amount: fee_amount,
            status: DealStatus::Pending,
            terms: request.terms,
            created_at: Utc::now(),
            completed_at: None,
            payment_intent_id: None,
        };

        self.deals.insert(deal.clone()).await?;
        info!(
            deal_id = %deal.id,
            creator_id = %deal.creator_id,
            amount = %deal.deal_amount,
            fee_percent = %fee_percent,
            "deal created"
        );
        Ok(deal)
    }

    /// Request a status transition on behalf of an actor
    ///
    /// The move is validated against the transition table, ownership is
    /// checked, and the write is conditional on the status the actor saw.
    /// A concurrent conflicting transition makes the loser fail with
    /// `InvalidTransition`.
    pub async fn transition(&self, actor: Actor, deal_id: DealId, to: DealStatus) -> Result<Deal> {
        let deal = self.deals.get(&deal_id).await?;

        match actor {
            Actor::Creator(id) if id != deal.creator_id => {
                return Err(PlatformError::forbidden("not the creator on this deal"));
            }
            Actor::Brand(id) if id != deal.brand_id => {
                return Err(PlatformError::forbidden("not the brand on this deal"));
            }
            Actor::Admin => {
                return Err(PlatformError::forbidden(
                    "admins change status through the override",
                ));
            }
            _ => {}
        }

        crate::transition::validate(actor.role(), deal.status, to)?;

        let completed_at = (to == DealStatus::Completed).then(Utc::now);
        let updated = self
            .deals
            .update_status(&deal_id, deal.status, to, completed_at)
            .await?;

        info!(deal_id = %deal_id, from = %deal.status, to = %to, "deal transitioned");
        Ok(updated)
    }

    /// Administrative status override
    ///
    /// Bypasses the per-role table but still refuses to leave terminal
    /// statuses. `paid` is not reachable here: settlement owns that move
    /// so earnings and tier recompute cannot be skipped.
    pub async fn admin_override_status(&self, deal_id: DealId, to: DealStatus) -> Result<Deal> {
        if to == DealStatus::Paid {
            return Err(PlatformError::invalid_argument(
                "status",
                "paid is applied through settlement",
            ));
        }

        let deal = self.deals.get(&deal_id).await?;
        if deal.status.is_terminal() {
            return Err(PlatformError::InvalidTransition {
                from: deal.status,
                requested: to,
            });
        }

        let completed_at = (to == DealStatus::Completed).then(Utc::now);
        let updated = self
            .deals
            .update_status(&deal_id, deal.status, to, completed_at)
            .await?;

        warn!(deal_id = %deal_id, from = %deal.status, to = %to, "admin status override");
        Ok(updated)
    }

    /// Administrative fee tier override
    ///
    /// Authoritative until the next settlement recompute.
    pub async fn admin_override_tier(&self, creator_id: CreatorId, tier: FeeTier) -> Result<Creator> {
        let creator = self.creators.get(&creator_id).await?;
        self.creators.set_fee_tier(&creator_id, tier).await?;
        warn!(
            creator_id = %creator_id,
            from = %creator.fee_tier,
            to = %tier,
            "admin tier override"
        );
        self.creators.get(&creator_id).await
    }

    /// Deals owned by a brand, newest first
    pub async fn deals_for_brand(&self, brand_id: &BrandId) -> Result<Vec<Deal>> {
        self.deals.list_by_brand(brand_id).await
    }

    /// Deals assigned to a creator, newest first
    pub async fn deals_for_creator(&self, creator_id: &CreatorId) -> Result<Vec<Deal>> {
        self.deals.list_by_creator(creator_id).await
    }

    /// Dashboard summary for a creator
    pub async fn creator_stats(&self, creator_id: &CreatorId) -> Result<CreatorStats> {
        let creator = self.creators.get(creator_id).await?;
        let deals = self.deals.list_by_creator(creator_id).await?;

        let total_paid_volume = deals
            .iter()
            .filter(|deal| deal.status == DealStatus::Paid)
            .map(|deal| deal.deal_amount)
            .sum();
        let pending_deals = deals
            .iter()
            .filter(|deal| deal.status == DealStatus::Pending)
            .count();
        let completed_deals = deals
            .iter()
            .filter(|deal| matches!(deal.status, DealStatus::Completed | DealStatus::Paid))
            .count();

        Ok(CreatorStats {
            total_paid_volume,
            cumulative_earnings: creator.cumulative_earnings,
            pending_deals,
            completed_deals,
            tier: tier_progress(creator.cumulative_earnings)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sponsorkit_store::{MemoryCreatorStore, MemoryDealStore};
    use sponsorkit_types::DealTerms;

    struct Fixture {
        service: DealService,
        creators: Arc<MemoryCreatorStore>,
        creator_id: CreatorId,
        brand_id: BrandId,
    }

    async fn fixture() -> Fixture {
        let deals = Arc::new(MemoryDealStore::new());
        let creators = Arc::new(MemoryCreatorStore::new());
        let creator = Creator::new("ava");
        let creator_id = creator.id;
        creators.insert(creator).await.unwrap();

        Fixture {
            service: DealService::new(deals, creators.clone()),
            creators,
            creator_id,
            brand_id: BrandId::new(),
        }
    }

    fn request(creator_id: CreatorId, amount: Decimal) -> CreateDealRequest {
        CreateDealRequest {
            creator_id,
            deal_amount: amount,
            terms: DealTerms {
                deliverables: vec!["1 sponsored video".to_string()],
                revision_rounds: 2,
                ..DealTerms::default()
            },
        }
    }

    #[tokio::test]
    async fn create_snapshots_launch_tier_fee() {
        let fx = fixture().await;
        let deal = fx
            .service
            .create_deal(fx.brand_id, request(fx.creator_id, dec!(5000)))
            .await
            .unwrap();

        assert_eq!(deal.status, DealStatus::Pending);
        assert_eq!(deal.platform_fee_percent, dec!(18));
        assert_eq!(deal.platform_fee_amount, dec!(900.00));
        assert_eq!(deal.creator_payout(), dec!(4100.00));
    }

    #[tokio::test]
    async fn create_rejects_bad_input() {
        let fx = fixture().await;
        let err = fx
            .service
            .create_deal(fx.brand_id, request(fx.creator_id, dec!(0)))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");

        let err = fx
            .service
            .create_deal(fx.brand_id, request(CreatorId::new(), dec!(100)))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "CREATOR_NOT_FOUND");
    }

    #[tokio::test]
    async fn fee_snapshot_survives_tier_override() {
        let fx = fixture().await;
        let deal = fx
            .service
            .create_deal(fx.brand_id, request(fx.creator_id, dec!(1000)))
            .await
            .unwrap();

        fx.service
            .admin_override_tier(fx.creator_id, FeeTier::Partner)
            .await
            .unwrap();

        // Existing deal keeps its frozen 18%; a new deal gets 10%
        let unchanged = fx.service.deals_for_creator(&fx.creator_id).await.unwrap();
        let old = unchanged.iter().find(|d| d.id == deal.id).unwrap();
        assert_eq!(old.platform_fee_percent, dec!(18));

        let new_deal = fx
            .service
            .create_deal(fx.brand_id, request(fx.creator_id, dec!(1000)))
            .await
            .unwrap();
        assert_eq!(new_deal.platform_fee_percent, dec!(10));
        assert_eq!(new_deal.platform_fee_amount, dec!(100.00));
    }

    #[tokio::test]
    async fn creator_walks_the_happy_path() {
        let fx = fixture().await;
        let deal = fx
            .service
            .create_deal(fx.brand_id, request(fx.creator_id, dec!(800)))
            .await
            .unwrap();

        let actor = Actor::Creator(fx.creator_id);
        for to in [
            DealStatus::Accepted,
            DealStatus::InProgress,
            DealStatus::Completed,
        ] {
            fx.service.transition(actor, deal.id, to).await.unwrap();
        }

        let done = fx.service.deals_for_creator(&fx.creator_id).await.unwrap();
        assert_eq!(done[0].status, DealStatus::Completed);
        assert!(done[0].completed_at.is_some());
    }

    #[tokio::test]
    async fn brand_cannot_complete_an_accepted_deal() {
        let fx = fixture().await;
        let deal = fx
            .service
            .create_deal(fx.brand_id, request(fx.creator_id, dec!(800)))
            .await
            .unwrap();
        fx.service
            .transition(Actor::Creator(fx.creator_id), deal.id, DealStatus::Accepted)
            .await
            .unwrap();

        let err = fx
            .service
            .transition(Actor::Brand(fx.brand_id), deal.id, DealStatus::Completed)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TRANSITION");

        // status unchanged
        let deals = fx.service.deals_for_brand(&fx.brand_id).await.unwrap();
        assert_eq!(deals[0].status, DealStatus::Accepted);
    }

    #[tokio::test]
    async fn strangers_are_forbidden() {
        let fx = fixture().await;
        let deal = fx
            .service
            .create_deal(fx.brand_id, request(fx.creator_id, dec!(800)))
            .await
            .unwrap();

        let err = fx
            .service
            .transition(Actor::Creator(CreatorId::new()), deal.id, DealStatus::Accepted)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");

        let err = fx
            .service
            .transition(Actor::Brand(BrandId::new()), deal.id, DealStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn accept_beats_concurrent_cancel() {
        let fx = fixture().await;
        let deal = fx
            .service
            .create_deal(fx.brand_id, request(fx.creator_id, dec!(800)))
            .await
            .unwrap();

        fx.service
            .transition(Actor::Creator(fx.creator_id), deal.id, DealStatus::Accepted)
            .await
            .unwrap();

        // The brand's cancel raced and lost; its precondition is gone
        let err = fx
            .service
            .transition(Actor::Brand(fx.brand_id), deal.id, DealStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn admin_override_respects_terminal_statuses() {
        let fx = fixture().await;
        let deal = fx
            .service
            .create_deal(fx.brand_id, request(fx.creator_id, dec!(800)))
            .await
            .unwrap();

        fx.service
            .admin_override_status(deal.id, DealStatus::Completed)
            .await
            .unwrap();
        let overridden = fx.service.deals_for_brand(&fx.brand_id).await.unwrap();
        assert!(overridden[0].completed_at.is_some());

        fx.service
            .admin_override_status(deal.id, DealStatus::Cancelled)
            .await
            .unwrap();
        let err = fx
            .service
            .admin_override_status(deal.id, DealStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn admin_override_cannot_mark_paid() {
        let fx = fixture().await;
        let deal = fx
            .service
            .create_deal(fx.brand_id, request(fx.creator_id, dec!(800)))
            .await
            .unwrap();

        let err = fx
            .service
            .admin_override_status(deal.id, DealStatus::Paid)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn creator_stats_summarize_pipeline() {
        let fx = fixture().await;
        let deal = fx
            .service
            .create_deal(fx.brand_id, request(fx.creator_id, dec!(5000)))
            .await
            .unwrap();
        fx.service
            .create_deal(fx.brand_id, request(fx.creator_id, dec!(250)))
            .await
            .unwrap();

        let actor = Actor::Creator(fx.creator_id);
        for to in [
            DealStatus::Accepted,
            DealStatus::InProgress,
            DealStatus::Completed,
        ] {
            fx.service.transition(actor, deal.id, to).await.unwrap();
        }
        fx.creators
            .credit_earnings(&fx.creator_id, dec!(4100))
            .await
            .unwrap();

        let stats = fx.service.creator_stats(&fx.creator_id).await.unwrap();
        assert_eq!(stats.pending_deals, 1);
        assert_eq!(stats.completed_deals, 1);
        assert_eq!(stats.cumulative_earnings, dec!(4100));
        assert_eq!(stats.tier.tier, FeeTier::Launch);
        assert_eq!(stats.tier.percent_within_tier, 41);
    }
}

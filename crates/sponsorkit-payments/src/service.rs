//! Payment intent orchestration
//!
//! One upstream intent per deal, ever. The fast path for a deal that
//! already has an intent re-fetches it; the slow path creates one and
//! persists its id before the checkout material is returned to the
//! caller.

use std::future::Future;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use sponsorkit_store::{CreatorStore, DealStore};
use sponsorkit_types::{
    from_minor_units, to_minor_units, Actor, BrandId, Deal, DealId, DealStatus, PlatformError,
    Result,
};

use crate::provider::{
    CreateIntentRequest, IntentStatus, PaymentIntent, PaymentProvider, ProviderConfig,
};

/// Run a processor call under the configured timeout
///
/// A timeout is indistinguishable from any other provider failure: no
/// local state has been touched, so retrying is safe.
pub(crate) async fn bounded<T>(
    config: &ProviderConfig,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(config.request_timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(PlatformError::provider("processor request timed out")),
    }
}

/// Checkout material handed back to the paying brand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub payment_intent_id: sponsorkit_types::PaymentIntentId,
    /// Client-usable secret for completing the charge
    pub client_secret: String,
    pub status: IntentStatus,
    /// Cost breakdown for display, in dollars
    pub gross: Decimal,
    pub platform_fee: Decimal,
    pub creator_payout: Decimal,
}

impl CheckoutSession {
    fn from_intent(intent: PaymentIntent, deal: &Deal) -> Self {
        Self {
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            status: intent.status,
            gross: deal.deal_amount,
            platform_fee: deal.platform_fee_amount,
            creator_payout: deal.creator_payout(),
        }
    }
}

/// Party-gated view of a deal's payment progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatusView {
    pub status: IntentStatus,
    /// Amounts as reported by the processor, in dollars
    pub gross: Decimal,
    pub platform_fee: Decimal,
    pub creator_payout: Decimal,
}

/// Payment orchestration service
#[derive(Clone)]
pub struct PaymentService {
    deals: Arc<dyn DealStore>,
    creators: Arc<dyn CreatorStore>,
    provider: Arc<dyn PaymentProvider>,
    config: ProviderConfig,
}

impl PaymentService {
    pub fn new(
        deals: Arc<dyn DealStore>,
        creators: Arc<dyn CreatorStore>,
        provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            deals,
            creators,
            provider,
            config: ProviderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    /// Create (or return) the payment intent for a completed deal
    ///
    /// Preconditions: the caller owns the deal, the deal is exactly
    /// `completed`, and the creator has a payout account. Re-requests
    /// return the existing intent's current state instead of creating a
    /// second one.
    pub async fn create_intent_for_deal(
        &self,
        brand_id: BrandId,
        deal_id: DealId,
    ) -> Result<CheckoutSession> {
        let deal = self.deals.get(&deal_id).await?;

        if deal.brand_id != brand_id {
            return Err(PlatformError::forbidden("not the brand on this deal"));
        }
        if deal.status != DealStatus::Completed {
            return Err(PlatformError::InvalidTransition {
                from: deal.status,
                requested: DealStatus::Paid,
            });
        }

        if let Some(intent_id) = &deal.payment_intent_id {
            let intent = bounded(&self.config, self.provider.retrieve_payment_intent(intent_id))
                .await?;
            return Ok(CheckoutSession::from_intent(intent, &deal));
        }

        let creator = self.creators.get(&deal.creator_id).await?;
        let destination = creator
            .payout_account_id
            .clone()
            .ok_or(PlatformError::PayoutAccountMissing)?;

        let request = CreateIntentRequest {
            amount_minor: to_minor_units(deal.deal_amount)?,
            fee_minor: to_minor_units(deal.platform_fee_amount)?,
            destination,
            deal_id,
            description: format!("Deal payment: {}", deal.terms.deliverables.join(", ")),
        };

        let intent = bounded(&self.config, self.provider.create_payment_intent(request)).await?;

        // Write-then-respond. If a concurrent request won the slot, its
        // intent is authoritative and ours is abandoned upstream.
        let stored_id = self
            .deals
            .set_payment_intent_id(&deal_id, intent.id.clone())
            .await?;

        if stored_id != intent.id {
            warn!(deal_id = %deal_id, kept = %stored_id, discarded = %intent.id,
                "concurrent intent creation, returning the stored intent");
            let intent = bounded(
                &self.config,
                self.provider.retrieve_payment_intent(&stored_id),
            )
            .await?;
            return Ok(CheckoutSession::from_intent(intent, &deal));
        }

        info!(deal_id = %deal_id, intent_id = %intent.id, "payment intent created");
        Ok(CheckoutSession::from_intent(intent, &deal))
    }

    /// Payment progress for a deal, visible to its parties only
    ///
    /// Returns None when payment has not been initiated. Amounts come
    /// from the processor, not the local record.
    pub async fn payment_status(
        &self,
        actor: Actor,
        deal_id: DealId,
    ) -> Result<Option<PaymentStatusView>> {
        let deal = self.deals.get(&deal_id).await?;

        let is_party = match actor {
            Actor::Creator(id) => id == deal.creator_id,
            Actor::Brand(id) => id == deal.brand_id,
            Actor::Admin => true,
        };
        if !is_party {
            return Err(PlatformError::forbidden("not a party to this deal"));
        }

        let intent_id = match &deal.payment_intent_id {
            Some(id) => id.clone(),
            None => return Ok(None),
        };

        let intent = bounded(&self.config, self.provider.retrieve_payment_intent(&intent_id))
            .await?;

        Ok(Some(PaymentStatusView {
            status: intent.status,
            gross: from_minor_units(intent.amount_minor),
            platform_fee: from_minor_units(intent.fee_minor),
            creator_payout: from_minor_units(intent.amount_minor - intent.fee_minor),
        }))
    }
}

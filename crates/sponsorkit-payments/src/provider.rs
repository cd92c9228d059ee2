//! Payment processor capability interface

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sponsorkit_types::{CreatorId, DealId, PaymentIntentId, PayoutAccountId, Result};

/// Bounded-call configuration for processor requests
///
/// Processor calls are network-bound and possibly slow; every call runs
/// under this timeout and a timeout is treated like any other provider
/// failure.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Lifecycle state of a payment intent at the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresAction,
    Processing,
    Succeeded,
    Canceled,
}

/// A payment intent as reported by the processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: PaymentIntentId,
    /// Client-usable secret for completing the charge
    pub client_secret: String,
    pub status: IntentStatus,
    /// Gross amount in minor units
    pub amount_minor: i64,
    /// Platform fee retained, in minor units
    pub fee_minor: i64,
}

/// A connected payout account as reported by the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedAccount {
    pub id: PayoutAccountId,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub details_submitted: bool,
}

/// A hosted link into the processor's account UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLink {
    pub url: String,
}

/// Request for a transfer-splitting payment intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIntentRequest {
    /// Gross amount to charge the brand, in minor units
    pub amount_minor: i64,
    /// Platform fee to retain, in minor units
    pub fee_minor: i64,
    /// Creator payout account receiving the remainder
    pub destination: PayoutAccountId,
    /// Deal carried in the intent metadata; settlement events refer back
    /// to it
    pub deal_id: DealId,
    pub description: String,
}

/// Capability interface over the external payment processor
///
/// All methods are fallible and possibly slow; callers must not hold any
/// lock on a deal record across them.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a connected payout account for a creator
    async fn create_connected_account(&self, creator_id: &CreatorId) -> Result<ConnectedAccount>;

    /// Create a hosted onboarding link for a connected account
    async fn create_onboarding_link(
        &self,
        account_id: &PayoutAccountId,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<AccountLink>;

    /// Create a hosted dashboard login link for a connected account
    async fn create_login_link(&self, account_id: &PayoutAccountId) -> Result<AccountLink>;

    /// Create a transfer-splitting payment intent
    async fn create_payment_intent(&self, request: CreateIntentRequest) -> Result<PaymentIntent>;

    /// Fetch the current state of a payment intent
    async fn retrieve_payment_intent(&self, intent_id: &PaymentIntentId) -> Result<PaymentIntent>;

    /// Fetch the current state of a connected account
    async fn retrieve_account(&self, account_id: &PayoutAccountId) -> Result<ConnectedAccount>;
}

//! Mock payment provider for tests and local wiring
//!
//! Records every intent and account it creates, and can be scripted to
//! fail or stall the next call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use sponsorkit_types::{CreatorId, PaymentIntentId, PayoutAccountId, PlatformError, Result};

use crate::provider::{
    AccountLink, ConnectedAccount, CreateIntentRequest, IntentStatus, PaymentIntent,
    PaymentProvider,
};

/// In-memory stand-in for the external payment processor
#[derive(Default)]
pub struct MockProvider {
    intents: RwLock<HashMap<PaymentIntentId, PaymentIntent>>,
    accounts: RwLock<HashMap<PayoutAccountId, ConnectedAccount>>,
    fail_next: RwLock<Option<String>>,
    call_delay: RwLock<Option<Duration>>,
    intent_seq: AtomicU64,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next call to fail with the given message
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.write() = Some(message.into());
    }

    /// Stall every call by the given duration
    pub fn delay(&self, duration: Duration) {
        *self.call_delay.write() = Some(duration);
    }

    /// Number of intents created upstream
    pub fn intent_count(&self) -> usize {
        self.intents.read().len()
    }

    /// Look up a created intent
    pub fn intent(&self, intent_id: &PaymentIntentId) -> Option<PaymentIntent> {
        self.intents.read().get(intent_id).cloned()
    }

    /// Flip a created intent to succeeded, as the processor would after
    /// the brand completes the charge
    pub fn settle_intent(&self, intent_id: &PaymentIntentId) {
        if let Some(intent) = self.intents.write().get_mut(intent_id) {
            intent.status = IntentStatus::Succeeded;
        }
    }

    /// Mark a connected account fully onboarded
    pub fn activate_account(&self, account_id: &PayoutAccountId) {
        if let Some(account) = self.accounts.write().get_mut(account_id) {
            account.charges_enabled = true;
            account.payouts_enabled = true;
            account.details_submitted = true;
        }
    }

    async fn gate(&self) -> Result<()> {
        let delay = *self.call_delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.fail_next.write().take() {
            return Err(PlatformError::provider(message));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for MockProvider {
    async fn create_connected_account(&self, _creator_id: &CreatorId) -> Result<ConnectedAccount> {
        self.gate().await?;
        let account = ConnectedAccount {
            id: PayoutAccountId::new(format!("acct_{}", Uuid::new_v4().simple())),
            charges_enabled: false,
            payouts_enabled: false,
            details_submitted: false,
        };
        self.accounts
            .write()
            .insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn create_onboarding_link(
        &self,
        account_id: &PayoutAccountId,
        _refresh_url: &str,
        return_url: &str,
    ) -> Result<AccountLink> {
        self.gate().await?;
        Ok(AccountLink {
            url: format!("https://connect.mock/onboard/{account_id}?return={return_url}"),
        })
    }

    async fn create_login_link(&self, account_id: &PayoutAccountId) -> Result<AccountLink> {
        self.gate().await?;
        if !self.accounts.read().contains_key(account_id) {
            return Err(PlatformError::provider("no such account"));
        }
        Ok(AccountLink {
            url: format!("https://connect.mock/login/{account_id}"),
        })
    }

    async fn create_payment_intent(&self, request: CreateIntentRequest) -> Result<PaymentIntent> {
        self.gate().await?;
        let seq = self.intent_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let id = PaymentIntentId::new(format!("pi_mock_{seq}"));
        let intent = PaymentIntent {
            id: id.clone(),
            client_secret: format!("{id}_secret_{}", Uuid::new_v4().simple()),
            status: IntentStatus::RequiresPaymentMethod,
            amount_minor: request.amount_minor,
            fee_minor: request.fee_minor,
        };
        self.intents.write().insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_payment_intent(&self, intent_id: &PaymentIntentId) -> Result<PaymentIntent> {
        self.gate().await?;
        self.intents
            .read()
            .get(intent_id)
            .cloned()
            .ok_or_else(|| PlatformError::provider(format!("no such intent: {intent_id}")))
    }

    async fn retrieve_account(&self, account_id: &PayoutAccountId) -> Result<ConnectedAccount> {
        self.gate().await?;
        self.accounts
            .read()
            .get(account_id)
            .cloned()
            .ok_or_else(|| PlatformError::provider(format!("no such account: {account_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sponsorkit_types::DealId;

    #[tokio::test]
    async fn scripted_failure_fires_once() {
        let provider = MockProvider::new();
        provider.fail_next("boom");

        let creator = CreatorId::new();
        assert!(provider.create_connected_account(&creator).await.is_err());
        assert!(provider.create_connected_account(&creator).await.is_ok());
    }

    #[tokio::test]
    async fn intents_are_sequenced_and_retrievable() {
        let provider = MockProvider::new();
        let request = CreateIntentRequest {
            amount_minor: 1000,
            fee_minor: 180,
            destination: PayoutAccountId::new("acct_x"),
            deal_id: DealId::new(),
            description: "test".to_string(),
        };

        let intent = provider.create_payment_intent(request).await.unwrap();
        assert_eq!(provider.intent_count(), 1);

        provider.settle_intent(&intent.id);
        let fetched = provider.retrieve_payment_intent(&intent.id).await.unwrap();
        assert_eq!(fetched.status, IntentStatus::Succeeded);
    }
}

//! Creator payout-account onboarding
//!
//! Wraps the processor's connected-account flows: create the account,
//! hand out hosted onboarding and dashboard links, and report readiness
//! so the UI can prompt the creator through setup.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use sponsorkit_store::CreatorStore;
use sponsorkit_types::{CreatorId, PayoutAccountId, PlatformError, Result};

use crate::provider::{AccountLink, PaymentProvider, ProviderConfig};
use crate::service::bounded;

/// Connection state of a creator's payout account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatusView {
    pub connected: bool,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub details_submitted: bool,
    pub account_id: Option<PayoutAccountId>,
}

impl AccountStatusView {
    fn not_connected() -> Self {
        Self {
            connected: false,
            charges_enabled: false,
            payouts_enabled: false,
            details_submitted: false,
            account_id: None,
        }
    }
}

/// Payout-account onboarding service
#[derive(Clone)]
pub struct ConnectService {
    creators: Arc<dyn CreatorStore>,
    provider: Arc<dyn PaymentProvider>,
    config: ProviderConfig,
}

impl ConnectService {
    pub fn new(creators: Arc<dyn CreatorStore>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self {
            creators,
            provider,
            config: ProviderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    /// Create a payout account for the creator, or return the one already
    /// linked
    pub async fn create_account(&self, creator_id: CreatorId) -> Result<PayoutAccountId> {
        let creator = self.creators.get(&creator_id).await?;
        if let Some(existing) = creator.payout_account_id {
            return Ok(existing);
        }

        let account = bounded(
            &self.config,
            self.provider.create_connected_account(&creator_id),
        )
        .await?;

        // set-once: a concurrent creation keeps the first account
        let stored = self
            .creators
            .set_payout_account(&creator_id, account.id.clone())
            .await?;
        info!(creator_id = %creator_id, account_id = %stored, "payout account linked");
        Ok(stored)
    }

    /// Hosted onboarding link, creating the account first if needed
    pub async fn onboarding_link(
        &self,
        creator_id: CreatorId,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<AccountLink> {
        let account_id = self.create_account(creator_id).await?;
        bounded(
            &self.config,
            self.provider
                .create_onboarding_link(&account_id, refresh_url, return_url),
        )
        .await
    }

    /// Hosted dashboard login link; requires an existing account
    pub async fn login_link(&self, creator_id: CreatorId) -> Result<AccountLink> {
        let creator = self.creators.get(&creator_id).await?;
        let account_id = creator
            .payout_account_id
            .ok_or(PlatformError::PayoutAccountMissing)?;
        bounded(&self.config, self.provider.create_login_link(&account_id)).await
    }

    /// Current readiness of the creator's payout account
    pub async fn account_status(&self, creator_id: CreatorId) -> Result<AccountStatusView> {
        let creator = self.creators.get(&creator_id).await?;
        let account_id = match creator.payout_account_id {
            Some(id) => id,
            None => return Ok(AccountStatusView::not_connected()),
        };

        let account = bounded(&self.config, self.provider.retrieve_account(&account_id)).await?;

        Ok(AccountStatusView {
            connected: true,
            charges_enabled: account.charges_enabled,
            payouts_enabled: account.payouts_enabled,
            details_submitted: account.details_submitted,
            account_id: Some(account.id),
        })
    }
}

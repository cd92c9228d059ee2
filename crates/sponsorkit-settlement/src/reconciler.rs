//! Settlement reconciliation
//!
//! Applies processor events to deal and creator state exactly once per
//! logical event. The dedup reservation is taken before any effect and
//! rolled back if the apply fails, so a redelivery can retry a failed
//! apply but can never double-apply a successful one.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use sponsorkit_fees::tier_for;
use sponsorkit_store::{CreatorStore, DealStore, ProcessedEventStore};
use sponsorkit_types::{
    from_minor_units, to_minor_units, DealId, DealStatus, ExternalEventId, PaymentIntentId,
    PayoutReadiness, PlatformError, Result, SettlementEvent, SettlementEventKind,
};

use crate::parse::parse_event;
use crate::webhook::WebhookVerifier;

/// Result of handling a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Event verified and applied (or required no state change)
    Accepted,
    /// Event id seen before; nothing was re-applied
    AlreadyProcessed,
}

/// Webhook consumer and settlement applier
#[derive(Clone)]
pub struct Reconciler {
    deals: Arc<dyn DealStore>,
    creators: Arc<dyn CreatorStore>,
    events: Arc<dyn ProcessedEventStore>,
    verifier: WebhookVerifier,
}

impl Reconciler {
    pub fn new(
        deals: Arc<dyn DealStore>,
        creators: Arc<dyn CreatorStore>,
        events: Arc<dyn ProcessedEventStore>,
        verifier: WebhookVerifier,
    ) -> Self {
        Self {
            deals,
            creators,
            events,
            verifier,
        }
    }

    /// Handle one raw webhook delivery
    ///
    /// Verification comes first; an unverified payload is never parsed,
    /// let alone applied. Errors from our own stores bubble up so the
    /// transport can signal the processor to redeliver.
    pub async fn handle(&self, payload: &[u8], signature_header: &str) -> Result<WebhookOutcome> {
        self.verifier.verify(payload, signature_header)?;
        let event = parse_event(payload)?;
        self.apply(event).await
    }

    /// Apply a verified event exactly once
    pub async fn apply(&self, event: SettlementEvent) -> Result<WebhookOutcome> {
        if !self.events.reserve(&event.event_id).await? {
            info!(event_id = %event.event_id, "duplicate delivery, already applied");
            return Ok(WebhookOutcome::AlreadyProcessed);
        }

        match self.dispatch(&event).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                // Roll back the reservation so redelivery can retry
                if let Err(release_err) = self.events.release(&event.event_id).await {
                    warn!(event_id = %event.event_id, error = %release_err,
                        "failed to release reservation after apply failure");
                }
                Err(err)
            }
        }
    }

    async fn dispatch(&self, event: &SettlementEvent) -> Result<WebhookOutcome> {
        match &event.kind {
            SettlementEventKind::ChargeSucceeded {
                deal_id,
                gross_minor,
                fee_minor,
                ..
            } => {
                self.apply_charge_succeeded(*deal_id, *gross_minor, *fee_minor)
                    .await
            }
            SettlementEventKind::ChargeFailed { deal_id, reason } => {
                // Reportable, not a transition: the brand may retry the intent
                warn!(
                    deal_id = %deal_id,
                    reason = reason.as_deref().unwrap_or("unknown"),
                    "charge failed"
                );
                Ok(WebhookOutcome::Accepted)
            }
            SettlementEventKind::AccountUpdated {
                account_id,
                charges_enabled,
                payouts_enabled,
                details_submitted,
            } => {
                let readiness = PayoutReadiness {
                    charges_enabled: *charges_enabled,
                    payouts_enabled: *payouts_enabled,
                    details_submitted: *details_submitted,
                };
                match self
                    .creators
                    .update_payout_readiness(account_id, readiness)
                    .await?
                {
                    Some(creator_id) => {
                        info!(creator_id = %creator_id, account_id = %account_id,
                            payouts_enabled, "payout account updated");
                    }
                    None => {
                        warn!(account_id = %account_id, "account update for unknown creator");
                    }
                }
                Ok(WebhookOutcome::Accepted)
            }
            SettlementEventKind::TransferCreated {
                destination,
                amount_minor,
            } => {
                info!(destination = %destination, amount_minor, "transfer created");
                Ok(WebhookOutcome::Accepted)
            }
            SettlementEventKind::PayoutPaid { amount_minor } => {
                info!(amount_minor, "payout landed");
                Ok(WebhookOutcome::Accepted)
            }
            SettlementEventKind::Unknown { kind } => {
                info!(kind = %kind, "unhandled event kind");
                Ok(WebhookOutcome::Accepted)
            }
        }
    }

    /// The single settlement-apply function
    ///
    /// Marks the deal paid, credits the creator with the net the
    /// processor reports, and promotes the tier when the new total
    /// crosses a band. Both the webhook path and the administrative
    /// mark-paid go through here; there is no second implementation to
    /// drift.
    async fn apply_charge_succeeded(
        &self,
        deal_id: DealId,
        gross_minor: i64,
        fee_minor: i64,
    ) -> Result<WebhookOutcome> {
        let deal = self.deals.get(&deal_id).await?;

        if deal.status == DealStatus::Paid {
            // Redelivery of a settlement we already applied under a
            // different event id; record the id, change nothing.
            info!(deal_id = %deal_id, "deal already paid, no-op");
            return Ok(WebhookOutcome::Accepted);
        }

        self.deals
            .update_status(&deal_id, deal.status, DealStatus::Paid, Some(Utc::now()))
            .await?;

        // The processor's figures are authoritative: they reflect what
        // actually moved, not what we expected to move.
        let net = from_minor_units(gross_minor - fee_minor);
        let new_total = self.creators.credit_earnings(&deal.creator_id, net).await?;

        info!(
            deal_id = %deal_id,
            creator_id = %deal.creator_id,
            net = %net,
            total = %new_total,
            "deal settled"
        );

        let assignment = tier_for(new_total)?;
        let resulting = self
            .creators
            .promote_fee_tier(&deal.creator_id, assignment.tier)
            .await?;
        if resulting == assignment.tier {
            info!(creator_id = %deal.creator_id, tier = %resulting, "fee tier recomputed");
        }

        Ok(WebhookOutcome::Accepted)
    }

    /// Administrative mark-paid
    ///
    /// Settles a deal without a processor event, using the frozen fee
    /// snapshot for the split. Synthesizes a unique event id and runs the
    /// same apply path as the webhook, so earnings and tier recompute
    /// cannot diverge between the two.
    pub async fn admin_mark_paid(&self, deal_id: DealId) -> Result<WebhookOutcome> {
        let deal = self.deals.get(&deal_id).await?;

        if deal.status.is_terminal() {
            return Err(PlatformError::InvalidTransition {
                from: deal.status,
                requested: DealStatus::Paid,
            });
        }

        let event = SettlementEvent {
            event_id: ExternalEventId::new(format!("admin_{}", Uuid::new_v4())),
            kind: SettlementEventKind::ChargeSucceeded {
                deal_id,
                payment_intent_id: deal
                    .payment_intent_id
                    .clone()
                    .unwrap_or_else(|| PaymentIntentId::new("manual")),
                gross_minor: to_minor_units(deal.deal_amount)?,
                fee_minor: to_minor_units(deal.platform_fee_amount)?,
            },
        };

        warn!(deal_id = %deal_id, event_id = %event.event_id, "administrative settlement");
        self.apply(event).await
    }
}

//! Webhook payload parsing
//!
//! Turns a verified raw delivery into a [`SettlementEvent`]. The wire
//! shape is the processor's envelope: an event id, a dotted event type,
//! and the affected object under `data.object`. Unrecognized event types
//! parse to `Unknown` and are acknowledged; structurally broken payloads
//! are rejected as malformed so the processor's misconfiguration is not
//! silently swallowed.

use serde::Deserialize;
use serde_json::Value;

use sponsorkit_types::{
    DealId, ExternalEventId, PaymentIntentId, PayoutAccountId, PlatformError, Result,
    SettlementEvent, SettlementEventKind,
};

#[derive(Debug, Deserialize)]
struct Envelope {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    data: EnvelopeData,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    object: Value,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentObject {
    id: String,
    amount: i64,
    #[serde(default)]
    application_fee_amount: Option<i64>,
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    last_payment_error: Option<PaymentError>,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default)]
    deal_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountObject {
    id: String,
    #[serde(default)]
    charges_enabled: bool,
    #[serde(default)]
    payouts_enabled: bool,
    #[serde(default)]
    details_submitted: bool,
}

#[derive(Debug, Deserialize)]
struct TransferObject {
    destination: String,
    amount: i64,
}

#[derive(Debug, Deserialize)]
struct PayoutObject {
    amount: i64,
}

fn malformed(reason: impl Into<String>) -> PlatformError {
    PlatformError::invalid_argument("payload", reason)
}

fn deal_id_from(metadata: &Metadata) -> Result<DealId> {
    let raw = metadata
        .deal_id
        .as_deref()
        .ok_or_else(|| malformed("missing deal_id in event metadata"))?;
    DealId::parse(raw).map_err(|_| malformed(format!("unparseable deal_id: {raw}")))
}

/// Parse a verified raw payload into a settlement event
pub fn parse_event(payload: &[u8]) -> Result<SettlementEvent> {
    let envelope: Envelope =
        serde_json::from_slice(payload).map_err(|err| malformed(err.to_string()))?;
    let event_id = ExternalEventId::new(envelope.id);

    let object = envelope.data.object;
    let kind = match envelope.kind.as_str() {
        "payment_intent.succeeded" => {
            let intent: PaymentIntentObject =
                serde_json::from_value(object).map_err(|err| malformed(err.to_string()))?;
            SettlementEventKind::ChargeSucceeded {
                deal_id: deal_id_from(&intent.metadata)?,
                payment_intent_id: PaymentIntentId::new(intent.id),
                gross_minor: intent.amount,
                fee_minor: intent.application_fee_amount.unwrap_or(0),
            }
        }
        "payment_intent.payment_failed" => {
            let intent: PaymentIntentObject =
                serde_json::from_value(object).map_err(|err| malformed(err.to_string()))?;
            SettlementEventKind::ChargeFailed {
                deal_id: deal_id_from(&intent.metadata)?,
                reason: intent.last_payment_error.and_then(|err| err.message),
            }
        }
        "account.updated" => {
            let account: AccountObject =
                serde_json::from_value(object).map_err(|err| malformed(err.to_string()))?;
            SettlementEventKind::AccountUpdated {
                account_id: PayoutAccountId::new(account.id),
                charges_enabled: account.charges_enabled,
                payouts_enabled: account.payouts_enabled,
                details_submitted: account.details_submitted,
            }
        }
        "transfer.created" => {
            let transfer: TransferObject =
                serde_json::from_value(object).map_err(|err| malformed(err.to_string()))?;
            SettlementEventKind::TransferCreated {
                destination: PayoutAccountId::new(transfer.destination),
                amount_minor: transfer.amount,
            }
        }
        "payout.paid" => {
            let payout: PayoutObject =
                serde_json::from_value(object).map_err(|err| malformed(err.to_string()))?;
            SettlementEventKind::PayoutPaid {
                amount_minor: payout.amount,
            }
        }
        other => SettlementEventKind::Unknown {
            kind: other.to_string(),
        },
    };

    Ok(SettlementEvent { event_id, kind })
}

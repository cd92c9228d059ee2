//! Webhook signature verification
//!
//! Deliveries carry a `t=<unix>,v1=<hex>` signature header. The signed
//! message is `"{t}.{raw payload}"` under HMAC-SHA256 with the endpoint's
//! shared secret. Comparison is constant-time and the timestamp must fall
//! inside the tolerance window, so a captured delivery cannot be replayed
//! later. An unverified payload is never parsed.

use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use sponsorkit_types::{PlatformError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Webhook endpoint configuration
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Shared secret issued by the processor for this endpoint
    pub secret: String,
    /// Maximum age of a delivery before it is rejected as stale
    pub tolerance: Duration,
}

impl WebhookConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance: Duration::from_secs(300),
        }
    }

    /// Load the endpoint secret from `SPONSORKIT_WEBHOOK_SECRET`
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let secret = std::env::var("SPONSORKIT_WEBHOOK_SECRET").map_err(|_| {
            PlatformError::invalid_argument("SPONSORKIT_WEBHOOK_SECRET", "not set")
        })?;
        Ok(Self::new(secret))
    }
}

/// Verifies webhook deliveries against the endpoint secret
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    config: WebhookConfig,
}

impl WebhookVerifier {
    pub fn new(config: WebhookConfig) -> Self {
        Self { config }
    }

    /// Verify a delivery's signature header against its raw payload
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<()> {
        let (timestamp, signature) = parse_header(signature_header)?;

        let age = (Utc::now().timestamp() - timestamp).unsigned_abs();
        if age > self.config.tolerance.as_secs() {
            return Err(PlatformError::InvalidSignature {
                reason: format!("timestamp outside tolerance ({age}s old)"),
            });
        }

        let expected = self.sign(payload, timestamp)?;
        let provided = hex::decode(signature).map_err(|_| PlatformError::InvalidSignature {
            reason: "signature is not hex".to_string(),
        })?;

        if expected.ct_eq(&provided).into() {
            Ok(())
        } else {
            Err(PlatformError::InvalidSignature {
                reason: "signature mismatch".to_string(),
            })
        }
    }

    /// Compute the signature bytes for a payload at a timestamp
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(self.config.secret.as_bytes()).map_err(|_| {
            PlatformError::InvalidSignature {
                reason: "unusable endpoint secret".to_string(),
            }
        })?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Produce a full signature header, as the processor would
    pub fn signature_header(&self, payload: &[u8], timestamp: i64) -> Result<String> {
        let signature = self.sign(payload, timestamp)?;
        Ok(format!("t={},v1={}", timestamp, hex::encode(signature)))
    }
}

fn parse_header(header: &str) -> Result<(i64, &str)> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        match part.split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }

    match (timestamp, signature) {
        (Some(t), Some(v1)) => Ok((t, v1)),
        _ => Err(PlatformError::InvalidSignature {
            reason: "malformed signature header".to_string(),
        }),
    }
}

//! Sponsorkit Payments - payment processor seam and intent orchestration
//!
//! The payment processor is consumed as an opaque capability interface:
//! any processor with split-payment support (charge the brand, retain the
//! platform fee, route the remainder to the creator's connected payout
//! account) satisfies [`PaymentProvider`]. The orchestrator guarantees at
//! most one upstream intent per deal and persists the intent id before
//! responding, so a crash never leaves an untracked intent.

pub mod connect;
pub mod mock;
pub mod provider;
pub mod service;

pub use connect::{AccountStatusView, ConnectService};
pub use mock::MockProvider;
pub use provider::{
    AccountLink, ConnectedAccount, CreateIntentRequest, IntentStatus, PaymentIntent,
    PaymentProvider, ProviderConfig,
};
pub use service::{CheckoutSession, PaymentService, PaymentStatusView};

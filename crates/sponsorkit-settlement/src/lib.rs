//! Sponsorkit Settlement - webhook consumption and reconciliation
//!
//! The payment processor delivers events at least once, in any order,
//! possibly concurrently. This crate verifies each delivery's
//! authenticity, deduplicates on the processor's event id, and applies
//! the resulting state changes (mark the deal paid, credit the creator,
//! promote the tier) exactly once per logical event.

pub mod parse;
pub mod reconciler;
pub mod webhook;

pub use parse::parse_event;
pub use reconciler::{Reconciler, WebhookOutcome};
pub use webhook::{WebhookConfig, WebhookVerifier};

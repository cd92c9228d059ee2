//! Sponsorkit Types - Canonical domain types for the deal marketplace
//!
//! This crate contains all foundational types for Sponsorkit with zero
//! dependencies on other sponsorkit crates. It defines the complete type
//! system for:
//!
//! - Identity types (DealId, CreatorId, BrandId, etc.)
//! - Money amounts and minor-unit conversion for the payment processor
//! - Deal records, terms and the deal status enum
//! - Creator records, fee tiers and payout readiness
//! - Settlement events delivered by the payment processor
//!
//! # Architectural Invariants
//!
//! These types support the core Sponsorkit correctness invariants:
//!
//! 1. Deal fee snapshots are frozen at creation and never recomputed
//! 2. Cumulative earnings only grow through confirmed settlements
//! 3. Terminal deal statuses are never left
//! 4. Every settlement event is applied at most once

pub mod creator;
pub mod deal;
pub mod error;
pub mod event;
pub mod identity;
pub mod money;

pub use creator::*;
pub use deal::*;
pub use error::*;
pub use event::*;
pub use identity::*;
pub use money::*;

/// Version of the Sponsorkit types schema
pub const TYPES_VERSION: &str = "0.1.0";

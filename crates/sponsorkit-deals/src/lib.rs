//! Sponsorkit Deals - deal lifecycle and transition validation
//!
//! Owns the deal state machine: which (role, current status) -> new status
//! moves are legal, who may request them, and the fee snapshot taken when
//! a deal is created. Settlement (moving a completed deal to paid) happens
//! in `sponsorkit-settlement`, not through the transition table.

pub mod service;
pub mod transition;

pub use service::{CreatorStats, DealService};
pub use transition::{allowed, validate};

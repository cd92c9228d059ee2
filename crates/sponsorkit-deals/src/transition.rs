//! The deal transition table
//!
//! A total function over (role, from, to). Anything not listed here is an
//! illegal move; there is no "no restriction" fallback.

use sponsorkit_types::{ActorRole, DealStatus, PlatformError, Result};

/// Whether the given role may move a deal from `from` to `to`
///
/// Terminal statuses (`paid`, `rejected`, `cancelled`) have no legal
/// outgoing moves. `completed` is only left through the payment flow.
/// Admins do not use this table; they go through the explicit override.
pub fn allowed(role: ActorRole, from: DealStatus, to: DealStatus) -> bool {
    use ActorRole::*;
    use DealStatus::*;

    matches!(
        (role, from, to),
        (Creator, Pending, Accepted)
            | (Creator, Pending, Rejected)
            | (Creator, Accepted, InProgress)
            | (Creator, Accepted, Rejected)
            | (Creator, InProgress, Completed)
            | (Brand, Pending, Cancelled)
    )
}

/// Validate a requested move, naming current and requested status on
/// failure
pub fn validate(role: ActorRole, from: DealStatus, to: DealStatus) -> Result<()> {
    if allowed(role, from, to) {
        Ok(())
    } else {
        Err(PlatformError::InvalidTransition {
            from,
            requested: to,
        })
    }
}

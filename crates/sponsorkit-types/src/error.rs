//! Error types for Sponsorkit
//!
//! One taxonomy for the whole platform so callers can tell "your request
//! was invalid" from "try again later" from "you're missing a setup step".

use thiserror::Error;

use crate::deal::DealStatus;

/// Result type for Sponsorkit operations
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Sponsorkit error types
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// Bad input shape or range
    #[error("Invalid argument: {field} - {reason}")]
    InvalidArgument { field: String, reason: String },

    /// Deal does not exist
    #[error("Deal {deal_id} not found")]
    DealNotFound { deal_id: String },

    /// Creator does not exist
    #[error("Creator {creator_id} not found")]
    CreatorNotFound { creator_id: String },

    /// Actor is not a party to the deal (or lacks the required role)
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// Legal-looking request, illegal given the deal's current status
    #[error("Cannot change status from {from} to {requested}")]
    InvalidTransition {
        from: DealStatus,
        requested: DealStatus,
    },

    /// Creator has not connected a payout account
    #[error("Creator has not connected a payout account")]
    PayoutAccountMissing,

    /// Upstream payment processor failure or timeout; retrying is safe
    #[error("Payment provider error: {message}")]
    PaymentProvider { message: String },

    /// Webhook payload failed authenticity verification
    #[error("Invalid signature: {reason}")]
    InvalidSignature { reason: String },

    /// Persistence failure; the delivery layer should signal retry
    #[error("Store error: {message}")]
    Store { message: String },
}

impl PlatformError {
    /// Create an invalid argument error
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Create a payment provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::PaymentProvider {
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Check if this is a retriable error
    ///
    /// Retriable errors leave no local state behind, so the caller may
    /// repeat the request verbatim.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::PaymentProvider { .. } | Self::Store { .. })
    }

    /// Get an error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::DealNotFound { .. } => "DEAL_NOT_FOUND",
            Self::CreatorNotFound { .. } => "CREATOR_NOT_FOUND",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::PayoutAccountMissing => "PAYOUT_ACCOUNT_MISSING",
            Self::PaymentProvider { .. } => "PAYMENT_PROVIDER_ERROR",
            Self::InvalidSignature { .. } => "INVALID_SIGNATURE",
            Self::Store { .. } => "STORE_ERROR",
        }
    }
}

//! Identity types for Sponsorkit
//!
//! All identity types are strongly typed wrappers around UUIDs to prevent
//! accidental mixing of different ID types. Identifiers issued by the
//! payment processor are opaque strings and get their own wrappers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from a string (with or without prefix)
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                let s = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Get the inner UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }
    };
}

/// Macro to generate wrappers for opaque processor-issued identifiers
macro_rules! define_opaque_id_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a processor-issued identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the raw identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

// Core identity types
define_id_type!(DealId, "deal", "Unique identifier for a sponsorship deal");
define_id_type!(CreatorId, "creator", "Unique identifier for a creator");
define_id_type!(BrandId, "brand", "Unique identifier for a brand manager");

// Processor-issued identity types (opaque, never parsed)
define_opaque_id_type!(
    PaymentIntentId,
    "Identifier of a payment intent at the payment processor"
);
define_opaque_id_type!(
    PayoutAccountId,
    "Identifier of a creator's connected payout account at the payment processor"
);
define_opaque_id_type!(
    ExternalEventId,
    "Globally unique identifier of a logical event delivered by the payment processor"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_parse() {
        let id = DealId::new();
        let shown = id.to_string();
        assert!(shown.starts_with("deal_"));
        assert_eq!(DealId::parse(&shown).unwrap(), id);
    }

    #[test]
    fn test_parse_without_prefix() {
        let id = CreatorId::new();
        let bare = id.as_uuid().to_string();
        assert_eq!(CreatorId::parse(&bare).unwrap(), id);
    }

    #[test]
    fn test_opaque_id_roundtrip() {
        let id = ExternalEventId::new("evt_1Nq2Yw");
        assert_eq!(id.as_str(), "evt_1Nq2Yw");
        assert_eq!(id.to_string(), "evt_1Nq2Yw");
    }
}

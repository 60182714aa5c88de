//! # Identifier Newtypes
//!
//! Type-level distinction between identifier namespaces: an `OrderId`
//! cannot be passed where a `DisputeId` or `UserId` is expected.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MarketError;

/// Generates a UUID-backed identifier newtype with a display prefix.
macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }

        impl FromStr for $name {
            type Err = MarketError;

            /// Parses a bare UUID or a prefixed form such as `order:<uuid>`.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .strip_prefix(concat!($prefix, ":"))
                    .unwrap_or(s);
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|e| MarketError::InvalidIdentifier(format!("{s:?}: {e}")))
            }
        }
    };
}

uuid_newtype!(
    /// Unique identifier for an order.
    OrderId,
    "order"
);

uuid_newtype!(
    /// Unique identifier for a marketplace user (buyer, seller, or admin).
    UserId,
    "user"
);

uuid_newtype!(
    /// Unique identifier for a submitted delivery.
    DeliveryId,
    "delivery"
);

uuid_newtype!(
    /// Unique identifier for a dispute.
    DisputeId,
    "dispute"
);

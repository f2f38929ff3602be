//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `SupplierId` where a `CustomerId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for the user who created a posting.");
typed_id!(CustomerId, "Unique identifier for a customer party.");
typed_id!(SupplierId, "Unique identifier for a supplier party.");
typed_id!(
    TransactionId,
    "Identifier shared by every entry of one balanced posting group."
);
typed_id!(LedgerEntryId, "Surrogate identifier for a single ledger row.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = CustomerId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
        assert_eq!(CustomerId::from(uuid), id);
    }

    #[test]
    fn test_typed_id_display_round_trips_through_from_str() {
        let id = SupplierId::new();
        let parsed = SupplierId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_typed_id_from_str_error() {
        assert!(TransactionId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_v7_ids_are_time_ordered() {
        let first = LedgerEntryId::new();
        let second = LedgerEntryId::new();
        assert!(first <= second);
    }
}

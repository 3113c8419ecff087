//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
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
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a user.
    UserId
}

uuid_id! {
    /// Unique identifier for a store.
    StoreId
}

uuid_id! {
    /// Unique identifier for an order.
    OrderId
}

uuid_id! {
    /// Unique identifier for a catalog item.
    ItemId
}

uuid_id! {
    /// Unique identifier for a sale fact row.
    SaleId
}

uuid_id! {
    /// Unique identifier for a review.
    ReviewId
}

uuid_id! {
    /// Unique identifier for an issued invitation token.
    InvitationId
}

/// Human-facing account identifier (e.g. `frosty.near`).
///
/// Users are addressed by account id in the access-management flows;
/// the UUID [`UserId`] stays internal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Creates an account id, validating length and charset.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::empty_field("account_id"));
        }
        if value.len() < 2 || value.len() > 64 {
            return Err(ValidationError::out_of_range(
                "account_id",
                2,
                64,
                value.len() as i32,
            ));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(ValidationError::invalid_format(
                "account_id",
                "only ASCII alphanumerics, '.', '_' and '-' are allowed",
            ));
        }
        Ok(Self(value))
    }

    /// Returns the account id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(StoreId::new(), StoreId::new());
        assert_ne!(OrderId::new(), OrderId::new());
    }

    #[test]
    fn id_roundtrips_through_display_and_from_str() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = StoreId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }

    #[test]
    fn account_id_accepts_near_style_names() {
        assert!(AccountId::new("frosty.near").is_ok());
        assert!(AccountId::new("store_hub-01").is_ok());
    }

    #[test]
    fn account_id_rejects_empty_and_too_short() {
        assert!(AccountId::new("").is_err());
        assert!(AccountId::new("a").is_err());
    }

    #[test]
    fn account_id_rejects_bad_characters() {
        assert!(AccountId::new("has space").is_err());
        assert!(AccountId::new("semi;colon").is_err());
    }

    #[test]
    fn account_id_rejects_over_long_values() {
        let long = "a".repeat(65);
        assert!(AccountId::new(long).is_err());
    }
}

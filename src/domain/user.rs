//! User entity and status flag.

use serde::{Deserialize, Serialize};

use super::foundation::{AccountId, Timestamp, UserId};

/// Coarse account classification. Promoted to `StoreOwner` when the user
/// provisions their first store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum UserStatus {
    NormalUser,
    StoreOwner,
}

/// A platform user, buyer or seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub account_id: AccountId,
    pub email: String,
    pub status: UserStatus,
    pub created_at: Timestamp,
}

impl User {
    /// Returns true if the user has been promoted to store owner.
    pub fn is_store_owner(&self) -> bool {
        self.status == UserStatus::StoreOwner
    }
}

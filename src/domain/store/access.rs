//! Store access levels and the per-user ownership record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    AccountId, StoreId, Timestamp, UserId, ValidationError,
};

/// One of the five grantable store access levels.
///
/// An ownership record holds a *set* of these, not a single rank;
/// `FullAccess` is the level granted to the primary owner at store
/// creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum AccessLevel {
    FullAccess = 1,
    ProductInventoryAccess = 2,
    SalesAccess = 3,
    OrdersAccess = 4,
    FinancialAccess = 5,
}

impl AccessLevel {
    /// Creates an AccessLevel from its wire integer.
    pub fn try_from_i32(value: i32) -> Result<Self, ValidationError> {
        match value {
            1 => Ok(AccessLevel::FullAccess),
            2 => Ok(AccessLevel::ProductInventoryAccess),
            3 => Ok(AccessLevel::SalesAccess),
            4 => Ok(AccessLevel::OrdersAccess),
            5 => Ok(AccessLevel::FinancialAccess),
            _ => Err(ValidationError::out_of_range("access_level", 1, 5, value)),
        }
    }

    /// Returns the wire integer for this level.
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Human-readable label used in invitation emails.
    pub fn label(&self) -> &'static str {
        match self {
            AccessLevel::FullAccess => "Full Access",
            AccessLevel::ProductInventoryAccess => "Product Inventory Access",
            AccessLevel::SalesAccess => "Sales Access",
            AccessLevel::OrdersAccess => "Orders Access",
            AccessLevel::FinancialAccess => "Financial Access",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Ordered set of access levels held by one ownership record.
///
/// Insertion order is preserved (grant order is meaningful to the roster
/// display); membership is unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLevelSet(Vec<AccessLevel>);

impl AccessLevelSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a set holding a single level.
    pub fn single(level: AccessLevel) -> Self {
        Self(vec![level])
    }

    /// Adds a level if absent. Returns true if the set changed.
    pub fn insert(&mut self, level: AccessLevel) -> bool {
        if self.0.contains(&level) {
            false
        } else {
            self.0.push(level);
            true
        }
    }

    /// Removes a level if present. Returns true if the set changed.
    pub fn remove(&mut self, level: AccessLevel) -> bool {
        let before = self.0.len();
        self.0.retain(|l| *l != level);
        self.0.len() != before
    }

    pub fn contains(&self, level: AccessLevel) -> bool {
        self.0.contains(&level)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the levels in grant order.
    pub fn iter(&self) -> impl Iterator<Item = AccessLevel> + '_ {
        self.0.iter().copied()
    }

    /// Wire representation for array-typed storage.
    pub fn as_i32s(&self) -> Vec<i32> {
        self.0.iter().map(|l| l.as_i32()).collect()
    }

    /// Parses a wire array, rejecting unknown levels and duplicates.
    pub fn from_i32s(values: &[i32]) -> Result<Self, ValidationError> {
        let mut set = Self::new();
        for v in values {
            let level = AccessLevel::try_from_i32(*v)?;
            if !set.insert(level) {
                return Err(ValidationError::invalid_format(
                    "access_levels",
                    format!("duplicate level {}", v),
                ));
            }
        }
        Ok(set)
    }
}

/// A user's ownership record for one store.
///
/// At most one record exists per (store, user) pair; all of the user's
/// levels for that store live in this record's level set. Exactly one
/// record per store carries `is_primary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreOwnership {
    pub store_id: StoreId,
    pub user_id: UserId,
    pub access_levels: AccessLevelSet,
    pub is_primary: bool,
    pub granted_at: Timestamp,
}

impl StoreOwnership {
    /// The record created at store-creation time: full access, primary.
    pub fn primary(store_id: StoreId, user_id: UserId, granted_at: Timestamp) -> Self {
        Self {
            store_id,
            user_id,
            access_levels: AccessLevelSet::single(AccessLevel::FullAccess),
            is_primary: true,
            granted_at,
        }
    }

    /// A co-owner record created by invitation redemption or a direct grant.
    pub fn co_owner(
        store_id: StoreId,
        user_id: UserId,
        level: AccessLevel,
        granted_at: Timestamp,
    ) -> Self {
        Self {
            store_id,
            user_id,
            access_levels: AccessLevelSet::single(level),
            is_primary: false,
            granted_at,
        }
    }
}

/// Roster line for one store owner, joined with account details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerRosterEntry {
    pub account_id: AccountId,
    pub access_levels: AccessLevelSet,
    pub is_primary: bool,
    pub granted_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_level_wire_roundtrip() {
        for v in 1..=5 {
            assert_eq!(AccessLevel::try_from_i32(v).unwrap().as_i32(), v);
        }
        assert!(AccessLevel::try_from_i32(0).is_err());
        assert!(AccessLevel::try_from_i32(6).is_err());
    }

    #[test]
    fn set_insert_is_idempotent() {
        let mut set = AccessLevelSet::single(AccessLevel::SalesAccess);
        assert!(!set.insert(AccessLevel::SalesAccess));
        assert!(set.insert(AccessLevel::OrdersAccess));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn set_preserves_grant_order() {
        let mut set = AccessLevelSet::new();
        set.insert(AccessLevel::FinancialAccess);
        set.insert(AccessLevel::SalesAccess);
        assert_eq!(set.as_i32s(), vec![5, 3]);
    }

    #[test]
    fn set_remove_reports_change() {
        let mut set = AccessLevelSet::single(AccessLevel::SalesAccess);
        assert!(set.remove(AccessLevel::SalesAccess));
        assert!(!set.remove(AccessLevel::SalesAccess));
        assert!(set.is_empty());
    }

    #[test]
    fn from_i32s_rejects_unknown_and_duplicate_levels() {
        assert!(AccessLevelSet::from_i32s(&[1, 9]).is_err());
        assert!(AccessLevelSet::from_i32s(&[3, 3]).is_err());
        let set = AccessLevelSet::from_i32s(&[1, 4]).unwrap();
        assert!(set.contains(AccessLevel::FullAccess));
        assert!(set.contains(AccessLevel::OrdersAccess));
    }

    #[test]
    fn primary_record_holds_full_access_only() {
        let rec = StoreOwnership::primary(StoreId::new(), UserId::new(), Timestamp::now());
        assert!(rec.is_primary);
        assert_eq!(rec.access_levels.as_i32s(), vec![1]);
    }

    #[test]
    fn co_owner_record_is_not_primary() {
        let rec = StoreOwnership::co_owner(
            StoreId::new(),
            UserId::new(),
            AccessLevel::SalesAccess,
            Timestamp::now(),
        );
        assert!(!rec.is_primary);
        assert_eq!(rec.access_levels.as_i32s(), vec![3]);
    }
}

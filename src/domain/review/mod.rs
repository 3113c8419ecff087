//! Product reviews gated on purchase history.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ItemId, Rating, ReviewId, StoreId, Timestamp, UserId};

/// A buyer's review of an item at a store.
///
/// At most one review exists per order; uniqueness is enforced through the
/// order's `is_reviewed` flag rather than a constraint on this row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub store_id: StoreId,
    pub item_id: ItemId,
    pub user_id: UserId,
    pub rating: Rating,
    pub comment: String,
    pub is_verified_purchase: bool,
    pub created_at: Timestamp,
}

/// Fields for inserting a review row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub store_id: StoreId,
    pub item_id: ItemId,
    pub user_id: UserId,
    pub rating: Rating,
    pub comment: String,
    pub is_verified_purchase: bool,
}

/// Result of a review submission.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    /// A review row was created and the order marked reviewed.
    Created(Review),
    /// The order was already reviewed; nothing was written.
    AlreadyReviewed,
}

impl ReviewOutcome {
    /// Returns the created review, if any.
    pub fn review(&self) -> Option<&Review> {
        match self {
            ReviewOutcome::Created(review) => Some(review),
            ReviewOutcome::AlreadyReviewed => None,
        }
    }
}

//! Purchase-gated, idempotent review creation.

use std::sync::Arc;

use crate::domain::foundation::{
    DomainError, ErrorCode, ItemId, OrderId, Rating, StoreId, UserId,
};
use crate::domain::review::{NewReview, ReviewOutcome};
use crate::ports::{StoreReader, StoreTx, TransactionCoordinator};

/// Command to submit a review for a purchased item.
#[derive(Debug, Clone)]
pub struct SubmitReviewCommand {
    pub buyer_id: UserId,
    pub store_id: StoreId,
    pub item_id: ItemId,
    pub order_id: OrderId,
    pub rating: Rating,
    pub comment: String,
}

/// Verifies purchase history and order state before allowing exactly one
/// review per order.
pub struct ReviewGate<C> {
    coordinator: Arc<C>,
    reader: Arc<dyn StoreReader>,
}

impl<C: TransactionCoordinator> ReviewGate<C> {
    pub fn new(coordinator: Arc<C>, reader: Arc<dyn StoreReader>) -> Self {
        Self {
            coordinator,
            reader,
        }
    }

    /// Submits a review for the given order.
    ///
    /// Fails `NoPurchase` if the buyer never completed a purchase of this
    /// item at this store; `NoPurchase` is a domain rule, not an
    /// infrastructure failure, and callers map it to a forbidden
    /// response. An order that is already reviewed yields
    /// [`ReviewOutcome::AlreadyReviewed`] without writing anything, so
    /// retried submissions are safe. Otherwise the review insert and the
    /// order's reviewed flag commit together or not at all.
    pub async fn submit_review(
        &self,
        cmd: SubmitReviewCommand,
    ) -> Result<ReviewOutcome, DomainError> {
        let has_purchase = self
            .reader
            .has_completed_purchase(cmd.buyer_id, cmd.store_id, cmd.item_id)
            .await?;
        if !has_purchase {
            return Err(DomainError::new(
                ErrorCode::NoPurchase,
                "Cannot review an item that was never purchased",
            ));
        }

        let order = self
            .reader
            .get_order_for_buyer(cmd.order_id, cmd.buyer_id, cmd.store_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::OrderNotFound, "Order not found"))?;

        if order.is_reviewed {
            return Ok(ReviewOutcome::AlreadyReviewed);
        }

        let SubmitReviewCommand {
            buyer_id,
            store_id,
            item_id,
            order_id,
            rating,
            comment,
        } = cmd;

        self.coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(async move {
                    // Claim the flag first; if a concurrent submission won
                    // the race between our read and this transaction, fall
                    // back to the idempotent no-op instead of double
                    // inserting.
                    if !tx.claim_order_review(order_id, buyer_id, store_id).await? {
                        return Ok(ReviewOutcome::AlreadyReviewed);
                    }

                    let review = tx
                        .insert_review(NewReview {
                            store_id,
                            item_id,
                            user_id: buyer_id,
                            rating,
                            comment,
                            is_verified_purchase: true,
                        })
                        .await?;

                    tracing::info!(
                        order_id = %order_id,
                        store_id = %store_id,
                        "review created for delivered order"
                    );

                    Ok(ReviewOutcome::Created(review))
                })
            }))
            .await
    }
}

//! Order delivery-status transitions and their sales-ledger side effects.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, StateMachine, StoreId, UserId};
use crate::domain::order::{DeliveryStatus, NewSale, Order, OrderPatch};
use crate::ports::{StoreTx, TransactionCoordinator};

/// Command to apply a partial update to a seller's order.
#[derive(Debug, Clone)]
pub struct UpdateOrderCommand {
    pub order_id: OrderId,
    pub seller_id: UserId,
    pub store_id: StoreId,
    pub patch: OrderPatch,
}

/// Validates and applies delivery-status transitions; on terminal
/// transitions updates the sales ledger in the same transaction.
pub struct OrderLifecycle<C> {
    coordinator: Arc<C>,
}

impl<C: TransactionCoordinator> OrderLifecycle<C> {
    pub fn new(coordinator: Arc<C>) -> Self {
        Self { coordinator }
    }

    /// Applies the patch to the order identified by (order, seller, store).
    ///
    /// The triple is the authorization check: a mismatch fails
    /// `OrderNotFound`. Repeating the current status is an idempotent
    /// no-op returning the order unchanged; an illegal transition fails
    /// `IllegalTransition`. Reaching DELIVERED inserts the order's sale
    /// row (at most once); reaching RETURNED decrements the sales
    /// overview. Transition legality is checked against a locked read
    /// inside the transaction, so concurrent updates to the same order
    /// serialize rather than both passing a stale check.
    pub async fn update_order(&self, cmd: UpdateOrderCommand) -> Result<Order, DomainError> {
        let UpdateOrderCommand {
            order_id,
            seller_id,
            store_id,
            patch,
        } = cmd;

        self.coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(async move {
                    let order = tx
                        .get_order_for_seller(order_id, seller_id, store_id)
                        .await?
                        .ok_or_else(|| {
                            DomainError::new(ErrorCode::OrderNotFound, "Order not found")
                        })?;

                    let target = match patch.delivery_status {
                        Some(target) if target == order.delivery_status => {
                            // Retried request; nothing to do.
                            return Ok(order);
                        }
                        Some(target) => {
                            order.delivery_status.transition_to(target)?;
                            Some(target)
                        }
                        None => None,
                    };

                    let updated = tx
                        .update_order(order_id, seller_id, store_id, &patch)
                        .await?;

                    match target {
                        Some(DeliveryStatus::Delivered) => {
                            // Existence guard keeps a retried call from
                            // double-recording the sale.
                            if !tx.sale_exists_for_order(order_id).await? {
                                tx.insert_sale(NewSale::from_order(&updated)).await?;
                                tracing::info!(
                                    order_id = %order_id,
                                    store_id = %store_id,
                                    "sale recorded for delivered order"
                                );
                            }
                        }
                        Some(DeliveryStatus::Returned) => {
                            tx.decrement_sales_overview(
                                updated.store_id,
                                updated.item_id,
                                updated.total_minor,
                            )
                            .await?;
                            tracing::info!(
                                order_id = %order_id,
                                store_id = %store_id,
                                "sales overview decremented for returned order"
                            );
                        }
                        _ => {}
                    }

                    Ok(updated)
                })
            }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryCoordinator, MemoryStore};
    use crate::domain::foundation::{ItemId, StateMachine, Timestamp};
    use crate::domain::order::{PaymentChannel, PaymentMethod};

    fn lifecycle(store: &MemoryStore) -> OrderLifecycle<MemoryCoordinator> {
        OrderLifecycle::new(Arc::new(store.coordinator()))
    }

    fn order_in(status: DeliveryStatus) -> Order {
        Order {
            id: OrderId::new(),
            delivery_status: status,
            delivered_on: None,
            expected_delivery_date: None,
            item_id: ItemId::new(),
            quantity: 1,
            buyer_id: UserId::new(),
            seller_id: UserId::new(),
            store_id: StoreId::new(),
            delivery_fee_minor: 500,
            total_minor: 4500,
            payment_channel: PaymentChannel::Near,
            payment_method: PaymentMethod::InstantPay,
            is_reviewed: false,
            created_at: Timestamp::now(),
        }
    }

    fn cmd(order: &Order, patch: OrderPatch) -> UpdateOrderCommand {
        UpdateOrderCommand {
            order_id: order.id,
            seller_id: order.seller_id,
            store_id: order.store_id,
            patch,
        }
    }

    fn delivered_patch() -> OrderPatch {
        OrderPatch {
            delivery_status: Some(DeliveryStatus::Delivered),
            delivered_on: Some(Timestamp::now()),
            expected_delivery_date: None,
        }
    }

    #[tokio::test]
    async fn full_lifecycle_records_exactly_one_sale() {
        let store = MemoryStore::new();
        let order = order_in(DeliveryStatus::Pending);
        store.seed_order(order.clone()).await;
        let lifecycle = lifecycle(&store);

        for status in [DeliveryStatus::Processing, DeliveryStatus::Shipped] {
            lifecycle
                .update_order(cmd(&order, OrderPatch::status(status)))
                .await
                .unwrap();
        }
        let updated = lifecycle
            .update_order(cmd(&order, delivered_patch()))
            .await
            .unwrap();
        assert_eq!(updated.delivery_status, DeliveryStatus::Delivered);
        assert!(updated.delivered_on.is_some());

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.sales.len(), 1);
        let overview = snapshot
            .overviews
            .get(&(order.store_id, order.item_id))
            .unwrap();
        assert_eq!(overview.sale_count, 1);
        assert_eq!(overview.revenue_minor, 4500);
    }

    #[tokio::test]
    async fn repeating_the_current_status_is_a_no_op() {
        let store = MemoryStore::new();
        let order = order_in(DeliveryStatus::Shipped);
        store.seed_order(order.clone()).await;
        let lifecycle = lifecycle(&store);

        let delivered = lifecycle
            .update_order(cmd(&order, delivered_patch()))
            .await
            .unwrap();
        assert_eq!(delivered.delivery_status, DeliveryStatus::Delivered);

        // Same target status again: unchanged order, still one sale.
        let retried = lifecycle
            .update_order(cmd(&order, delivered_patch()))
            .await
            .unwrap();
        assert_eq!(retried, delivered);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.sales.len(), 1);
        assert_eq!(
            snapshot
                .overviews
                .get(&(order.store_id, order.item_id))
                .unwrap()
                .sale_count,
            1
        );
    }

    #[tokio::test]
    async fn illegal_transition_fails_loudly_and_changes_nothing() {
        let store = MemoryStore::new();
        let order = order_in(DeliveryStatus::Returned);
        store.seed_order(order.clone()).await;
        let lifecycle = lifecycle(&store);

        let err = lifecycle
            .update_order(cmd(&order, OrderPatch::status(DeliveryStatus::Pending)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::IllegalTransition);

        let snapshot = store.snapshot().await;
        assert_eq!(
            snapshot.orders.get(&order.id).unwrap().delivery_status,
            DeliveryStatus::Returned
        );
    }

    #[tokio::test]
    async fn every_pair_in_the_transition_table_is_enforced() {
        for from in DeliveryStatus::all() {
            for to in DeliveryStatus::all() {
                if from == to {
                    continue;
                }
                let store = MemoryStore::new();
                let order = order_in(from);
                store.seed_order(order.clone()).await;
                let lifecycle = lifecycle(&store);

                let result = lifecycle
                    .update_order(cmd(&order, OrderPatch::status(to)))
                    .await;

                if from.can_transition_to(&to) {
                    assert_eq!(
                        result.unwrap().delivery_status,
                        to,
                        "{from:?} -> {to:?} should succeed"
                    );
                } else {
                    assert_eq!(
                        result.unwrap_err().code,
                        ErrorCode::IllegalTransition,
                        "{from:?} -> {to:?} should be rejected"
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn returned_order_decrements_the_overview() {
        let store = MemoryStore::new();
        let order = order_in(DeliveryStatus::Shipped);
        store.seed_order(order.clone()).await;
        let lifecycle = lifecycle(&store);

        lifecycle
            .update_order(cmd(&order, delivered_patch()))
            .await
            .unwrap();
        lifecycle
            .update_order(cmd(&order, OrderPatch::status(DeliveryStatus::Cancelled)))
            .await
            .unwrap();
        lifecycle
            .update_order(cmd(&order, OrderPatch::status(DeliveryStatus::Returned)))
            .await
            .unwrap();

        let snapshot = store.snapshot().await;
        let overview = snapshot
            .overviews
            .get(&(order.store_id, order.item_id))
            .unwrap();
        assert_eq!(overview.sale_count, 0);
        assert_eq!(overview.revenue_minor, 0);
        // The sale fact row itself is append-only and survives.
        assert_eq!(snapshot.sales.len(), 1);
    }

    #[tokio::test]
    async fn partial_update_without_status_leaves_status_alone() {
        let store = MemoryStore::new();
        let order = order_in(DeliveryStatus::Processing);
        store.seed_order(order.clone()).await;
        let lifecycle = lifecycle(&store);

        let expected = Timestamp::now().plus_secs(86_400);
        let updated = lifecycle
            .update_order(cmd(
                &order,
                OrderPatch {
                    delivery_status: None,
                    delivered_on: None,
                    expected_delivery_date: Some(expected),
                },
            ))
            .await
            .unwrap();

        assert_eq!(updated.delivery_status, DeliveryStatus::Processing);
        assert_eq!(updated.expected_delivery_date, Some(expected));
        assert!(store.snapshot().await.sales.is_empty());
    }

    #[tokio::test]
    async fn wrong_seller_reads_as_order_not_found() {
        let store = MemoryStore::new();
        let order = order_in(DeliveryStatus::Pending);
        store.seed_order(order.clone()).await;
        let lifecycle = lifecycle(&store);

        let err = lifecycle
            .update_order(UpdateOrderCommand {
                order_id: order.id,
                seller_id: UserId::new(),
                store_id: order.store_id,
                patch: OrderPatch::status(DeliveryStatus::Processing),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }
}

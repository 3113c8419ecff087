//! Sales ledger rows derived from delivered orders.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ItemId, OrderId, SaleId, StoreId, Timestamp, UserId};

use super::Order;

/// Append-only fact row recording that an order was delivered.
///
/// At most one sale exists per order; it is created the first time the
/// order reaches DELIVERED and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub order_id: OrderId,
    pub store_id: StoreId,
    pub item_id: ItemId,
    pub customer_id: UserId,
    pub seller_id: UserId,
    pub amount_minor: i64,
    pub created_at: Timestamp,
}

/// Fields for inserting a sale row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub order_id: OrderId,
    pub store_id: StoreId,
    pub item_id: ItemId,
    pub customer_id: UserId,
    pub seller_id: UserId,
    pub amount_minor: i64,
}

impl NewSale {
    /// Derives the sale fact from a delivered order.
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id,
            store_id: order.store_id,
            item_id: order.item_id,
            customer_id: order.buyer_id,
            seller_id: order.seller_id,
            amount_minor: order.total_minor,
        }
    }
}

/// Per-(store, item) sales aggregate.
///
/// Incremented by the data layer when a sale row is inserted; decremented
/// by the order lifecycle when an order is RETURNED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesOverview {
    pub store_id: StoreId,
    pub item_id: ItemId,
    pub sale_count: i64,
    pub revenue_minor: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{DeliveryStatus, PaymentChannel, PaymentMethod};

    #[test]
    fn sale_fact_mirrors_order_references() {
        let order = Order {
            id: OrderId::new(),
            delivery_status: DeliveryStatus::Delivered,
            delivered_on: Some(Timestamp::now()),
            expected_delivery_date: None,
            item_id: ItemId::new(),
            quantity: 1,
            buyer_id: UserId::new(),
            seller_id: UserId::new(),
            store_id: StoreId::new(),
            delivery_fee_minor: 0,
            total_minor: 1299,
            payment_channel: PaymentChannel::PayPal,
            payment_method: PaymentMethod::PayOnDelivery,
            is_reviewed: false,
            created_at: Timestamp::now(),
        };

        let sale = NewSale::from_order(&order);
        assert_eq!(sale.order_id, order.id);
        assert_eq!(sale.customer_id, order.buyer_id);
        assert_eq!(sale.seller_id, order.seller_id);
        assert_eq!(sale.amount_minor, 1299);
    }
}

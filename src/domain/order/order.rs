//! Order entity and the partial-update patch applied by the lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ItemId, OrderId, StoreId, Timestamp, UserId};

use super::DeliveryStatus;

/// How the buyer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentChannel {
    Near,
    DebitCard,
    CreditCard,
    PayPal,
}

/// When the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    InstantPay,
    PayOnDelivery,
}

/// A buyer's order for one item at one store.
///
/// Created by order placement (outside this crate), mutated only by the
/// order lifecycle, never deleted. Monetary amounts are minor currency
/// units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub delivery_status: DeliveryStatus,
    pub delivered_on: Option<Timestamp>,
    pub expected_delivery_date: Option<Timestamp>,
    pub item_id: ItemId,
    pub quantity: i32,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub store_id: StoreId,
    pub delivery_fee_minor: i64,
    pub total_minor: i64,
    pub payment_channel: PaymentChannel,
    pub payment_method: PaymentMethod,
    pub is_reviewed: bool,
    pub created_at: Timestamp,
}

/// Partial update applied to an order.
///
/// `None` fields are left unchanged (COALESCE semantics); this is not a
/// full-record overwrite. Whether `delivered_on` must accompany a
/// DELIVERED transition is the calling layer's rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub delivery_status: Option<DeliveryStatus>,
    pub delivered_on: Option<Timestamp>,
    pub expected_delivery_date: Option<Timestamp>,
}

impl OrderPatch {
    /// A patch that only moves the delivery status.
    pub fn status(status: DeliveryStatus) -> Self {
        Self {
            delivery_status: Some(status),
            ..Default::default()
        }
    }

    /// True if the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.delivery_status.is_none()
            && self.delivered_on.is_none()
            && self.expected_delivery_date.is_none()
    }

    /// Applies the patch to an order value, field by field.
    pub fn apply_to(&self, order: &mut Order) {
        if let Some(status) = self.delivery_status {
            order.delivery_status = status;
        }
        if let Some(delivered_on) = self.delivered_on {
            order.delivered_on = Some(delivered_on);
        }
        if let Some(expected) = self.expected_delivery_date {
            order.expected_delivery_date = Some(expected);
        }
    }
}

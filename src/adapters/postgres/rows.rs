//! Row structs and parsers shared by the PostgreSQL adapter.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::foundation::{
    AccountId, DomainError, ItemId, OrderId, Rating, ReviewId, SaleId, StoreId, Timestamp,
    UserId,
};
use crate::domain::order::{
    DeliveryStatus, Order, PaymentChannel, PaymentMethod, Sale, SalesOverview,
};
use crate::domain::review::Review;
use crate::domain::store::{AccessLevelSet, OwnerRosterEntry, Store, StoreOwnership};
use crate::domain::user::{User, UserStatus};

/// Wraps a row-decoding failure; corrupt rows surface as database errors,
/// never as domain-rule violations.
fn corrupt(entity: &str, reason: impl std::fmt::Display) -> DomainError {
    DomainError::database(format!("Corrupt {} row: {}", entity, reason))
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub account_id: String,
    pub email: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::from_uuid(row.id),
            account_id: AccountId::new(row.account_id).map_err(|e| corrupt("user", e))?,
            email: row.email,
            status: parse_user_status(&row.status)?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

pub fn parse_user_status(s: &str) -> Result<UserStatus, DomainError> {
    match s {
        "NORMAL-USER" => Ok(UserStatus::NormalUser),
        "STORE-OWNER" => Ok(UserStatus::StoreOwner),
        other => Err(corrupt("user", format!("unknown status '{}'", other))),
    }
}

pub fn user_status_to_str(status: UserStatus) -> &'static str {
    match status {
        UserStatus::NormalUser => "NORMAL-USER",
        UserStatus::StoreOwner => "STORE-OWNER",
    }
}

#[derive(Debug, FromRow)]
pub struct StoreRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub profile_image_url: Option<String>,
    pub is_verified: bool,
    pub is_frozen: bool,
    pub created_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: StoreId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            category: row.category,
            profile_image_url: row.profile_image_url,
            is_verified: row.is_verified,
            is_frozen: row.is_frozen,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[derive(Debug, FromRow)]
pub struct OwnershipRow {
    pub store_id: Uuid,
    pub user_id: Uuid,
    pub access_levels: Vec<i32>,
    pub is_primary: bool,
    pub granted_at: DateTime<Utc>,
}

impl TryFrom<OwnershipRow> for StoreOwnership {
    type Error = DomainError;

    fn try_from(row: OwnershipRow) -> Result<Self, Self::Error> {
        Ok(StoreOwnership {
            store_id: StoreId::from_uuid(row.store_id),
            user_id: UserId::from_uuid(row.user_id),
            access_levels: AccessLevelSet::from_i32s(&row.access_levels)
                .map_err(|e| corrupt("store_owner", e))?,
            is_primary: row.is_primary,
            granted_at: Timestamp::from_datetime(row.granted_at),
        })
    }
}

#[derive(Debug, FromRow)]
pub struct RosterRow {
    pub account_id: String,
    pub access_levels: Vec<i32>,
    pub is_primary: bool,
    pub granted_at: DateTime<Utc>,
}

impl TryFrom<RosterRow> for OwnerRosterEntry {
    type Error = DomainError;

    fn try_from(row: RosterRow) -> Result<Self, Self::Error> {
        Ok(OwnerRosterEntry {
            account_id: AccountId::new(row.account_id).map_err(|e| corrupt("store_owner", e))?,
            access_levels: AccessLevelSet::from_i32s(&row.access_levels)
                .map_err(|e| corrupt("store_owner", e))?,
            is_primary: row.is_primary,
            granted_at: Timestamp::from_datetime(row.granted_at),
        })
    }
}

#[derive(Debug, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub delivery_status: String,
    pub delivered_on: Option<DateTime<Utc>>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub item_id: Uuid,
    pub quantity: i32,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub store_id: Uuid,
    pub delivery_fee_minor: i64,
    pub total_minor: i64,
    pub payment_channel: String,
    pub payment_method: String,
    pub is_reviewed: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: OrderId::from_uuid(row.id),
            delivery_status: row
                .delivery_status
                .parse::<DeliveryStatus>()
                .map_err(|e| corrupt("order", e))?,
            delivered_on: row.delivered_on.map(Timestamp::from_datetime),
            expected_delivery_date: row.expected_delivery_date.map(Timestamp::from_datetime),
            item_id: ItemId::from_uuid(row.item_id),
            quantity: row.quantity,
            buyer_id: UserId::from_uuid(row.buyer_id),
            seller_id: UserId::from_uuid(row.seller_id),
            store_id: StoreId::from_uuid(row.store_id),
            delivery_fee_minor: row.delivery_fee_minor,
            total_minor: row.total_minor,
            payment_channel: parse_payment_channel(&row.payment_channel)?,
            payment_method: parse_payment_method(&row.payment_method)?,
            is_reviewed: row.is_reviewed,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

pub fn parse_payment_channel(s: &str) -> Result<PaymentChannel, DomainError> {
    match s {
        "NEAR" => Ok(PaymentChannel::Near),
        "Debit Card" => Ok(PaymentChannel::DebitCard),
        "Credit Card" => Ok(PaymentChannel::CreditCard),
        "PayPal" => Ok(PaymentChannel::PayPal),
        other => Err(corrupt("order", format!("unknown payment channel '{}'", other))),
    }
}

pub fn parse_payment_method(s: &str) -> Result<PaymentMethod, DomainError> {
    match s {
        "Instant Pay" => Ok(PaymentMethod::InstantPay),
        "Pay on Delivery" => Ok(PaymentMethod::PayOnDelivery),
        other => Err(corrupt("order", format!("unknown payment method '{}'", other))),
    }
}

#[derive(Debug, FromRow)]
pub struct SaleRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub store_id: Uuid,
    pub item_id: Uuid,
    pub customer_id: Uuid,
    pub seller_id: Uuid,
    pub amount_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            id: SaleId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            store_id: StoreId::from_uuid(row.store_id),
            item_id: ItemId::from_uuid(row.item_id),
            customer_id: UserId::from_uuid(row.customer_id),
            seller_id: UserId::from_uuid(row.seller_id),
            amount_minor: row.amount_minor,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[derive(Debug, FromRow)]
pub struct OverviewRow {
    pub store_id: Uuid,
    pub item_id: Uuid,
    pub sale_count: i64,
    pub revenue_minor: i64,
}

impl From<OverviewRow> for SalesOverview {
    fn from(row: OverviewRow) -> Self {
        SalesOverview {
            store_id: StoreId::from_uuid(row.store_id),
            item_id: ItemId::from_uuid(row.item_id),
            sale_count: row.sale_count,
            revenue_minor: row.revenue_minor,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ReviewRow {
    pub id: Uuid,
    pub store_id: Uuid,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub is_verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = DomainError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating)
            .ok()
            .and_then(|v| Rating::try_new(v).ok())
            .ok_or_else(|| corrupt("review", format!("rating {}", row.rating)))?;
        Ok(Review {
            id: ReviewId::from_uuid(row.id),
            store_id: StoreId::from_uuid(row.store_id),
            item_id: ItemId::from_uuid(row.item_id),
            user_id: UserId::from_uuid(row.user_id),
            rating,
            comment: row.comment,
            is_verified_purchase: row.is_verified_purchase,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_wire_values_parse() {
        assert_eq!(parse_payment_channel("NEAR").unwrap(), PaymentChannel::Near);
        assert_eq!(
            parse_payment_channel("Debit Card").unwrap(),
            PaymentChannel::DebitCard
        );
        assert_eq!(
            parse_payment_channel("Credit Card").unwrap(),
            PaymentChannel::CreditCard
        );
        assert_eq!(
            parse_payment_channel("PayPal").unwrap(),
            PaymentChannel::PayPal
        );
        assert_eq!(
            parse_payment_method("Instant Pay").unwrap(),
            PaymentMethod::InstantPay
        );
        assert_eq!(
            parse_payment_method("Pay on Delivery").unwrap(),
            PaymentMethod::PayOnDelivery
        );
    }

    #[test]
    fn user_status_roundtrips() {
        for status in [UserStatus::NormalUser, UserStatus::StoreOwner] {
            let s = user_status_to_str(status);
            assert_eq!(parse_user_status(s).unwrap(), status);
        }
    }

    #[test]
    fn unknown_wire_values_are_rejected() {
        assert!(parse_payment_channel("Barter").is_err());
        assert!(parse_payment_method("IOU").is_err());
        assert!(parse_user_status("ADMIN").is_err());
    }

    #[test]
    fn ownership_row_with_bad_level_is_corrupt() {
        let row = OwnershipRow {
            store_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            access_levels: vec![1, 7],
            is_primary: false,
            granted_at: Utc::now(),
        };
        let err = StoreOwnership::try_from(row).unwrap_err();
        assert_eq!(err.code, crate::domain::foundation::ErrorCode::DatabaseError);
    }

    #[test]
    fn review_row_with_bad_rating_is_corrupt() {
        let row = ReviewRow {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            rating: 11,
            comment: String::new(),
            is_verified_purchase: true,
            created_at: Utc::now(),
        };
        assert!(Review::try_from(row).is_err());
    }
}

//! Transactional handle over an open PostgreSQL transaction.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::domain::foundation::{
    AccountId, DomainError, ErrorCode, ItemId, OrderId, ReviewId, SaleId, StoreId, Timestamp,
    UserId,
};
use crate::domain::invitation::InvitationSession;
use crate::domain::order::{NewSale, Order, OrderPatch, Sale};
use crate::domain::review::{NewReview, Review};
use crate::domain::store::{
    AccessLevel, NewStore, OwnerRosterEntry, Store, StoreOwnership,
};
use crate::domain::user::{User, UserStatus};
use crate::ports::StoreTx;

use super::rows::{
    user_status_to_str, OrderRow, OwnershipRow, ReviewRow, RosterRow, SaleRow, StoreRow, UserRow,
};

const ORDER_COLUMNS: &str = "id, delivery_status, delivered_on, expected_delivery_date, \
     item_id, quantity, buyer_id, seller_id, store_id, delivery_fee_minor, total_minor, \
     payment_channel, payment_method, is_reviewed, created_at";

const OWNERSHIP_COLUMNS: &str = "store_id, user_id, access_levels, is_primary, granted_at";

/// [`StoreTx`] implementation over one open sqlx transaction.
pub struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

impl PgStoreTx {
    pub(crate) fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    pub(crate) fn into_inner(self) -> Transaction<'static, Postgres> {
        self.tx
    }
}

fn map_write_err(e: sqlx::Error, context: &str) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.constraint() {
            Some("store_owners_pkey") => {
                return DomainError::new(
                    ErrorCode::OwnershipExists,
                    "User already holds an ownership record for this store",
                );
            }
            Some("store_owners_one_primary") => {
                return DomainError::new(
                    ErrorCode::PrimaryOwnerExists,
                    "Store already has a primary owner",
                );
            }
            Some("sales_order_id_key") => {
                return DomainError::new(
                    ErrorCode::DuplicateKey,
                    "A sale already exists for this order",
                );
            }
            _ => {}
        }
    }
    DomainError::database(format!("{}: {}", context, e))
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn get_user_by_account_id(
        &mut self,
        account_id: &AccountId,
    ) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, account_id, email, status, created_at FROM users WHERE account_id = $1",
        )
        .bind(account_id.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load user: {}", e)))?;

        row.map(User::try_from).transpose()
    }

    async fn promote_to_store_owner(&mut self, user_id: UserId) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET status = $2 WHERE id = $1")
            .bind(user_id.as_uuid())
            .bind(user_status_to_str(UserStatus::StoreOwner))
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database(format!("Failed to update user: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }
        Ok(())
    }

    async fn insert_store(&mut self, fields: NewStore) -> Result<Store, DomainError> {
        let row: StoreRow = sqlx::query_as(
            r#"
            INSERT INTO stores (id, name, description, category, profile_image_url,
                                is_verified, is_frozen, created_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, FALSE, $6)
            RETURNING id, name, description, category, profile_image_url,
                      is_verified, is_frozen, created_at
            "#,
        )
        .bind(StoreId::new().as_uuid())
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.category)
        .bind(&fields.profile_image_url)
        .bind(Timestamp::now().as_datetime())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_write_err(e, "Failed to insert store"))?;

        Ok(row.into())
    }

    async fn get_store(&mut self, store_id: StoreId) -> Result<Option<Store>, DomainError> {
        let row: Option<StoreRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, category, profile_image_url,
                   is_verified, is_frozen, created_at
            FROM stores WHERE id = $1
            "#,
        )
        .bind(store_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load store: {}", e)))?;

        Ok(row.map(Store::from))
    }

    async fn insert_ownership(
        &mut self,
        ownership: StoreOwnership,
    ) -> Result<StoreOwnership, DomainError> {
        let row: OwnershipRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO store_owners (store_id, user_id, access_levels, is_primary, granted_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {OWNERSHIP_COLUMNS}
            "#
        ))
        .bind(ownership.store_id.as_uuid())
        .bind(ownership.user_id.as_uuid())
        .bind(ownership.access_levels.as_i32s())
        .bind(ownership.is_primary)
        .bind(ownership.granted_at.as_datetime())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_write_err(e, "Failed to insert ownership"))?;

        row.try_into()
    }

    async fn store_has_primary_owner(
        &mut self,
        store_id: StoreId,
    ) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM store_owners WHERE store_id = $1 AND is_primary)",
        )
        .bind(store_id.as_uuid())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to check primary owner: {}", e)))?;

        Ok(exists)
    }

    async fn get_ownership(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
    ) -> Result<Option<StoreOwnership>, DomainError> {
        let row: Option<OwnershipRow> = sqlx::query_as(&format!(
            "SELECT {OWNERSHIP_COLUMNS} FROM store_owners WHERE store_id = $1 AND user_id = $2"
        ))
        .bind(store_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load ownership: {}", e)))?;

        row.map(StoreOwnership::try_from).transpose()
    }

    async fn append_access_level(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
        level: AccessLevel,
    ) -> Result<Option<StoreOwnership>, DomainError> {
        // Append-if-absent in one statement; no read-modify-write window.
        let row: Option<OwnershipRow> = sqlx::query_as(&format!(
            r#"
            UPDATE store_owners
            SET access_levels = array_append(access_levels, $3)
            WHERE store_id = $1 AND user_id = $2
              AND NOT (access_levels @> ARRAY[$3])
            RETURNING {OWNERSHIP_COLUMNS}
            "#
        ))
        .bind(store_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(level.as_i32())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to append access level: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            // No row updated: either the record is missing or it already
            // holds the level. Disambiguate with a plain read.
            None => self.get_ownership(store_id, user_id).await,
        }
    }

    async fn remove_access_level(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
        level: AccessLevel,
    ) -> Result<Option<StoreOwnership>, DomainError> {
        let row: Option<OwnershipRow> = sqlx::query_as(&format!(
            r#"
            UPDATE store_owners
            SET access_levels = array_remove(access_levels, $3)
            WHERE store_id = $1 AND user_id = $2
            RETURNING {OWNERSHIP_COLUMNS}
            "#
        ))
        .bind(store_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(level.as_i32())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to remove access level: {}", e)))?;

        row.map(StoreOwnership::try_from).transpose()
    }

    async fn delete_ownership(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
    ) -> Result<bool, DomainError> {
        let result =
            sqlx::query("DELETE FROM store_owners WHERE store_id = $1 AND user_id = $2")
                .bind(store_id.as_uuid())
                .bind(user_id.as_uuid())
                .execute(&mut *self.tx)
                .await
                .map_err(|e| {
                    DomainError::database(format!("Failed to delete ownership: {}", e))
                })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_store_owners(
        &mut self,
        store_id: StoreId,
    ) -> Result<Vec<OwnerRosterEntry>, DomainError> {
        let rows: Vec<RosterRow> = sqlx::query_as(
            r#"
            SELECT u.account_id, so.access_levels, so.is_primary, so.granted_at
            FROM store_owners so
            JOIN users u ON u.id = so.user_id
            WHERE so.store_id = $1
            ORDER BY so.granted_at ASC, u.account_id ASC
            "#,
        )
        .bind(store_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list store owners: {}", e)))?;

        rows.into_iter().map(OwnerRosterEntry::try_from).collect()
    }

    async fn get_order_for_seller(
        &mut self,
        order_id: OrderId,
        seller_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Order>, DomainError> {
        // FOR UPDATE: transition checks made against this read hold until
        // commit; concurrent updates to the same order serialize here.
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE id = $1 AND seller_id = $2 AND store_id = $3
            FOR UPDATE
            "#
        ))
        .bind(order_id.as_uuid())
        .bind(seller_id.as_uuid())
        .bind(store_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load order: {}", e)))?;

        row.map(Order::try_from).transpose()
    }

    async fn update_order(
        &mut self,
        order_id: OrderId,
        seller_id: UserId,
        store_id: StoreId,
        patch: &OrderPatch,
    ) -> Result<Order, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            UPDATE orders SET
                delivery_status = COALESCE($4, delivery_status),
                delivered_on = COALESCE($5, delivered_on),
                expected_delivery_date = COALESCE($6, expected_delivery_date)
            WHERE id = $1 AND seller_id = $2 AND store_id = $3
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id.as_uuid())
        .bind(seller_id.as_uuid())
        .bind(store_id.as_uuid())
        .bind(patch.delivery_status.map(|s| s.as_str()))
        .bind(patch.delivered_on.map(|t| *t.as_datetime()))
        .bind(patch.expected_delivery_date.map(|t| *t.as_datetime()))
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update order: {}", e)))?;

        row.map(Order::try_from)
            .transpose()?
            .ok_or_else(|| DomainError::new(ErrorCode::OrderNotFound, "Order not found"))
    }

    async fn sale_exists_for_order(&mut self, order_id: OrderId) -> Result<bool, DomainError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sales WHERE order_id = $1)")
                .bind(order_id.as_uuid())
                .fetch_one(&mut *self.tx)
                .await
                .map_err(|e| {
                    DomainError::database(format!("Failed to check sale existence: {}", e))
                })?;

        Ok(exists)
    }

    async fn insert_sale(&mut self, sale: NewSale) -> Result<Sale, DomainError> {
        let row: SaleRow = sqlx::query_as(
            r#"
            INSERT INTO sales (id, order_id, store_id, item_id, customer_id, seller_id,
                               amount_minor, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, order_id, store_id, item_id, customer_id, seller_id,
                      amount_minor, created_at
            "#,
        )
        .bind(SaleId::new().as_uuid())
        .bind(sale.order_id.as_uuid())
        .bind(sale.store_id.as_uuid())
        .bind(sale.item_id.as_uuid())
        .bind(sale.customer_id.as_uuid())
        .bind(sale.seller_id.as_uuid())
        .bind(sale.amount_minor)
        .bind(Timestamp::now().as_datetime())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_write_err(e, "Failed to insert sale"))?;

        // The increment side of the aggregate belongs to the data layer.
        sqlx::query(
            r#"
            INSERT INTO sales_overview (store_id, item_id, sale_count, revenue_minor)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (store_id, item_id) DO UPDATE SET
                sale_count = sales_overview.sale_count + 1,
                revenue_minor = sales_overview.revenue_minor + EXCLUDED.revenue_minor
            "#,
        )
        .bind(sale.store_id.as_uuid())
        .bind(sale.item_id.as_uuid())
        .bind(sale.amount_minor)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to bump sales overview: {}", e)))?;

        Ok(row.into())
    }

    async fn decrement_sales_overview(
        &mut self,
        store_id: StoreId,
        item_id: ItemId,
        amount_minor: i64,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE sales_overview SET
                sale_count = sale_count - 1,
                revenue_minor = revenue_minor - $3
            WHERE store_id = $1 AND item_id = $2
            "#,
        )
        .bind(store_id.as_uuid())
        .bind(item_id.as_uuid())
        .bind(amount_minor)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to decrement sales overview: {}", e))
        })?;

        Ok(())
    }

    async fn claim_order_review(
        &mut self,
        order_id: OrderId,
        buyer_id: UserId,
        store_id: StoreId,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET is_reviewed = TRUE
            WHERE id = $1 AND buyer_id = $2 AND store_id = $3 AND is_reviewed = FALSE
            "#,
        )
        .bind(order_id.as_uuid())
        .bind(buyer_id.as_uuid())
        .bind(store_id.as_uuid())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to claim review: {}", e)))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // Nothing claimed: already reviewed, or the triple does not match.
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1 AND buyer_id = $2 AND store_id = $3)",
        )
        .bind(order_id.as_uuid())
        .bind(buyer_id.as_uuid())
        .bind(store_id.as_uuid())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to check order: {}", e)))?;

        if exists {
            Ok(false)
        } else {
            Err(DomainError::new(ErrorCode::OrderNotFound, "Order not found"))
        }
    }

    async fn insert_review(&mut self, review: NewReview) -> Result<Review, DomainError> {
        let row: ReviewRow = sqlx::query_as(
            r#"
            INSERT INTO reviews (id, store_id, item_id, user_id, rating, comment,
                                 is_verified_purchase, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, store_id, item_id, user_id, rating, comment,
                      is_verified_purchase, created_at
            "#,
        )
        .bind(ReviewId::new().as_uuid())
        .bind(review.store_id.as_uuid())
        .bind(review.item_id.as_uuid())
        .bind(review.user_id.as_uuid())
        .bind(review.rating.value() as i32)
        .bind(&review.comment)
        .bind(review.is_verified_purchase)
        .bind(Timestamp::now().as_datetime())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_write_err(e, "Failed to insert review"))?;

        row.try_into()
    }

    async fn insert_invitation_session(
        &mut self,
        session: InvitationSession,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO invitation_sessions (id, token_digest, scope, inviter_id,
                                             client_ip, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(&session.token_digest)
        .bind(&session.scope)
        .bind(session.inviter_id.as_uuid())
        .bind(&session.client_ip)
        .bind(session.expires_at.as_datetime())
        .bind(session.created_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_write_err(e, "Failed to insert invitation session"))?;

        Ok(())
    }
}

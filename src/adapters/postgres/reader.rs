//! Committed-state reads over the connection pool.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{
    AccountId, DomainError, ItemId, OrderId, StoreId, UserId,
};
use crate::domain::order::{Order, SalesOverview};
use crate::domain::store::Store;
use crate::domain::user::User;
use crate::ports::StoreReader;

use super::rows::{OrderRow, OverviewRow, StoreRow, UserRow};

/// [`StoreReader`] implementation over a sqlx connection pool.
///
/// Plain reads of committed state; no locks, no transaction.
#[derive(Clone)]
pub struct PgStoreReader {
    pool: PgPool,
}

impl PgStoreReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreReader for PgStoreReader {
    async fn get_user_by_account_id(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, account_id, email, status, created_at FROM users WHERE account_id = $1",
        )
        .bind(account_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load user: {}", e)))?;

        row.map(User::try_from).transpose()
    }

    async fn get_store(&self, store_id: StoreId) -> Result<Option<Store>, DomainError> {
        let row: Option<StoreRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, category, profile_image_url,
                   is_verified, is_frozen, created_at
            FROM stores WHERE id = $1
            "#,
        )
        .bind(store_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load store: {}", e)))?;

        Ok(row.map(Store::from))
    }

    async fn get_order_for_buyer(
        &self,
        order_id: OrderId,
        buyer_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, delivery_status, delivered_on, expected_delivery_date,
                   item_id, quantity, buyer_id, seller_id, store_id, delivery_fee_minor,
                   total_minor, payment_channel, payment_method, is_reviewed, created_at
            FROM orders
            WHERE id = $1 AND buyer_id = $2 AND store_id = $3
            "#,
        )
        .bind(order_id.as_uuid())
        .bind(buyer_id.as_uuid())
        .bind(store_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load order: {}", e)))?;

        row.map(Order::try_from).transpose()
    }

    async fn has_completed_purchase(
        &self,
        buyer_id: UserId,
        store_id: StoreId,
        item_id: ItemId,
    ) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM sales
                WHERE customer_id = $1 AND store_id = $2 AND item_id = $3
            )
            "#,
        )
        .bind(buyer_id.as_uuid())
        .bind(store_id.as_uuid())
        .bind(item_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to check purchase: {}", e)))?;

        Ok(exists)
    }

    async fn invitation_session_exists(
        &self,
        token_digest: &str,
        scope: &str,
    ) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM invitation_sessions
                WHERE token_digest = $1 AND scope = $2
            )
            "#,
        )
        .bind(token_digest)
        .bind(scope)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to check invitation session: {}", e))
        })?;

        Ok(exists)
    }

    async fn get_sales_overview(
        &self,
        store_id: StoreId,
        item_id: ItemId,
    ) -> Result<Option<SalesOverview>, DomainError> {
        let row: Option<OverviewRow> = sqlx::query_as(
            r#"
            SELECT store_id, item_id, sale_count, revenue_minor
            FROM sales_overview
            WHERE store_id = $1 AND item_id = $2
            "#,
        )
        .bind(store_id.as_uuid())
        .bind(item_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load sales overview: {}", e)))?;

        Ok(row.map(SalesOverview::from))
    }
}

impl std::fmt::Debug for PgStoreReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStoreReader").finish_non_exhaustive()
    }
}

//! Committed-state reads used outside transactions.

use async_trait::async_trait;

use crate::domain::foundation::{AccountId, DomainError, ItemId, OrderId, StoreId, UserId};
use crate::domain::order::{Order, SalesOverview};
use crate::domain::store::Store;
use crate::domain::user::User;

/// Read side of the data store.
///
/// These reads see committed state only and take no locks; anything that
/// must stay consistent with a mutation belongs on [`StoreTx`] instead.
///
/// [`StoreTx`]: super::StoreTx
#[async_trait]
pub trait StoreReader: Send + Sync {
    /// Resolves a user by their public account identifier.
    async fn get_user_by_account_id(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<User>, DomainError>;

    /// Point read of a store.
    async fn get_store(&self, store_id: StoreId) -> Result<Option<Store>, DomainError>;

    /// Loads an order scoped to (order, buyer, store).
    ///
    /// The triple acts as the buyer's authorization check; a mismatch
    /// reads as absence.
    async fn get_order_for_buyer(
        &self,
        order_id: OrderId,
        buyer_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Order>, DomainError>;

    /// True if the buyer has a recorded sale of this item at this store.
    async fn has_completed_purchase(
        &self,
        buyer_id: UserId,
        store_id: StoreId,
        item_id: ItemId,
    ) -> Result<bool, DomainError>;

    /// True if an invitation session with this token digest and scope was
    /// ever issued. Independent of the token's cryptographic validity.
    async fn invitation_session_exists(
        &self,
        token_digest: &str,
        scope: &str,
    ) -> Result<bool, DomainError>;

    /// Point read of the (store, item) sales aggregate.
    async fn get_sales_overview(
        &self,
        store_id: StoreId,
        item_id: ItemId,
    ) -> Result<Option<SalesOverview>, DomainError>;
}

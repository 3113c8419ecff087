//! Transactional data-store handle.
//!
//! One `StoreTx` represents one open transaction. The application layer
//! receives it through [`TransactionCoordinator::run`] and performs all
//! reads and writes of a unit of work against it.
//!
//! [`TransactionCoordinator::run`]: super::TransactionCoordinator::run

use async_trait::async_trait;

use crate::domain::foundation::{
    AccountId, DomainError, ItemId, OrderId, StoreId, UserId,
};
use crate::domain::invitation::InvitationSession;
use crate::domain::order::{NewSale, Order, OrderPatch, Sale};
use crate::domain::review::{NewReview, Review};
use crate::domain::store::{
    AccessLevel, NewStore, OwnerRosterEntry, Store, StoreOwnership,
};
use crate::domain::user::User;

/// Typed point reads and writes available inside one transaction.
///
/// Methods that mutate a single row do so atomically at the data-store
/// level; in particular [`append_access_level`] is an append-if-absent in
/// one statement, never a read-modify-write, and
/// [`get_order_for_seller`] takes a row lock so transition checks made
/// against the returned order hold until commit.
///
/// [`append_access_level`]: StoreTx::append_access_level
/// [`get_order_for_seller`]: StoreTx::get_order_for_seller
#[async_trait]
pub trait StoreTx: Send {
    // ---- users ----

    /// Resolves a user by their public account identifier.
    async fn get_user_by_account_id(
        &mut self,
        account_id: &AccountId,
    ) -> Result<Option<User>, DomainError>;

    /// Flips the user's status to store owner. No-op if already set.
    ///
    /// Fails `UserNotFound` if the user does not exist.
    async fn promote_to_store_owner(&mut self, user_id: UserId) -> Result<(), DomainError>;

    // ---- stores ----

    /// Inserts a store row and returns it.
    async fn insert_store(&mut self, fields: NewStore) -> Result<Store, DomainError>;

    /// Point read of a store.
    async fn get_store(&mut self, store_id: StoreId) -> Result<Option<Store>, DomainError>;

    // ---- ownership ----

    /// Inserts an ownership record.
    ///
    /// Fails `OwnershipExists` if a record for the (store, user) pair
    /// already exists, and `PrimaryOwnerExists` if the record is primary
    /// and the store already has a primary owner.
    async fn insert_ownership(
        &mut self,
        ownership: StoreOwnership,
    ) -> Result<StoreOwnership, DomainError>;

    /// True if the store already has a primary ownership record.
    async fn store_has_primary_owner(&mut self, store_id: StoreId)
        -> Result<bool, DomainError>;

    /// Point read of one ownership record.
    async fn get_ownership(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
    ) -> Result<Option<StoreOwnership>, DomainError>;

    /// Atomically appends a level to an existing record if it is absent.
    ///
    /// Returns the updated record, or `None` if the user has no ownership
    /// record for the store. Appending a level the record already holds
    /// leaves it unchanged.
    async fn append_access_level(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
        level: AccessLevel,
    ) -> Result<Option<StoreOwnership>, DomainError>;

    /// Removes a level from an existing record.
    ///
    /// Returns the updated record (possibly with an empty level set), or
    /// `None` if the user has no ownership record for the store.
    async fn remove_access_level(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
        level: AccessLevel,
    ) -> Result<Option<StoreOwnership>, DomainError>;

    /// Deletes an ownership record. Returns false if none existed.
    async fn delete_ownership(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
    ) -> Result<bool, DomainError>;

    /// The store's ownership roster joined with account details.
    async fn list_store_owners(
        &mut self,
        store_id: StoreId,
    ) -> Result<Vec<OwnerRosterEntry>, DomainError>;

    // ---- orders and sales ----

    /// Loads an order scoped to (order, seller, store), taking a row lock.
    ///
    /// The triple acts as the seller's authorization check; a mismatch
    /// reads as absence.
    async fn get_order_for_seller(
        &mut self,
        order_id: OrderId,
        seller_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Order>, DomainError>;

    /// Applies a partial update to the order and returns the updated row.
    ///
    /// Unset patch fields are left unchanged. Fails `OrderNotFound` if the
    /// (order, seller, store) triple does not match.
    async fn update_order(
        &mut self,
        order_id: OrderId,
        seller_id: UserId,
        store_id: StoreId,
        patch: &OrderPatch,
    ) -> Result<Order, DomainError>;

    /// True if a sale row already exists for the order.
    async fn sale_exists_for_order(&mut self, order_id: OrderId) -> Result<bool, DomainError>;

    /// Inserts a sale fact row.
    ///
    /// The data layer also increments the matching sales overview
    /// aggregate (count and revenue) as part of this write.
    async fn insert_sale(&mut self, sale: NewSale) -> Result<Sale, DomainError>;

    /// Decrements the (store, item) sales overview by one sale of the
    /// given amount. Used when an order is RETURNED.
    async fn decrement_sales_overview(
        &mut self,
        store_id: StoreId,
        item_id: ItemId,
        amount_minor: i64,
    ) -> Result<(), DomainError>;

    // ---- reviews ----

    /// Claims the order's reviewed flag if it is still unset.
    ///
    /// Returns true if this transaction set the flag, false if it was
    /// already set (another submission won). Fails `OrderNotFound` if the
    /// (order, buyer, store) triple does not match.
    async fn claim_order_review(
        &mut self,
        order_id: OrderId,
        buyer_id: UserId,
        store_id: StoreId,
    ) -> Result<bool, DomainError>;

    /// Inserts a review row.
    async fn insert_review(&mut self, review: NewReview) -> Result<Review, DomainError>;

    // ---- invitations ----

    /// Persists the session record for an issued invitation token.
    async fn insert_invitation_session(
        &mut self,
        session: InvitationSession,
    ) -> Result<(), DomainError>;
}

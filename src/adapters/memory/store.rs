//! In-memory data store with genuine transaction semantics.
//!
//! `MemoryCoordinator` serializes units of work behind one async mutex and
//! runs each against a cloned snapshot of the state; the snapshot replaces
//! the shared state only on success. Writes made by a failed unit are
//! never observable, matching the commit/rollback contract the PostgreSQL
//! adapter gets from real transactions.
//!
//! Used by the test suite and for local development without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{
    AccountId, DomainError, ErrorCode, ItemId, OrderId, ReviewId, SaleId, StoreId, Timestamp,
    UserId,
};
use crate::domain::invitation::InvitationSession;
use crate::domain::order::{NewSale, Order, OrderPatch, Sale, SalesOverview};
use crate::domain::review::{NewReview, Review};
use crate::domain::store::{
    AccessLevel, NewStore, OwnerRosterEntry, Store, StoreOwnership,
};
use crate::domain::user::{User, UserStatus};
use crate::ports::{StoreReader, StoreTx, TransactionCoordinator, UnitOfWork};

/// Complete state of the in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub users: HashMap<UserId, User>,
    pub stores: HashMap<StoreId, Store>,
    pub ownerships: HashMap<(StoreId, UserId), StoreOwnership>,
    pub orders: HashMap<OrderId, Order>,
    pub sales: HashMap<OrderId, Sale>,
    pub overviews: HashMap<(StoreId, ItemId), SalesOverview>,
    pub reviews: Vec<Review>,
    pub invitation_sessions: Vec<InvitationSession>,
}

/// Shared handle to the in-memory store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinator view of this store.
    pub fn coordinator(&self) -> MemoryCoordinator {
        MemoryCoordinator {
            store: self.clone(),
        }
    }

    /// Reader view of this store.
    pub fn reader(&self) -> MemoryStoreReader {
        MemoryStoreReader {
            store: self.clone(),
        }
    }

    /// Inserts a user directly, bypassing any transaction. Test seeding.
    pub async fn seed_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    /// Inserts an order directly, bypassing any transaction. Test seeding.
    pub async fn seed_order(&self, order: Order) {
        self.state.lock().await.orders.insert(order.id, order);
    }

    /// Clones the current committed state.
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }
}

/// In-memory [`TransactionCoordinator`].
#[derive(Clone)]
pub struct MemoryCoordinator {
    store: MemoryStore,
}

#[async_trait]
impl TransactionCoordinator for MemoryCoordinator {
    async fn run<T>(&self, work: UnitOfWork<T>) -> Result<T, DomainError>
    where
        T: Send + 'static,
    {
        // The lock is held for the whole unit: transactions serialize, the
        // strictest possible isolation.
        let mut committed = self.store.state.lock().await;
        let mut tx = MemoryStoreTx {
            working: committed.clone(),
        };
        match work(&mut tx).await {
            Ok(value) => {
                *committed = tx.working;
                Ok(value)
            }
            Err(err) => {
                // The working copy is dropped; nothing leaks.
                tracing::debug!(error = %err, "memory transaction rolled back");
                Err(err)
            }
        }
    }
}

/// One open in-memory transaction: a working copy of the state.
pub struct MemoryStoreTx {
    working: MemoryState,
}

fn roster_for(state: &MemoryState, store_id: StoreId) -> Vec<OwnerRosterEntry> {
    let mut entries: Vec<OwnerRosterEntry> = state
        .ownerships
        .values()
        .filter(|o| o.store_id == store_id)
        .filter_map(|o| {
            state.users.get(&o.user_id).map(|user| OwnerRosterEntry {
                account_id: user.account_id.clone(),
                access_levels: o.access_levels.clone(),
                is_primary: o.is_primary,
                granted_at: o.granted_at,
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        a.granted_at
            .cmp(&b.granted_at)
            .then_with(|| a.account_id.as_str().cmp(b.account_id.as_str()))
    });
    entries
}

#[async_trait]
impl StoreTx for MemoryStoreTx {
    async fn get_user_by_account_id(
        &mut self,
        account_id: &AccountId,
    ) -> Result<Option<User>, DomainError> {
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.account_id == *account_id)
            .cloned())
    }

    async fn promote_to_store_owner(&mut self, user_id: UserId) -> Result<(), DomainError> {
        let user = self.working.users.get_mut(&user_id).ok_or_else(|| {
            DomainError::new(ErrorCode::UserNotFound, "User not found")
                .with_detail("user_id", user_id.to_string())
        })?;
        user.status = UserStatus::StoreOwner;
        Ok(())
    }

    async fn insert_store(&mut self, fields: NewStore) -> Result<Store, DomainError> {
        let store = Store {
            id: StoreId::new(),
            name: fields.name,
            description: fields.description,
            category: fields.category,
            profile_image_url: fields.profile_image_url,
            is_verified: false,
            is_frozen: false,
            created_at: Timestamp::now(),
        };
        self.working.stores.insert(store.id, store.clone());
        Ok(store)
    }

    async fn get_store(&mut self, store_id: StoreId) -> Result<Option<Store>, DomainError> {
        Ok(self.working.stores.get(&store_id).cloned())
    }

    async fn insert_ownership(
        &mut self,
        ownership: StoreOwnership,
    ) -> Result<StoreOwnership, DomainError> {
        let key = (ownership.store_id, ownership.user_id);
        if self.working.ownerships.contains_key(&key) {
            return Err(DomainError::new(
                ErrorCode::OwnershipExists,
                "User already holds an ownership record for this store",
            ));
        }
        if ownership.is_primary
            && self
                .working
                .ownerships
                .values()
                .any(|o| o.store_id == ownership.store_id && o.is_primary)
        {
            return Err(DomainError::new(
                ErrorCode::PrimaryOwnerExists,
                "Store already has a primary owner",
            ));
        }
        self.working.ownerships.insert(key, ownership.clone());
        Ok(ownership)
    }

    async fn store_has_primary_owner(
        &mut self,
        store_id: StoreId,
    ) -> Result<bool, DomainError> {
        Ok(self
            .working
            .ownerships
            .values()
            .any(|o| o.store_id == store_id && o.is_primary))
    }

    async fn get_ownership(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
    ) -> Result<Option<StoreOwnership>, DomainError> {
        Ok(self.working.ownerships.get(&(store_id, user_id)).cloned())
    }

    async fn append_access_level(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
        level: AccessLevel,
    ) -> Result<Option<StoreOwnership>, DomainError> {
        match self.working.ownerships.get_mut(&(store_id, user_id)) {
            Some(record) => {
                record.access_levels.insert(level);
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn remove_access_level(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
        level: AccessLevel,
    ) -> Result<Option<StoreOwnership>, DomainError> {
        match self.working.ownerships.get_mut(&(store_id, user_id)) {
            Some(record) => {
                record.access_levels.remove(level);
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_ownership(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
    ) -> Result<bool, DomainError> {
        Ok(self
            .working
            .ownerships
            .remove(&(store_id, user_id))
            .is_some())
    }

    async fn list_store_owners(
        &mut self,
        store_id: StoreId,
    ) -> Result<Vec<OwnerRosterEntry>, DomainError> {
        Ok(roster_for(&self.working, store_id))
    }

    async fn get_order_for_seller(
        &mut self,
        order_id: OrderId,
        seller_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Order>, DomainError> {
        Ok(self
            .working
            .orders
            .get(&order_id)
            .filter(|o| o.seller_id == seller_id && o.store_id == store_id)
            .cloned())
    }

    async fn update_order(
        &mut self,
        order_id: OrderId,
        seller_id: UserId,
        store_id: StoreId,
        patch: &OrderPatch,
    ) -> Result<Order, DomainError> {
        let order = self
            .working
            .orders
            .get_mut(&order_id)
            .filter(|o| o.seller_id == seller_id && o.store_id == store_id)
            .ok_or_else(|| DomainError::new(ErrorCode::OrderNotFound, "Order not found"))?;
        patch.apply_to(order);
        Ok(order.clone())
    }

    async fn sale_exists_for_order(&mut self, order_id: OrderId) -> Result<bool, DomainError> {
        Ok(self.working.sales.contains_key(&order_id))
    }

    async fn insert_sale(&mut self, sale: NewSale) -> Result<Sale, DomainError> {
        if self.working.sales.contains_key(&sale.order_id) {
            return Err(DomainError::new(
                ErrorCode::DuplicateKey,
                "A sale already exists for this order",
            ));
        }
        let row = Sale {
            id: SaleId::new(),
            order_id: sale.order_id,
            store_id: sale.store_id,
            item_id: sale.item_id,
            customer_id: sale.customer_id,
            seller_id: sale.seller_id,
            amount_minor: sale.amount_minor,
            created_at: Timestamp::now(),
        };
        self.working.sales.insert(row.order_id, row.clone());

        // The data layer owns the increment side of the aggregate.
        let overview = self
            .working
            .overviews
            .entry((row.store_id, row.item_id))
            .or_insert(SalesOverview {
                store_id: row.store_id,
                item_id: row.item_id,
                sale_count: 0,
                revenue_minor: 0,
            });
        overview.sale_count += 1;
        overview.revenue_minor += row.amount_minor;

        Ok(row)
    }

    async fn decrement_sales_overview(
        &mut self,
        store_id: StoreId,
        item_id: ItemId,
        amount_minor: i64,
    ) -> Result<(), DomainError> {
        if let Some(overview) = self.working.overviews.get_mut(&(store_id, item_id)) {
            overview.sale_count -= 1;
            overview.revenue_minor -= amount_minor;
        }
        Ok(())
    }

    async fn claim_order_review(
        &mut self,
        order_id: OrderId,
        buyer_id: UserId,
        store_id: StoreId,
    ) -> Result<bool, DomainError> {
        let order = self
            .working
            .orders
            .get_mut(&order_id)
            .filter(|o| o.buyer_id == buyer_id && o.store_id == store_id)
            .ok_or_else(|| DomainError::new(ErrorCode::OrderNotFound, "Order not found"))?;
        if order.is_reviewed {
            return Ok(false);
        }
        order.is_reviewed = true;
        Ok(true)
    }

    async fn insert_review(&mut self, review: NewReview) -> Result<Review, DomainError> {
        let row = Review {
            id: ReviewId::new(),
            store_id: review.store_id,
            item_id: review.item_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            is_verified_purchase: review.is_verified_purchase,
            created_at: Timestamp::now(),
        };
        self.working.reviews.push(row.clone());
        Ok(row)
    }

    async fn insert_invitation_session(
        &mut self,
        session: InvitationSession,
    ) -> Result<(), DomainError> {
        self.working.invitation_sessions.push(session);
        Ok(())
    }
}

/// Read-side view of the in-memory store.
#[derive(Clone)]
pub struct MemoryStoreReader {
    store: MemoryStore,
}

#[async_trait]
impl StoreReader for MemoryStoreReader {
    async fn get_user_by_account_id(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<User>, DomainError> {
        let state = self.store.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.account_id == *account_id)
            .cloned())
    }

    async fn get_store(&self, store_id: StoreId) -> Result<Option<Store>, DomainError> {
        let state = self.store.state.lock().await;
        Ok(state.stores.get(&store_id).cloned())
    }

    async fn get_order_for_buyer(
        &self,
        order_id: OrderId,
        buyer_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Order>, DomainError> {
        let state = self.store.state.lock().await;
        Ok(state
            .orders
            .get(&order_id)
            .filter(|o| o.buyer_id == buyer_id && o.store_id == store_id)
            .cloned())
    }

    async fn has_completed_purchase(
        &self,
        buyer_id: UserId,
        store_id: StoreId,
        item_id: ItemId,
    ) -> Result<bool, DomainError> {
        let state = self.store.state.lock().await;
        Ok(state.sales.values().any(|s| {
            s.customer_id == buyer_id && s.store_id == store_id && s.item_id == item_id
        }))
    }

    async fn invitation_session_exists(
        &self,
        token_digest: &str,
        scope: &str,
    ) -> Result<bool, DomainError> {
        let state = self.store.state.lock().await;
        Ok(state
            .invitation_sessions
            .iter()
            .any(|s| s.token_digest == token_digest && s.scope == scope))
    }

    async fn get_sales_overview(
        &self,
        store_id: StoreId,
        item_id: ItemId,
    ) -> Result<Option<SalesOverview>, DomainError> {
        let state = self.store.state.lock().await;
        Ok(state.overviews.get(&(store_id, item_id)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_store_fields() -> NewStore {
        NewStore {
            name: "Igloo Supplies".to_string(),
            description: "Cold-weather gear".to_string(),
            category: "outdoors".to_string(),
            profile_image_url: None,
        }
    }

    #[tokio::test]
    async fn committed_writes_are_visible() {
        let store = MemoryStore::new();
        let coordinator = store.coordinator();

        let created = coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(async move { tx.insert_store(new_store_fields()).await })
            }))
            .await
            .unwrap();

        let snapshot = store.snapshot().await;
        assert!(snapshot.stores.contains_key(&created.id));
    }

    #[tokio::test]
    async fn failed_unit_leaves_no_trace() {
        let store = MemoryStore::new();
        let coordinator = store.coordinator();

        let result: Result<Store, DomainError> = coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(async move {
                    tx.insert_store(new_store_fields()).await?;
                    Err(DomainError::new(ErrorCode::InternalError, "boom"))
                })
            }))
            .await;

        assert!(result.is_err());
        assert!(store.snapshot().await.stores.is_empty());
    }

    #[tokio::test]
    async fn duplicate_ownership_insert_conflicts() {
        let store = MemoryStore::new();
        let coordinator = store.coordinator();
        let store_id = StoreId::new();
        let user_id = UserId::new();

        let result = coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(async move {
                    tx.insert_ownership(StoreOwnership::primary(
                        store_id,
                        user_id,
                        Timestamp::now(),
                    ))
                    .await?;
                    tx.insert_ownership(StoreOwnership::co_owner(
                        store_id,
                        user_id,
                        AccessLevel::SalesAccess,
                        Timestamp::now(),
                    ))
                    .await
                })
            }))
            .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::OwnershipExists);
    }

    #[tokio::test]
    async fn second_primary_owner_is_rejected() {
        let store = MemoryStore::new();
        let coordinator = store.coordinator();
        let store_id = StoreId::new();

        let result = coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(async move {
                    tx.insert_ownership(StoreOwnership::primary(
                        store_id,
                        UserId::new(),
                        Timestamp::now(),
                    ))
                    .await?;
                    tx.insert_ownership(StoreOwnership::primary(
                        store_id,
                        UserId::new(),
                        Timestamp::now(),
                    ))
                    .await
                })
            }))
            .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::PrimaryOwnerExists);
    }

    #[tokio::test]
    async fn sale_insert_bumps_overview_and_rejects_duplicates() {
        let store = MemoryStore::new();
        let coordinator = store.coordinator();
        let order_id = OrderId::new();
        let store_id = StoreId::new();
        let item_id = ItemId::new();

        let sale = NewSale {
            order_id,
            store_id,
            item_id,
            customer_id: UserId::new(),
            seller_id: UserId::new(),
            amount_minor: 2500,
        };

        let dup = sale.clone();
        let result = coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(async move {
                    tx.insert_sale(sale).await?;
                    tx.insert_sale(dup).await
                })
            }))
            .await;
        assert_eq!(result.unwrap_err().code, ErrorCode::DuplicateKey);

        // The failed unit rolled everything back.
        assert!(store.snapshot().await.sales.is_empty());
        assert!(store.snapshot().await.overviews.is_empty());
    }
}

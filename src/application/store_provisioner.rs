//! Store creation: one transaction covering the store row, the caller's
//! post-create hook, and the primary ownership grant.

use futures::future::BoxFuture;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::store::{NewStore, OwnerRosterEntry, Store};
use crate::ports::{StoreTx, TransactionCoordinator};

use super::access_control::grant_primary_ownership;

/// Side-effect hook invoked inside the provisioning transaction, after
/// the store row exists but before ownership is granted.
///
/// External follow-ups (sub-account registration, email dispatch) hang
/// off this hook; a hook failure aborts the whole creation, so a store
/// never exists without its side effects having been accepted. This is
/// the one sanctioned place where work beyond the data store runs inside
/// a transaction boundary.
pub type PostCreateHook =
    Box<dyn for<'s> FnOnce(&'s Store) -> BoxFuture<'s, Result<(), DomainError>> + Send>;

/// Command to create a store for an owner.
#[derive(Debug, Clone)]
pub struct CreateStoreCommand {
    pub owner_id: UserId,
    pub fields: NewStore,
}

/// Consistent snapshot returned by store creation: the store together
/// with its ownership roster, re-read inside the same transaction.
#[derive(Debug, Clone)]
pub struct CreatedStore {
    pub store: Store,
    pub owners: Vec<OwnerRosterEntry>,
}

/// Creates a store and its first (primary) owner atomically.
pub struct StoreProvisioner<C> {
    coordinator: Arc<C>,
}

impl<C: TransactionCoordinator> StoreProvisioner<C> {
    pub fn new(coordinator: Arc<C>) -> Self {
        Self { coordinator }
    }

    /// Creates the store, runs the hook, grants primary ownership, and
    /// promotes the owner's status flag, all in one transaction.
    ///
    /// Failure of any step leaves no partial store or ownership rows.
    pub async fn create_store(
        &self,
        cmd: CreateStoreCommand,
        post_create: PostCreateHook,
    ) -> Result<CreatedStore, DomainError> {
        cmd.fields.validate()?;
        let CreateStoreCommand { owner_id, fields } = cmd;

        let created = self
            .coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(async move {
                    let store = tx.insert_store(fields).await?;

                    post_create(&store).await?;

                    grant_primary_ownership(tx, store.id, owner_id).await?;
                    tx.promote_to_store_owner(owner_id).await?;

                    // Re-read for one consistent snapshot of store + roster.
                    let store = tx.get_store(store.id).await?.ok_or_else(|| {
                        DomainError::new(
                            ErrorCode::InternalError,
                            "Store vanished inside its own creation transaction",
                        )
                    })?;
                    let owners = tx.list_store_owners(store.id).await?;

                    Ok(CreatedStore { store, owners })
                })
            }))
            .await?;

        tracing::info!(
            store_id = %created.store.id,
            owner_id = %owner_id,
            "store created"
        );

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryStore, MemoryTaskDispatcher};
    use crate::domain::foundation::{AccountId, Timestamp};
    use crate::domain::store::AccessLevel;
    use crate::domain::user::{User, UserStatus};
    use crate::ports::{ProvisionAccountTask, TaskDispatcher};

    fn owner() -> User {
        User {
            id: UserId::new(),
            account_id: AccountId::new("frosty.near").unwrap(),
            email: "frosty@example.com".to_string(),
            status: UserStatus::NormalUser,
            created_at: Timestamp::now(),
        }
    }

    fn fields() -> NewStore {
        NewStore {
            name: "Igloo Supplies".to_string(),
            description: "Cold-weather gear".to_string(),
            category: "outdoors".to_string(),
            profile_image_url: None,
        }
    }

    fn noop_hook() -> PostCreateHook {
        Box::new(|_store| Box::pin(async { Ok(()) }))
    }

    #[tokio::test]
    async fn creates_store_with_primary_owner_and_promotes_user() {
        let store = MemoryStore::new();
        let user = owner();
        store.seed_user(user.clone()).await;
        let provisioner = StoreProvisioner::new(Arc::new(store.coordinator()));

        let created = provisioner
            .create_store(
                CreateStoreCommand {
                    owner_id: user.id,
                    fields: fields(),
                },
                noop_hook(),
            )
            .await
            .unwrap();

        assert_eq!(created.owners.len(), 1);
        let entry = &created.owners[0];
        assert!(entry.is_primary);
        assert_eq!(entry.account_id, user.account_id);
        assert!(entry.access_levels.contains(AccessLevel::FullAccess));

        let snapshot = store.snapshot().await;
        assert_eq!(
            snapshot.users.get(&user.id).unwrap().status,
            UserStatus::StoreOwner
        );
    }

    #[tokio::test]
    async fn hook_failure_rolls_back_the_store_insert() {
        let store = MemoryStore::new();
        let user = owner();
        store.seed_user(user.clone()).await;
        let provisioner = StoreProvisioner::new(Arc::new(store.coordinator()));

        let failing: PostCreateHook = Box::new(|_store| {
            Box::pin(async {
                Err(DomainError::new(
                    ErrorCode::DispatchError,
                    "external account registration refused",
                ))
            })
        });

        let err = provisioner
            .create_store(
                CreateStoreCommand {
                    owner_id: user.id,
                    fields: fields(),
                },
                failing,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DispatchError);

        let snapshot = store.snapshot().await;
        assert!(snapshot.stores.is_empty());
        assert!(snapshot.ownerships.is_empty());
        assert_eq!(
            snapshot.users.get(&user.id).unwrap().status,
            UserStatus::NormalUser
        );
    }

    #[tokio::test]
    async fn hook_can_enqueue_provisioning_work() {
        let store = MemoryStore::new();
        let user = owner();
        store.seed_user(user.clone()).await;
        let provisioner = StoreProvisioner::new(Arc::new(store.coordinator()));
        let dispatcher = Arc::new(MemoryTaskDispatcher::new());

        let hook_dispatcher = dispatcher.clone();
        let account = user.account_id.clone();
        let hook: PostCreateHook = Box::new(move |created| {
            Box::pin(async move {
                hook_dispatcher
                    .dispatch_account_provisioning(ProvisionAccountTask {
                        store_id: created.id,
                        store_name: created.name.clone(),
                        owner_account_id: account,
                    })
                    .await
            })
        });

        let created = provisioner
            .create_store(
                CreateStoreCommand {
                    owner_id: user.id,
                    fields: fields(),
                },
                hook,
            )
            .await
            .unwrap();

        let tasks = dispatcher.provisioning_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].store_id, created.store.id);
    }

    #[tokio::test]
    async fn unknown_owner_aborts_everything() {
        let store = MemoryStore::new();
        let provisioner = StoreProvisioner::new(Arc::new(store.coordinator()));

        let err = provisioner
            .create_store(
                CreateStoreCommand {
                    owner_id: UserId::new(),
                    fields: fields(),
                },
                noop_hook(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);

        assert!(store.snapshot().await.stores.is_empty());
    }

    #[tokio::test]
    async fn invalid_fields_are_rejected_before_any_write() {
        let store = MemoryStore::new();
        let user = owner();
        store.seed_user(user.clone()).await;
        let provisioner = StoreProvisioner::new(Arc::new(store.coordinator()));

        let mut bad = fields();
        bad.name = String::new();

        let err = provisioner
            .create_store(
                CreateStoreCommand {
                    owner_id: user.id,
                    fields: bad,
                },
                noop_hook(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(store.snapshot().await.stores.is_empty());
    }
}

//! Access control: ownership grants, the invitation protocol, and
//! revocation.
//!
//! Whether the *caller* is allowed to grant or revoke (does it hold full
//! access to the store) is the request-handling layer's check; this
//! component trusts its caller and enforces the data invariants.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{
    AccountId, DomainError, ErrorCode, InvitationId, StoreId, Timestamp, UserId,
};
use crate::domain::invitation::{
    digest_token, InvitationClaims, InvitationSession, ACCESS_INVITATION_SCOPE,
};
use crate::domain::store::{AccessLevel, OwnerRosterEntry, Store, StoreOwnership};
use crate::domain::user::User;
use crate::ports::{
    InvitationTokens, NonceCache, StoreReader, StoreTx, TransactionCoordinator,
};

/// Command to issue a co-ownership invitation.
#[derive(Debug, Clone)]
pub struct IssueInvitationCommand {
    pub store_id: StoreId,
    pub inviter_id: UserId,
    pub invitee_account_id: AccountId,
    pub access_level: AccessLevel,
    pub client_ip: Option<String>,
}

/// A successfully issued invitation, ready for the email dispatcher.
#[derive(Debug, Clone)]
pub struct IssuedInvitation {
    pub token: String,
    pub expires_at: Timestamp,
    pub invitee: User,
    pub store: Store,
    pub access_level: AccessLevel,
}

/// Command to append a level to a user's store access directly.
#[derive(Debug, Clone)]
pub struct AddLevelCommand {
    pub store_id: StoreId,
    pub account_id: AccountId,
    pub access_level: AccessLevel,
}

/// Command to revoke one level, or all access, from a user.
#[derive(Debug, Clone)]
pub struct RevokeCommand {
    pub store_id: StoreId,
    pub account_id: AccountId,
}

/// Grants the store's first ownership record: full access, primary.
///
/// Runs on the caller's transactional handle; only the store-provisioning
/// transaction calls this, so the grant commits or rolls back with the
/// store insert itself.
pub async fn grant_primary_ownership(
    tx: &mut dyn StoreTx,
    store_id: StoreId,
    owner_id: UserId,
) -> Result<StoreOwnership, DomainError> {
    if tx.store_has_primary_owner(store_id).await? {
        return Err(DomainError::new(
            ErrorCode::PrimaryOwnerExists,
            "Store already has a primary owner",
        ));
    }
    tx.insert_ownership(StoreOwnership::primary(store_id, owner_id, Timestamp::now()))
        .await
}

/// Owns the store-ownership data and the invitation redemption protocol.
pub struct AccessControlManager<C> {
    coordinator: Arc<C>,
    reader: Arc<dyn StoreReader>,
    tokens: Arc<dyn InvitationTokens>,
    cache: Arc<dyn NonceCache>,
    invitation_ttl: Duration,
}

impl<C: TransactionCoordinator> AccessControlManager<C> {
    pub fn new(
        coordinator: Arc<C>,
        reader: Arc<dyn StoreReader>,
        tokens: Arc<dyn InvitationTokens>,
        cache: Arc<dyn NonceCache>,
        invitation_ttl: Duration,
    ) -> Self {
        Self {
            coordinator,
            reader,
            tokens,
            cache,
            invitation_ttl,
        }
    }

    /// Issues a signed invitation for one access level and persists its
    /// session record.
    ///
    /// Email dispatch is the caller's move once this returns; the token
    /// itself is the only credential the invitee needs.
    pub async fn issue_invitation(
        &self,
        cmd: IssueInvitationCommand,
    ) -> Result<IssuedInvitation, DomainError> {
        let invitee = self
            .reader
            .get_user_by_account_id(&cmd.invitee_account_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::UserNotFound, "Cannot invite a non-existent user")
                    .with_detail("account_id", cmd.invitee_account_id.to_string())
            })?;

        let store = self
            .reader
            .get_store(cmd.store_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::StoreNotFound, "Store not found"))?;

        let issued = self.tokens.issue(
            cmd.inviter_id,
            InvitationClaims {
                store_id: cmd.store_id,
                invitee_id: invitee.id,
                access_level: cmd.access_level,
            },
            self.invitation_ttl,
        )?;

        let session = InvitationSession::for_issued_token(
            issued.token_id,
            &issued.token,
            cmd.inviter_id,
            cmd.client_ip,
            issued.expires_at,
            issued.issued_at,
        );

        self.coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(async move { tx.insert_invitation_session(session).await })
            }))
            .await?;

        tracing::info!(
            store_id = %cmd.store_id,
            invitee = %invitee.account_id,
            level = %cmd.access_level,
            "issued access invitation"
        );

        Ok(IssuedInvitation {
            token: issued.token,
            expires_at: issued.expires_at,
            invitee,
            store,
            access_level: cmd.access_level,
        })
    }

    /// Redeems an invitation token, granting its access level once.
    ///
    /// Failure order: a token with no session record is `InvalidToken`; a
    /// bad signature is `InvalidToken`; an expired one `ExpiredToken`; a
    /// replayed one `TokenAlreadyUsed`. The single-use claim happens
    /// before the ownership write, so two concurrent redemptions of the
    /// same token cannot both succeed; if the write then fails the claim
    /// is released so a retry can still go through.
    pub async fn redeem_invitation(&self, token: &str) -> Result<StoreOwnership, DomainError> {
        let digest = digest_token(token);
        let session_exists = self
            .reader
            .invitation_session_exists(&digest, ACCESS_INVITATION_SCOPE)
            .await?;
        if !session_exists {
            return Err(DomainError::new(
                ErrorCode::InvalidToken,
                "Invitation token was never issued",
            ));
        }

        let verified = self.tokens.verify(token)?;

        let remaining = verified.expires_at.secs_from_now().max(1);
        let claimed = self
            .cache
            .mark_used(
                &nonce_key(&verified.token_id),
                Duration::from_secs(remaining),
            )
            .await?;
        if !claimed {
            return Err(DomainError::new(
                ErrorCode::TokenAlreadyUsed,
                "Invitation token has already been redeemed",
            ));
        }

        let InvitationClaims {
            store_id,
            invitee_id,
            access_level,
        } = verified.claims;

        let granted = self
            .coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(
                    async move { upsert_access(tx, store_id, invitee_id, access_level).await },
                )
            }))
            .await;

        match granted {
            Ok(record) => {
                tracing::info!(
                    store_id = %store_id,
                    invitee_id = %invitee_id,
                    level = %access_level,
                    "invitation redeemed"
                );
                Ok(record)
            }
            Err(err) => {
                // Reopen the nonce so the invitee can retry after a
                // transient failure.
                if let Err(release_err) =
                    self.cache.release(&nonce_key(&verified.token_id)).await
                {
                    tracing::warn!(
                        error = %release_err,
                        "failed to release invitation nonce after aborted grant"
                    );
                }
                Err(err)
            }
        }
    }

    /// Appends a level to a user's store access, creating the ownership
    /// record if the user has none yet.
    pub async fn add_level(&self, cmd: AddLevelCommand) -> Result<StoreOwnership, DomainError> {
        let AddLevelCommand {
            store_id,
            account_id,
            access_level,
        } = cmd;

        self.coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(async move {
                    let user = resolve_user(tx, &account_id).await?;
                    upsert_access(tx, store_id, user.id, access_level).await
                })
            }))
            .await
    }

    /// Removes one level from a user's store access.
    ///
    /// The record survives, possibly with an empty level set. Returns the
    /// store's updated ownership roster.
    pub async fn revoke_level(
        &self,
        cmd: RevokeCommand,
        level: AccessLevel,
    ) -> Result<Vec<OwnerRosterEntry>, DomainError> {
        let RevokeCommand {
            store_id,
            account_id,
        } = cmd;

        self.coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(async move {
                    let user = resolve_user(tx, &account_id).await?;
                    tx.remove_access_level(store_id, user.id, level)
                        .await?
                        .ok_or_else(no_access)?;
                    tx.list_store_owners(store_id).await
                })
            }))
            .await
    }

    /// Deletes a user's ownership record entirely. Returns the store's
    /// updated ownership roster.
    pub async fn revoke_all(
        &self,
        cmd: RevokeCommand,
    ) -> Result<Vec<OwnerRosterEntry>, DomainError> {
        let RevokeCommand {
            store_id,
            account_id,
        } = cmd;

        self.coordinator
            .run(Box::new(move |tx: &mut dyn StoreTx| {
                Box::pin(async move {
                    let user = resolve_user(tx, &account_id).await?;
                    if !tx.delete_ownership(store_id, user.id).await? {
                        return Err(no_access());
                    }
                    tx.list_store_owners(store_id).await
                })
            }))
            .await
    }
}

fn nonce_key(token_id: &InvitationId) -> String {
    format!("invitation:used:{}", token_id)
}

fn no_access() -> DomainError {
    DomainError::new(
        ErrorCode::NoAccessExists,
        "User has no access to this store",
    )
}

async fn resolve_user(
    tx: &mut dyn StoreTx,
    account_id: &AccountId,
) -> Result<User, DomainError> {
    tx.get_user_by_account_id(account_id)
        .await?
        .ok_or_else(|| {
            DomainError::new(ErrorCode::UserNotFound, "User not found")
                .with_detail("account_id", account_id.to_string())
        })
}

/// One uniform grant policy: create the record with the single level, or
/// append the level to the existing record if it is absent.
async fn upsert_access(
    tx: &mut dyn StoreTx,
    store_id: StoreId,
    user_id: UserId,
    level: AccessLevel,
) -> Result<StoreOwnership, DomainError> {
    if let Some(updated) = tx.append_access_level(store_id, user_id, level).await? {
        return Ok(updated);
    }
    tx.insert_ownership(StoreOwnership::co_owner(
        store_id,
        user_id,
        level,
        Timestamp::now(),
    ))
    .await
}

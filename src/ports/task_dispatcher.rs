//! Fire-and-forget background task dispatch.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, DomainError, StoreId, Timestamp};
use crate::domain::store::AccessLevel;

/// Payload for the "send access invitation email" task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvitationEmailTask {
    pub inviter_account_id: AccountId,
    pub invitee_account_id: AccountId,
    pub invitee_email: String,
    pub store_id: StoreId,
    pub store_name: String,
    pub access_level: AccessLevel,
    pub token: String,
    pub expires_at: Timestamp,
}

/// Payload for the "provision external sub-account" task raised when a
/// store is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionAccountTask {
    pub store_id: StoreId,
    pub store_name: String,
    pub owner_account_id: AccountId,
}

/// Enqueues background work for the worker fleet.
///
/// Dispatch is fire-and-forget: a successful return means the task was
/// queued, not processed. Never called inside a transaction boundary; the
/// request-handling layer enqueues after a core operation succeeds (the
/// store-provisioning post-create hook being the one sanctioned
/// exception).
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    async fn dispatch_invitation_email(
        &self,
        task: InvitationEmailTask,
    ) -> Result<(), DomainError>;

    async fn dispatch_account_provisioning(
        &self,
        task: ProvisionAccountTask,
    ) -> Result<(), DomainError>;
}

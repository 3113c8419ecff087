//! Redis-backed task dispatcher.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{InvitationEmailTask, ProvisionAccountTask, TaskDispatcher};

/// Queue key for invitation email tasks.
pub const INVITATION_EMAIL_QUEUE: &str = "tasks:send_access_invitation";

/// Queue key for external account provisioning tasks.
pub const PROVISION_ACCOUNT_QUEUE: &str = "tasks:provision_account";

/// [`TaskDispatcher`] that pushes JSON payloads onto Redis lists consumed
/// by the worker fleet. Fire-and-forget: a successful push means queued,
/// not processed.
#[derive(Clone)]
pub struct RedisTaskDispatcher {
    conn: MultiplexedConnection,
}

impl RedisTaskDispatcher {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    async fn push<T: Serialize>(&self, queue: &str, task: &T) -> Result<(), DomainError> {
        let payload = serde_json::to_string(task).map_err(|e| {
            DomainError::new(
                ErrorCode::DispatchError,
                format!("Failed to serialize task payload: {}", e),
            )
        })?;

        let mut conn = self.conn.clone();
        let queued: i64 = conn.lpush(queue, payload).await.map_err(|e: redis::RedisError| {
            DomainError::new(ErrorCode::DispatchError, e.to_string())
        })?;

        tracing::info!(queue, queue_depth = queued, "enqueued task");
        Ok(())
    }
}

#[async_trait]
impl TaskDispatcher for RedisTaskDispatcher {
    async fn dispatch_invitation_email(
        &self,
        task: InvitationEmailTask,
    ) -> Result<(), DomainError> {
        self.push(INVITATION_EMAIL_QUEUE, &task).await
    }

    async fn dispatch_account_provisioning(
        &self,
        task: ProvisionAccountTask,
    ) -> Result<(), DomainError> {
        self.push(PROVISION_ACCOUNT_QUEUE, &task).await
    }
}

impl std::fmt::Debug for RedisTaskDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTaskDispatcher").finish_non_exhaustive()
    }
}

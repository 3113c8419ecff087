//! In-memory task dispatcher that records what would be enqueued.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::foundation::DomainError;
use crate::ports::{InvitationEmailTask, ProvisionAccountTask, TaskDispatcher};

/// Collects dispatched tasks instead of queuing them. Tests assert on the
/// collected payloads.
#[derive(Default)]
pub struct MemoryTaskDispatcher {
    invitation_emails: Mutex<Vec<InvitationEmailTask>>,
    provisioning: Mutex<Vec<ProvisionAccountTask>>,
}

impl MemoryTaskDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invitation email tasks dispatched so far.
    pub fn invitation_emails(&self) -> Vec<InvitationEmailTask> {
        self.invitation_emails.lock().expect("dispatcher poisoned").clone()
    }

    /// Provisioning tasks dispatched so far.
    pub fn provisioning_tasks(&self) -> Vec<ProvisionAccountTask> {
        self.provisioning.lock().expect("dispatcher poisoned").clone()
    }
}

#[async_trait]
impl TaskDispatcher for MemoryTaskDispatcher {
    async fn dispatch_invitation_email(
        &self,
        task: InvitationEmailTask,
    ) -> Result<(), DomainError> {
        self.invitation_emails
            .lock()
            .expect("dispatcher poisoned")
            .push(task);
        Ok(())
    }

    async fn dispatch_account_provisioning(
        &self,
        task: ProvisionAccountTask,
    ) -> Result<(), DomainError> {
        self.provisioning
            .lock()
            .expect("dispatcher poisoned")
            .push(task);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AccountId, StoreId, Timestamp};
    use crate::domain::store::AccessLevel;

    #[tokio::test]
    async fn records_dispatched_tasks() {
        let dispatcher = MemoryTaskDispatcher::new();

        dispatcher
            .dispatch_invitation_email(InvitationEmailTask {
                inviter_account_id: AccountId::new("frosty.near").unwrap(),
                invitee_account_id: AccountId::new("pebble.near").unwrap(),
                invitee_email: "pebble@example.com".to_string(),
                store_id: StoreId::new(),
                store_name: "Igloo Supplies".to_string(),
                access_level: AccessLevel::SalesAccess,
                token: "opaque".to_string(),
                expires_at: Timestamp::now().plus_secs(1500),
            })
            .await
            .unwrap();

        assert_eq!(dispatcher.invitation_emails().len(), 1);
        assert!(dispatcher.provisioning_tasks().is_empty());
    }
}

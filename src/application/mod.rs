//! Application layer: the multi-step, invariant-preserving transactions.
//!
//! Each operation here opens exactly one [`TransactionCoordinator`] unit,
//! performs its reads and writes against the transactional handle, and
//! returns a result or a typed failure.
//!
//! [`TransactionCoordinator`]: crate::ports::TransactionCoordinator

pub mod access_control;
pub mod order_lifecycle;
pub mod review_gate;
pub mod store_provisioner;

pub use access_control::{
    grant_primary_ownership, AccessControlManager, AddLevelCommand, IssueInvitationCommand,
    IssuedInvitation, RevokeCommand,
};
pub use order_lifecycle::{OrderLifecycle, UpdateOrderCommand};
pub use review_gate::{ReviewGate, SubmitReviewCommand};
pub use store_provisioner::{
    CreateStoreCommand, CreatedStore, PostCreateHook, StoreProvisioner,
};

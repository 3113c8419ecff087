//! Ports: the traits through which the core talks to its collaborators.
//!
//! The application layer depends only on these; adapters provide the
//! PostgreSQL, Redis, JWT, and in-memory implementations.

mod coordinator;
mod invitation_tokens;
mod nonce_cache;
mod store_reader;
mod store_tx;
mod task_dispatcher;

pub use coordinator::{TransactionCoordinator, UnitOfWork};
pub use invitation_tokens::{InvitationTokens, IssuedToken, VerifiedInvitation};
pub use nonce_cache::NonceCache;
pub use store_reader::StoreReader;
pub use store_tx::StoreTx;
pub use task_dispatcher::{InvitationEmailTask, ProvisionAccountTask, TaskDispatcher};

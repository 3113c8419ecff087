//! Transaction coordinator port.
//!
//! Every multi-step mutation in the application layer runs as exactly one
//! unit of work against the data store, with all-or-nothing semantics.

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::domain::foundation::DomainError;

use super::StoreTx;

/// A unit of work executed against a transactional handle.
///
/// The closure receives the handle for the lifetime of the transaction;
/// nothing it writes is observable to other transactions until commit.
pub type UnitOfWork<T> = Box<
    dyn for<'tx> FnOnce(&'tx mut dyn StoreTx) -> BoxFuture<'tx, Result<T, DomainError>>
        + Send,
>;

/// Executes a unit of work with all-or-nothing semantics.
///
/// Implementations begin a transaction, run the unit, and commit on
/// success. If the unit fails they roll back and surface the unit's
/// original error; a rollback failure is logged and wrapped as a distinct
/// infrastructure error rather than swallowed. No retries happen here --
/// retry policy belongs to callers.
#[async_trait]
pub trait TransactionCoordinator: Send + Sync {
    async fn run<T>(&self, work: UnitOfWork<T>) -> Result<T, DomainError>
    where
        T: Send + 'static;
}

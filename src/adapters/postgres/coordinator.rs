//! PostgreSQL transaction coordinator.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{TransactionCoordinator, UnitOfWork};

use super::store_tx::PgStoreTx;

/// [`TransactionCoordinator`] over a sqlx connection pool.
///
/// Begins one database transaction per unit of work; commits on success,
/// rolls back on failure. The unit's own error is surfaced unchanged; a
/// rollback failure on top of it is logged and wrapped so neither failure
/// is swallowed.
#[derive(Clone)]
pub struct PgCoordinator {
    pool: PgPool,
}

impl PgCoordinator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionCoordinator for PgCoordinator {
    async fn run<T>(&self, work: UnitOfWork<T>) -> Result<T, DomainError>
    where
        T: Send + 'static,
    {
        let tx = self.pool.begin().await.map_err(|e| {
            DomainError::database(format!("Failed to begin transaction: {}", e))
        })?;

        let mut handle = PgStoreTx::new(tx);
        match work(&mut handle).await {
            Ok(value) => {
                handle.into_inner().commit().await.map_err(|e| {
                    DomainError::database(format!("Failed to commit transaction: {}", e))
                })?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = handle.into_inner().rollback().await {
                    tracing::error!(
                        unit_error = %err,
                        rollback_error = %rollback_err,
                        "rollback failed after aborted unit of work"
                    );
                    return Err(DomainError::new(
                        ErrorCode::DatabaseError,
                        format!(
                            "Unit of work failed ({}) and rollback also failed: {}",
                            err, rollback_err
                        ),
                    ));
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for PgCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgCoordinator").finish_non_exhaustive()
    }
}

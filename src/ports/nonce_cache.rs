//! Single-use token tracking.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::DomainError;

/// Key-value store used exclusively as a single-use-token tracker.
///
/// The burn check and the burn itself are one atomic operation
/// ([`mark_used`]); callers must never implement "check then set" with
/// two calls, or two concurrent redemptions of the same token can both
/// succeed.
///
/// [`mark_used`]: NonceCache::mark_used
#[async_trait]
pub trait NonceCache: Send + Sync {
    /// Atomically marks the key as used with the given time-to-live.
    ///
    /// Returns true if this call claimed the key, false if it was already
    /// marked.
    async fn mark_used(&self, key: &str, ttl: Duration) -> Result<bool, DomainError>;

    /// True if the key is currently marked as used.
    async fn exists(&self, key: &str) -> Result<bool, DomainError>;

    /// Removes the mark, allowing the key to be claimed again.
    ///
    /// Used to roll back a claim when the operation it guarded failed.
    async fn release(&self, key: &str) -> Result<(), DomainError>;
}

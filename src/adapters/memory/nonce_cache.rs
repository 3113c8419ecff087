//! In-memory single-use token tracker for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::foundation::DomainError;
use crate::ports::NonceCache;

/// Single-process [`NonceCache`] backed by a mutex-guarded map.
///
/// The map mutation under the lock gives the same check-and-set atomicity
/// the Redis adapter gets from `SET NX EX`.
#[derive(Default)]
pub struct MemoryNonceCache {
    entries: Mutex<HashMap<String, Instant>>,
}

impl MemoryNonceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn purge_expired(entries: &mut HashMap<String, Instant>) {
        let now = Instant::now();
        entries.retain(|_, expires_at| *expires_at > now);
    }
}

#[async_trait]
impl NonceCache for MemoryNonceCache {
    async fn mark_used(&self, key: &str, ttl: Duration) -> Result<bool, DomainError> {
        let mut entries = self.entries.lock().expect("nonce cache poisoned");
        Self::purge_expired(&mut entries);
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), Instant::now() + ttl);
        Ok(true)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let mut entries = self.entries.lock().expect("nonce cache poisoned");
        Self::purge_expired(&mut entries);
        Ok(entries.contains_key(key))
    }

    async fn release(&self, key: &str) -> Result<(), DomainError> {
        let mut entries = self.entries.lock().expect("nonce cache poisoned");
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_claim_wins_second_loses() {
        let cache = MemoryNonceCache::new();
        let ttl = Duration::from_secs(60);

        assert!(cache.mark_used("token-1", ttl).await.unwrap());
        assert!(!cache.mark_used("token-1", ttl).await.unwrap());
        assert!(cache.exists("token-1").await.unwrap());
    }

    #[tokio::test]
    async fn expired_entries_can_be_claimed_again() {
        let cache = MemoryNonceCache::new();

        assert!(cache
            .mark_used("token-2", Duration::from_millis(1))
            .await
            .unwrap());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache
            .mark_used("token-2", Duration::from_secs(60))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn release_reopens_the_key() {
        let cache = MemoryNonceCache::new();
        let ttl = Duration::from_secs(60);

        assert!(cache.mark_used("token-3", ttl).await.unwrap());
        cache.release("token-3").await.unwrap();
        assert!(!cache.exists("token-3").await.unwrap());
        assert!(cache.mark_used("token-3", ttl).await.unwrap());
    }
}

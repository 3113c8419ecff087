//! Redis-backed single-use token tracker.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::foundation::DomainError;
use crate::ports::NonceCache;

/// [`NonceCache`] over Redis for multi-server deployments.
///
/// `SET key 1 NX EX ttl` is the atomic check-and-set: exactly one caller
/// observes the key as fresh, everyone else sees it already claimed.
#[derive(Clone)]
pub struct RedisNonceCache {
    conn: MultiplexedConnection,
}

impl RedisNonceCache {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl NonceCache for RedisNonceCache {
    async fn mark_used(&self, key: &str, ttl: Duration) -> Result<bool, DomainError> {
        let mut conn = self.conn.clone();
        // EX 0 is rejected by Redis; a token on its last second still
        // needs a positive expiry.
        let ttl_secs = ttl.as_secs().max(1);

        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| DomainError::cache(e.to_string()))?;

        Ok(reply.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.conn.clone();
        conn.exists(key)
            .await
            .map_err(|e: redis::RedisError| DomainError::cache(e.to_string()))
    }

    async fn release(&self, key: &str) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e: redis::RedisError| DomainError::cache(e.to_string()))
    }
}

impl std::fmt::Debug for RedisNonceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisNonceCache").finish_non_exhaustive()
    }
}

//! Redis cache backend.
//!
//! Connection pooling via deadpool-redis; values are stored with SETEX so
//! Redis owns expiry. Every transport failure maps to
//! `CacheError::Unavailable` - the coordinator decides whether that matters.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::{cmd, AsyncCommands};
use deadpool_redis::{Config, Connection, Pool, Runtime};

use crate::error::{CacheError, CacheResult};
use crate::traits::CacheStore;

/// Redis-backed cache store.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool,
}

impl RedisCacheStore {
    /// Wrap an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a pool from a connection URL (e.g. `redis://localhost:6379`).
    pub fn from_url(url: &str) -> CacheResult<Self> {
        let cfg = Config::from_url(url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(CacheError::unavailable)?;
        Ok(Self { pool })
    }

    async fn conn(&self) -> CacheResult<Connection> {
        self.pool.get().await.map_err(CacheError::unavailable)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(CacheError::unavailable)?;
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        // SETEX rejects a zero TTL.
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.conn().await?;
        let _: () = conn
            .set_ex(key, value, seconds)
            .await
            .map_err(CacheError::unavailable)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.conn().await?;
        let removed: u64 = conn.del(key).await.map_err(CacheError::unavailable)?;
        Ok(removed)
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.conn().await?;
        let keys: Vec<String> = conn.keys(pattern).await.map_err(CacheError::unavailable)?;
        Ok(keys)
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let _: String = cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(CacheError::unavailable)?;
        Ok(())
    }
}

//! 读缓存模块
//!
//! Read Cache sitting in front of the primary store. Entries are opaque JSON
//! snapshots with a fixed time-to-live; Redis in production, an in-process map
//! for tests and single-node setups.

pub mod keys;
pub mod memory;
pub mod redis_cache;

use async_trait::async_trait;

use crate::error::Result;

pub use keys::CacheKeyBuilder;
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Default entry lifetime: one hour.
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Key-value cache with per-entry expiry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadCache: Send + Sync {
    /// Returns the stored value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;

    /// Removes every entry whose key starts with `prefix`, returning how many were removed.
    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64>;

    /// Fails when the backend cannot be reached.
    async fn health_check(&self) -> Result<()>;

    /// Backend name for logs and health checks.
    fn backend(&self) -> &'static str;
}

//! 存储工厂模块
//!
//! 根据配置创建主存储和读缓存实例。

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::cache::{MemoryCache, ReadCache, RedisCache};
use crate::config::config::{CacheBackend, CacheConfig, DatabaseConfig, StoreBackend};
use crate::error::{AppError, Result};
use crate::storage::repository::{ActivityStore, MemoryActivityStore};

#[cfg(feature = "surrealdb")]
use crate::storage::surrealdb::{SurrealActivityStore, SurrealPool};

/// 进程内缓存的过期清理周期
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// 存储工厂
pub struct StorageFactory;

impl StorageFactory {
    /// 根据配置创建主存储
    pub async fn create_store(config: &DatabaseConfig) -> Result<Arc<dyn ActivityStore>> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory activity store");
                Ok(Arc::new(MemoryActivityStore::new()))
            }
            #[cfg(feature = "surrealdb")]
            StoreBackend::SurrealDb => {
                let pool = SurrealPool::new(config.clone()).await.map_err(|e| {
                    error!("SurrealDB connection error: {}", e);
                    AppError::Database(e.to_string())
                })?;
                let store = SurrealActivityStore::from_pool(&pool);
                store.health_check().await?;
                info!("SurrealDB connected: {}", pool.config().url);
                Ok(Arc::new(store))
            }
            #[cfg(not(feature = "surrealdb"))]
            StoreBackend::SurrealDb => Err(AppError::Config(
                "SurrealDB feature is not enabled. Enable 'surrealdb' feature or use the memory backend."
                    .into(),
            )),
        }
    }

    /// 根据配置创建读缓存
    pub async fn create_cache(config: &CacheConfig) -> Result<Arc<dyn ReadCache>> {
        match config.backend {
            CacheBackend::Memory => {
                info!("Using in-memory read cache");
                let cache = MemoryCache::new();
                cache.spawn_purge_task(PURGE_INTERVAL);
                Ok(Arc::new(cache))
            }
            CacheBackend::Redis => {
                let cache = RedisCache::connect(&config.redis_url).await.map_err(|e| {
                    error!("Redis connection error: {}", e);
                    e
                })?;
                cache.health_check().await?;
                Ok(Arc::new(cache))
            }
        }
    }
}

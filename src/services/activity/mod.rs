//! 活动服务
//!
//! Query orchestrator for activity logs: cache-aside reads over the primary
//! store, and ingestion of new records.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::cache::ReadCache;
use crate::cache::keys::{self, CacheKeyBuilder};
use crate::config::config::CacheConfig;
use crate::error::{AppError, Result};
use crate::models::activity::{ActivityQuery, ActivityRecord, NewActivity};
use crate::observability::AppMetrics;
use crate::security::validation::Validatable;
use crate::storage::repository::ActivityStore;

/// Outcome of a range-filtered read.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityLookup {
    /// Served from the read cache; may be stale by up to the TTL.
    Cached(Vec<ActivityRecord>),
    /// Read from the primary store and written to the cache.
    Fresh(Vec<ActivityRecord>),
    /// The store had no matching records. Never cached.
    NotFound,
}

impl ActivityLookup {
    pub fn records(&self) -> Option<&[ActivityRecord]> {
        match self {
            Self::Cached(records) | Self::Fresh(records) => Some(records),
            Self::NotFound => None,
        }
    }

    pub fn into_records(self) -> Option<Vec<ActivityRecord>> {
        match self {
            Self::Cached(records) | Self::Fresh(records) => Some(records),
            Self::NotFound => None,
        }
    }

    pub fn is_cache_hit(&self) -> bool {
        matches!(self, Self::Cached(_))
    }
}

/// How results are cached.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub keys: CacheKeyBuilder,
    pub ttl_seconds: u64,
    /// Drop a user's cached entries after each write for that user.
    pub invalidate_on_write: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            keys: CacheKeyBuilder::default(),
            ttl_seconds: crate::cache::DEFAULT_TTL_SECONDS,
            invalidate_on_write: false,
        }
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            keys: CacheKeyBuilder::new(config.key_prefix.clone()),
            ttl_seconds: config.ttl_seconds,
            invalidate_on_write: config.invalidate_on_write,
        }
    }
}

/// 活动服务 trait
#[async_trait]
pub trait ActivityService: Send + Sync {
    /// 录入一条活动记录
    async fn log_activity(&self, activity: NewActivity) -> Result<ActivityRecord>;

    /// 按用户和日期范围查询活动记录
    ///
    /// The date filter applies only when both `start` and `end` are given.
    async fn get_activity_logs(
        &self,
        user_id: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<ActivityLookup>;
}

/// 活动服务实现
pub struct ActivityServiceImpl {
    store: Arc<dyn ActivityStore>,
    cache: Arc<dyn ReadCache>,
    policy: CachePolicy,
    metrics: Arc<AppMetrics>,
}

impl ActivityServiceImpl {
    /// 创建新的服务实例
    pub fn new(
        store: Arc<dyn ActivityStore>,
        cache: Arc<dyn ReadCache>,
        policy: CachePolicy,
    ) -> Self {
        Self {
            store,
            cache,
            policy,
            metrics: Arc::new(AppMetrics::default()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }
}

#[async_trait]
impl ActivityService for ActivityServiceImpl {
    async fn log_activity(&self, activity: NewActivity) -> Result<ActivityRecord> {
        activity.validate()?;

        let record = ActivityRecord::new(activity);
        let stored = self.store.insert(&record).await.map_err(|e| {
            error!("Error logging activity: {}", e);
            self.metrics.record_error();
            e
        })?;
        self.metrics.record_activity_logged();
        debug!(user_id = %stored.user_id, date = %stored.date, "activity logged");

        if self.policy.invalidate_on_write {
            let prefix = self.policy.keys.user_prefix(&stored.user_id);
            match self.cache.invalidate_prefix(&prefix).await {
                Ok(removed) => debug!(removed, "invalidated cached logs for {}", stored.user_id),
                Err(e) => warn!("Failed to invalidate cached logs for {}: {}", stored.user_id, e),
            }
        }

        Ok(stored)
    }

    async fn get_activity_logs(
        &self,
        user_id: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<ActivityLookup> {
        let cache_key = self.policy.keys.activity_logs(user_id, start, end);

        let cached = self.cache.get(&cache_key).await.map_err(|e| {
            error!("Error retrieving activity logs from cache: {}", e);
            self.metrics.record_error();
            e
        })?;

        if let Some(payload) = cached {
            debug!(key = %cache_key, "Cache hit");
            self.metrics.record_cache_hit();
            let records = keys::decode_payload(&payload).map_err(|e| {
                error!("Corrupt cache entry {}: {}", cache_key, e);
                self.metrics.record_error();
                e
            })?;
            return Ok(ActivityLookup::Cached(records));
        }

        debug!(key = %cache_key, "Cache miss");
        self.metrics.record_cache_miss();

        let query = ActivityQuery::new(user_id, start, end);
        let records = self.store.find(&query).await.map_err(|e| {
            error!("Error retrieving activity logs: {}", e);
            self.metrics.record_error();
            e
        })?;

        if records.is_empty() {
            self.metrics.record_not_found();
            return Ok(ActivityLookup::NotFound);
        }

        let payload = keys::encode_payload(&records)?;
        self.cache
            .set_with_expiry(&cache_key, &payload, self.policy.ttl_seconds)
            .await
            .map_err(|e| {
                error!("Error caching activity logs: {}", e);
                self.metrics.record_error();
                e
            })?;
        self.metrics.record_cache_write();

        Ok(ActivityLookup::Fresh(records))
    }
}

/// 创建活动服务
pub fn create_activity_service(
    store: Arc<dyn ActivityStore>,
    cache: Arc<dyn ReadCache>,
    policy: CachePolicy,
    metrics: Arc<AppMetrics>,
) -> Box<dyn ActivityService> {
    Box::new(ActivityServiceImpl::new(store, cache, policy).with_metrics(metrics))
}

/// Maps a lookup onto the not-found error used by the HTTP layer.
pub fn require_records(lookup: ActivityLookup) -> Result<Vec<ActivityRecord>> {
    lookup.into_records().ok_or_else(|| {
        AppError::NotFound(
            "No activity logs found for this user in the specified range".to_string(),
        )
    })
}

//! In-process read cache.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use super::ReadCache;
use crate::error::Result;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

fn purge(entries: &DashMap<String, Entry>) {
    let now = Instant::now();
    entries.retain(|_, entry| !entry.is_expired(now));
}

/// DashMap-backed cache. Expired entries read as absent and are dropped lazily.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        purge(&self.entries);
    }

    /// Purges expired entries every `period` until the cache is dropped.
    ///
    /// Keys that are never read again would otherwise stay in memory forever.
    pub fn spawn_purge_task(&self, period: Duration) -> JoinHandle<()> {
        let entries = Arc::downgrade(&self.entries);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(entries) = entries.upgrade() else {
                    break;
                };
                purge(&entries);
                debug!(live = entries.len(), "purged expired cache entries");
            }
        })
    }
}

#[async_trait]
impl ReadCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
        }
        // read guard must be released before removing, or the shard deadlocks
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64> {
        // counted per removal: concurrent inserts may change len() mid-retain
        let mut removed = 0u64;
        self.entries.retain(|key, _| {
            let keep = !key.starts_with(prefix);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("k", "v", 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_replaces_value() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("k", "v1", 60).await.unwrap();
        cache.set_with_expiry("k", "v2", 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_unreadable_after_ttl() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("k", "v", 3600).await.unwrap();

        tokio::time::advance(Duration::from_secs(3599)).await;
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("short", "v", 1).await.unwrap();
        cache.set_with_expiry("long", "v", 100).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        cache.purge_expired();
        assert_eq!(cache.entries.len(), 1);
        assert!(cache.get("long").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_task_drops_expired_entries() {
        let cache = MemoryCache::new();
        let handle = cache.spawn_purge_task(Duration::from_secs(60));
        cache.set_with_expiry("short", "v", 1).await.unwrap();
        cache.set_with_expiry("long", "v", 3600).await.unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(cache.entries.len(), 1);
        assert!(cache.entries.contains_key("long"));

        drop(cache);
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_invalidate_prefix_with_concurrent_writers() {
        let cache = MemoryCache::new();
        let writers: Vec<_> = (0..4)
            .map(|t| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    for i in 0..500 {
                        cache
                            .set_with_expiry(&format!("other:{t}:{i}"), "x", 60)
                            .await
                            .unwrap();
                    }
                })
            })
            .collect();

        for i in 0..200 {
            cache.set_with_expiry(&format!("p:{i}"), "x", 60).await.unwrap();
            let removed = cache.invalidate_prefix("p:").await.unwrap();
            assert_eq!(removed, 1);
        }
        for writer in writers {
            writer.await.unwrap();
        }

        assert_eq!(cache.len(), 2000);
    }

    #[tokio::test]
    async fn test_invalidate_prefix() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("activity_logs:u1:a:b", "x", 60).await.unwrap();
        cache.set_with_expiry("activity_logs:u1:c:d", "x", 60).await.unwrap();
        cache.set_with_expiry("activity_logs:u10:a:b", "x", 60).await.unwrap();

        let removed = cache.invalidate_prefix("activity_logs:u1:").await.unwrap();
        assert_eq!(removed, 2);
        assert!(cache.get("activity_logs:u10:a:b").await.unwrap().is_some());
    }
}

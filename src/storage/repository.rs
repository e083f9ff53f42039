use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::activity::{ActivityQuery, ActivityRecord};

/// 主存储 trait
///
/// Durable, authoritative storage for activity records. Records are
/// append-only: there is no update or delete.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// 写入记录
    async fn insert(&self, record: &ActivityRecord) -> Result<ActivityRecord>;

    /// 按用户和可选日期范围查询，按日期升序返回
    async fn find(&self, query: &ActivityQuery) -> Result<Vec<ActivityRecord>>;

    /// 连通性检查
    async fn health_check(&self) -> Result<()>;

    /// 后端名称
    fn backend(&self) -> &'static str;
}

/// Sorts records the way every store returns them: by date, then creation time.
pub fn sort_records(records: &mut [ActivityRecord]) {
    records.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

/// 进程内存储实现
#[derive(Debug, Clone, Default)]
pub struct MemoryActivityStore {
    records: Arc<RwLock<Vec<ActivityRecord>>>,
}

impl MemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录总数
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl ActivityStore for MemoryActivityStore {
    async fn insert(&self, record: &ActivityRecord) -> Result<ActivityRecord> {
        self.records.write().await.push(record.clone());
        Ok(record.clone())
    }

    async fn find(&self, query: &ActivityQuery) -> Result<Vec<ActivityRecord>> {
        let mut found: Vec<ActivityRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        sort_records(&mut found);
        Ok(found)
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
    use crate::models::activity::NewActivity;

    fn record(user_id: &str, date: &str) -> ActivityRecord {
        ActivityRecord::new(NewActivity {
            user_id: user_id.into(),
            date: date.into(),
            hydration_liters: 1.5,
            sleep_hours: 7.0,
            exercise_minutes: 20.0,
            meditation_minutes: 5.0,
            source: None,
        })
    }

    async fn seeded() -> MemoryActivityStore {
        let store = MemoryActivityStore::new();
        for (user, date) in [
            ("u1", "2024-01-05"),
            ("u1", "2024-01-01"),
            ("u1", "2024-01-03"),
            ("u2", "2024-01-02"),
        ] {
            store.insert(&record(user, date)).await.unwrap();
        }
        store
    }

    fn dates(records: &[ActivityRecord]) -> Vec<&str> {
        records.iter().map(|r| r.date.as_str()).collect()
    }

    #[tokio::test]
    async fn test_insert_returns_stored_record() {
        let store = MemoryActivityStore::new();
        let r = record("u1", "2024-01-01");
        let stored = store.insert(&r).await.unwrap();
        assert_eq!(stored, r);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_user_sorted_by_date() {
        let store = seeded().await;
        let found = store.find(&ActivityQuery::new("u1", None, None)).await.unwrap();
        assert_eq!(dates(&found), vec!["2024-01-01", "2024-01-03", "2024-01-05"]);
    }

    #[tokio::test]
    async fn test_find_inclusive_range() {
        let store = seeded().await;
        let query = ActivityQuery::new("u1", Some("2024-01-01"), Some("2024-01-03"));
        let found = store.find(&query).await.unwrap();
        assert_eq!(dates(&found), vec!["2024-01-01", "2024-01-03"]);
    }

    #[tokio::test]
    async fn test_find_unknown_user_is_empty() {
        let store = seeded().await;
        let found = store.find(&ActivityQuery::new("u3", None, None)).await.unwrap();
        assert!(found.is_empty());
    }
}

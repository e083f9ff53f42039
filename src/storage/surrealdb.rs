use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::{
    Surreal,
    engine::any::{Any, connect},
    opt::auth::Root,
};
use tracing::debug;

use crate::config::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::activity::{ActivityQuery, ActivityRecord};
use crate::storage::repository::{ActivityStore, sort_records};

const TABLE: &str = "activity_log";

/// SurrealDB 连接
#[derive(Clone)]
pub struct SurrealPool {
    /// 数据库连接
    db: Surreal<Any>,
    /// 连接配置
    config: DatabaseConfig,
}

impl SurrealPool {
    /// 建立连接
    pub async fn new(config: DatabaseConfig) -> std::result::Result<Self, surrealdb::Error> {
        let db: Surreal<Any> = connect(&config.url).await?;

        // 认证
        db.signin(Root {
            username: &config.username,
            password: &config.password,
        })
        .await?;

        // 选择命名空间和数据库
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        Ok(Self { db, config })
    }

    /// 获取内部数据库实例
    pub fn inner(&self) -> Surreal<Any> {
        self.db.clone()
    }

    /// 连接配置
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

/// 存储文档。记录 ID 由 SurrealDB 的 record id 承载，不在文档中重复。
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActivityDocument {
    user_id: String,
    date: String,
    hydration_liters: f64,
    sleep_hours: f64,
    exercise_minutes: f64,
    meditation_minutes: f64,
    source: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&ActivityRecord> for ActivityDocument {
    fn from(r: &ActivityRecord) -> Self {
        Self {
            user_id: r.user_id.clone(),
            date: r.date.clone(),
            hydration_liters: r.hydration_liters,
            sleep_hours: r.sleep_hours,
            exercise_minutes: r.exercise_minutes,
            meditation_minutes: r.meditation_minutes,
            source: r.source.clone(),
            created_at: r.created_at,
        }
    }
}

/// 查询结果行，`record_id` 来自 `meta::id(id)`
#[derive(Debug, Deserialize)]
struct ActivityRow {
    record_id: String,
    #[serde(flatten)]
    doc: ActivityDocument,
}

impl From<ActivityRow> for ActivityRecord {
    fn from(row: ActivityRow) -> Self {
        let d = row.doc;
        ActivityRecord {
            id: row.record_id,
            user_id: d.user_id,
            date: d.date,
            hydration_liters: d.hydration_liters,
            sleep_hours: d.sleep_hours,
            exercise_minutes: d.exercise_minutes,
            meditation_minutes: d.meditation_minutes,
            source: d.source,
            created_at: d.created_at,
        }
    }
}

/// Builds the SurrealQL select for a query; range bounds are bound as `$start`/`$end`.
pub fn build_find_query(query: &ActivityQuery) -> String {
    let mut sql = format!(
        "SELECT meta::id(id) AS record_id, user_id, date, hydration_liters, sleep_hours, \
         exercise_minutes, meditation_minutes, source, created_at FROM {} WHERE user_id = $user_id",
        TABLE
    );
    if query.range.is_some() {
        sql.push_str(" AND date >= $start AND date <= $end");
    }
    sql.push_str(" ORDER BY date ASC");
    sql
}

/// SurrealDB 活动存储实现
#[derive(Clone)]
pub struct SurrealActivityStore {
    db: Surreal<Any>,
}

impl SurrealActivityStore {
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    pub fn from_pool(pool: &SurrealPool) -> Self {
        Self::new(pool.inner())
    }
}

#[async_trait]
impl ActivityStore for SurrealActivityStore {
    async fn insert(&self, record: &ActivityRecord) -> Result<ActivityRecord> {
        let created: Option<ActivityDocument> = self
            .db
            .create((TABLE, record.id.clone()))
            .content(ActivityDocument::from(record))
            .await?;

        created
            .map(|_| record.clone())
            .ok_or_else(|| AppError::Database(format!("Failed to create activity: {}", record.id)))
    }

    async fn find(&self, query: &ActivityQuery) -> Result<Vec<ActivityRecord>> {
        let sql = build_find_query(query);
        debug!(user_id = %query.user_id, range = ?query.range, "querying activity logs");

        let mut request = self.db.query(sql).bind(("user_id", query.user_id.clone()));
        if let Some(range) = &query.range {
            request = request
                .bind(("start", range.start.clone()))
                .bind(("end", range.end.clone()));
        }

        let rows: Vec<ActivityRow> = request.await?.take(0)?;
        let mut records: Vec<ActivityRecord> = rows.into_iter().map(Into::into).collect();
        sort_records(&mut records);
        Ok(records)
    }

    async fn health_check(&self) -> Result<()> {
        self.db.health().await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "surrealdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_query_without_range() {
        let sql = build_find_query(&ActivityQuery::new("u1", None, None));
        assert!(sql.contains("WHERE user_id = $user_id"));
        assert!(!sql.contains("$start"));
        assert!(sql.ends_with("ORDER BY date ASC"));
    }

    #[test]
    fn test_find_query_with_range() {
        let sql = build_find_query(&ActivityQuery::new("u1", Some("a"), Some("b")));
        assert!(sql.contains("date >= $start AND date <= $end"));
    }

    #[test]
    fn test_find_query_single_bound_has_no_range() {
        let sql = build_find_query(&ActivityQuery::new("u1", Some("a"), None));
        assert!(!sql.contains("$start"));
    }

    #[tokio::test]
    async fn test_remote_engines_are_compiled_in() {
        // nothing listens on port 1; the connect must fail on the network, not the scheme
        for url in ["ws://127.0.0.1:1", "http://127.0.0.1:1"] {
            if let Err(e) = connect(url).await {
                assert!(!e.to_string().contains("not enabled"), "{url}: {e}");
            }
        }
    }
}

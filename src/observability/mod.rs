//! 可观测性模块
//!
//! 提供 Prometheus 文本格式指标、结构化日志和健康检查。

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cache::ReadCache;
use crate::config::config::LoggingConfig;
use crate::storage::repository::ActivityStore;

// ===== Simple Metrics =====

/// 应用指标
#[derive(Debug, Default)]
pub struct AppMetrics {
    http_requests_total: AtomicU64,
    http_request_duration_ms_sum: AtomicU64,
    cache_hits_total: AtomicU64,
    cache_misses_total: AtomicU64,
    cache_writes_total: AtomicU64,
    not_found_total: AtomicU64,
    activities_logged_total: AtomicU64,
    errors_total: AtomicU64,
}

/// 指标快照
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub http_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_writes: u64,
    pub not_found: u64,
    pub activities_logged: u64,
    pub errors: u64,
}

impl AppMetrics {
    /// 记录 HTTP 请求
    pub fn record_http_request(&self, duration_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_request_duration_ms_sum
            .fetch_add(duration_ms, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_write(&self) {
        self.cache_writes_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_found(&self) {
        self.not_found_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_activity_logged(&self) {
        self.activities_logged_total.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录错误
    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            http_requests: self.http_requests_total.load(Ordering::Relaxed),
            cache_hits: self.cache_hits_total.load(Ordering::Relaxed),
            cache_misses: self.cache_misses_total.load(Ordering::Relaxed),
            cache_writes: self.cache_writes_total.load(Ordering::Relaxed),
            not_found: self.not_found_total.load(Ordering::Relaxed),
            activities_logged: self.activities_logged_total.load(Ordering::Relaxed),
            errors: self.errors_total.load(Ordering::Relaxed),
        }
    }

    /// 生成 Prometheus 格式指标
    pub fn gather(&self) -> String {
        let s = self.snapshot();
        let duration_sum =
            self.http_request_duration_ms_sum.load(Ordering::Relaxed) as f64 / 1000.0;
        format!(
            r#"# HELP http_requests_total Total HTTP requests
# TYPE http_requests_total counter
http_requests_total {}
# HELP http_request_duration_seconds HTTP request duration in seconds
# TYPE http_request_duration_seconds summary
http_request_duration_seconds_sum {}
http_request_duration_seconds_count {}
# HELP activity_cache_hits_total Reads served from the read cache
# TYPE activity_cache_hits_total counter
activity_cache_hits_total {}
# HELP activity_cache_misses_total Reads that fell through to the primary store
# TYPE activity_cache_misses_total counter
activity_cache_misses_total {}
# HELP activity_cache_writes_total Snapshots written to the read cache
# TYPE activity_cache_writes_total counter
activity_cache_writes_total {}
# HELP activity_not_found_total Reads that matched no records
# TYPE activity_not_found_total counter
activity_not_found_total {}
# HELP activities_logged_total Activity records written
# TYPE activities_logged_total counter
activities_logged_total {}
# HELP errors_total Total errors
# TYPE errors_total counter
errors_total {}
"#,
            s.http_requests,
            duration_sum,
            s.http_requests,
            s.cache_hits,
            s.cache_misses,
            s.cache_writes,
            s.not_found,
            s.activities_logged,
            s.errors,
        )
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub checks: Vec<HealthCheck>,
}

/// 单个健康检查项
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    pub message: Option<String>,
    pub latency_ms: Option<u64>,
}

/// 健康检查结果
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    pub name: String,
    pub healthy: bool,
    pub message: String,
    pub latency_ms: u64,
}

fn status_label(healthy: bool) -> String {
    if healthy { "healthy" } else { "unhealthy" }.to_string()
}

/// 单个依赖检查的超时
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// 可观测性状态
#[derive(Clone)]
pub struct ObservabilityState {
    pub metrics: Arc<AppMetrics>,
    pub health_checks: Arc<Mutex<Vec<HealthCheckResult>>>,
    pub start_time: DateTime<Utc>,
    pub version: String,
    store: Option<Arc<dyn ActivityStore>>,
    cache: Option<Arc<dyn ReadCache>>,
}

impl ObservabilityState {
    pub fn new(version: String, metrics: Arc<AppMetrics>) -> Self {
        Self {
            metrics,
            health_checks: Arc::new(Mutex::new(Vec::new())),
            start_time: Utc::now(),
            version,
            store: None,
            cache: None,
        }
    }

    /// 注册需要在健康检查时检查的后端
    pub fn with_backends(mut self, store: Arc<dyn ActivityStore>, cache: Arc<dyn ReadCache>) -> Self {
        self.store = Some(store);
        self.cache = Some(cache);
        self
    }

    /// 重新检查已注册的后端并更新检查结果
    pub async fn refresh_health_checks(&self) {
        if let Some(store) = &self.store {
            let result = run_check(format!("store:{}", store.backend()), store.health_check()).await;
            self.add_health_check(result).await;
        }
        if let Some(cache) = &self.cache {
            let result = run_check(format!("cache:{}", cache.backend()), cache.health_check()).await;
            self.add_health_check(result).await;
        }
    }

    /// 添加健康检查结果，同名结果会被替换
    pub async fn add_health_check(&self, result: HealthCheckResult) {
        let mut checks = self.health_checks.lock().await;
        checks.retain(|c| c.name != result.name);
        checks.push(result);
    }

    /// 获取应用正常运行时间
    pub fn uptime_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_seconds() as f64
    }
}

async fn run_check(
    name: String,
    check: impl Future<Output = crate::error::Result<()>>,
) -> HealthCheckResult {
    let started = std::time::Instant::now();
    let outcome = tokio::time::timeout(HEALTH_CHECK_TIMEOUT, check).await;
    let latency_ms = started.elapsed().as_millis() as u64;
    let (healthy, message) = match outcome {
        Ok(Ok(())) => (true, "ok".to_string()),
        Ok(Err(e)) => (false, e.to_string()),
        Err(_) => (false, "health check timed out".to_string()),
    };
    if !healthy {
        warn!(check = %name, %message, "dependency health check failed");
    }
    HealthCheckResult {
        name,
        healthy,
        message,
        latency_ms,
    }
}

// ===== Health Check Handlers =====

/// 获取完整健康状态
pub async fn health_check(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    state.refresh_health_checks().await;
    let checks = state.health_checks.lock().await;
    let all_healthy = checks.iter().all(|c| c.healthy);

    let health_status = HealthStatus {
        status: status_label(all_healthy),
        timestamp: Utc::now().to_rfc3339(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        checks: checks
            .iter()
            .map(|c| HealthCheck {
                name: c.name.clone(),
                status: status_label(c.healthy),
                message: Some(c.message.clone()),
                latency_ms: Some(c.latency_ms),
            })
            .collect(),
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health_status))
}

/// 简单存活检查
pub async fn liveness() -> impl IntoResponse {
    "OK"
}

/// 就绪检查（检查依赖服务）
pub async fn readiness(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    state.refresh_health_checks().await;
    let checks = state.health_checks.lock().await;
    if checks.iter().all(|c| c.healthy) {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not Ready")
    }
}

/// Prometheus 指标端点
pub async fn metrics(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    (StatusCode::OK, state.metrics.gather())
}

/// 版本信息端点
pub async fn version(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 创建可观测性路由
pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/metrics", get(metrics))
        .route("/version", get(version))
        .with_state(state)
}

// ===== Structured Logging =====

/// 初始化结构化日志
///
/// `RUST_LOG` takes precedence over `logging.level`. When `log_dir` is set,
/// output goes to a daily rolling file and the returned guard must be kept
/// alive for the lifetime of the process.
pub fn init_tracing(
    service_name: &str,
    config: &LoggingConfig,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let level = if config.level.is_empty() {
        "info"
    } else {
        config.level.as_str()
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("{},{}={}", level, service_name, level))?,
    };

    let (writer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, format!("{}.log", service_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer), Some(guard))
        }
        None => (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout),
            None,
        ),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.structured {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(writer))
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(writer),
            )
            .try_init()?;
    }

    Ok(guard)
}

// ===== Request Metrics Middleware =====

/// 记录请求指标的中间件
pub async fn metrics_middleware(
    State(metrics): State<Arc<AppMetrics>>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let start = std::time::Instant::now();
    let response = next.run(req).await;
    metrics.record_http_request(start.elapsed().as_millis() as u64);
    response
}

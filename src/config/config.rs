use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 主存储后端
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// SurrealDB
    #[default]
    SurrealDb,
    /// 进程内存储
    Memory,
}

/// 读缓存后端
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Redis
    #[default]
    Redis,
    /// 进程内缓存
    Memory,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 存储后端
    pub backend: StoreBackend,
    /// SurrealDB 连接地址
    pub url: String,
    /// 命名空间
    pub namespace: String,
    /// 数据库名称
    pub database: String,
    /// 用户名
    pub username: String,
    /// 密码
    pub password: String,
}

/// 读缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 缓存后端
    pub backend: CacheBackend,
    /// Redis 地址
    pub redis_url: String,
    /// 缓存键前缀
    pub key_prefix: String,
    /// 缓存过期时间（秒）
    pub ttl_seconds: u64,
    /// 写入后失效该用户的缓存
    pub invalidate_on_write: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis_url: "redis://localhost:6379".into(),
            key_prefix: crate::cache::keys::DEFAULT_KEY_PREFIX.into(),
            ttl_seconds: crate::cache::DEFAULT_TTL_SECONDS,
            invalidate_on_write: false,
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
    /// 请求超时（秒）
    pub request_timeout: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
    /// 日志文件目录
    pub log_dir: Option<PathBuf>,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 读缓存配置
    pub cache: CacheConfig,
    /// 服务器配置
    pub server: ServerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            database: DatabaseConfig {
                backend: StoreBackend::SurrealDb,
                url: "ws://localhost:8000".into(),
                namespace: "wellog".into(),
                database: "activity".into(),
                username: "root".into(),
                password: "root".into(),
            },
            cache: CacheConfig::default(),
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 3000,
                request_timeout: 30,
            },
            logging: LoggingConfig {
                level: "debug".into(),
                structured: false,
                log_dir: None,
            },
            app_name: "wellog".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config.logging.log_dir = Some(PathBuf::from("./logs"));
        config
    }

    /// 进程内后端，无需外部服务
    pub fn in_memory() -> Self {
        let mut config = Self::development();
        config.database.backend = StoreBackend::Memory;
        config.cache.backend = CacheBackend::Memory;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_seconds, 3600);
        assert_eq!(config.key_prefix, "activity_logs");
        assert!(!config.invalidate_on_write);
    }

    #[test]
    fn test_production_preset() {
        let config = AppConfig::production();
        assert_eq!(config.environment, "production");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.structured);
    }

    #[test]
    fn test_backend_names() {
        let backend: StoreBackend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(backend, StoreBackend::Memory);
        let backend: CacheBackend = serde_json::from_str("\"redis\"").unwrap();
        assert_eq!(backend, CacheBackend::Redis);
    }
}

use crate::config::config::{AppConfig, CacheBackend, StoreBackend};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use std::path::PathBuf;

/// 环境变量前缀，嵌套字段用 `__` 分隔（如 `WELLOG_CACHE__TTL_SECONDS`）
pub const ENV_PREFIX: &str = "WELLOG_";

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 合并顺序：
    /// 1. 开发环境默认值
    /// 2. ./config.yaml
    /// 3. 环境变量
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: PathBuf) -> Result<AppConfig, figment::Error> {
        Self::figment(path).extract()
    }

    fn figment(path: PathBuf) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::development()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.database.backend == StoreBackend::SurrealDb && config.database.url.is_empty() {
            return Err(ConfigValidationError::MissingDatabaseUrl);
        }

        if config.cache.backend == CacheBackend::Redis && config.cache.redis_url.is_empty() {
            return Err(ConfigValidationError::MissingRedisUrl);
        }

        if config.server.request_timeout == 0 {
            return Err(ConfigValidationError::InvalidRequestTimeout);
        }

        if config.cache.ttl_seconds == 0 {
            return Err(ConfigValidationError::InvalidTtl);
        }

        if config.cache.key_prefix.is_empty() || config.cache.key_prefix.contains(':') {
            return Err(ConfigValidationError::InvalidKeyPrefix(
                config.cache.key_prefix.clone(),
            ));
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("数据库连接 URL 未配置")]
    MissingDatabaseUrl,

    #[error("Redis 连接 URL 未配置")]
    MissingRedisUrl,

    #[error("请求超时无效，必须大于 0")]
    InvalidRequestTimeout,

    #[error("缓存过期时间无效，必须大于 0")]
    InvalidTtl,

    #[error("缓存键前缀无效: {0:?}")]
    InvalidKeyPrefix(String),
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.yaml")
}

//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了缓存系统的配置结构和解析逻辑。

use crate::catalog::EntityKind;
use crate::error::{CacheError, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const CONFIG_VERSION: u32 = 1;

/// TTL 上限：30 天
const MAX_TTL_SECS: u64 = 86400 * 30;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub config_version: Option<u32>,
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// 未配置数据库时使用进程内仓储
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// 按实体类型名称覆盖的配置
    #[serde(default)]
    pub entities: HashMap<String, EntityConfig>,
}

/// 全局配置
///
/// 定义适用于所有实体的默认配置
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct GlobalConfig {
    /// 默认的缓存过期时间（秒）
    pub default_ttl: u64,
    /// 序列化类型
    pub serialization: SerializationType,
    /// 是否压缩缓存载荷
    pub compression: bool,
    /// 版本号是否使用原子自增
    pub atomic_versions: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_ttl: 600,
            serialization: SerializationType::Json,
            compression: false,
            atomic_versions: false,
        }
    }
}

/// 序列化类型枚举
#[derive(Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SerializationType {
    /// JSON序列化
    #[default]
    Json,
}

/// 缓存后端类型
#[derive(Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// 进程内缓存
    #[default]
    Memory,
    /// Redis 共享缓存
    Redis,
}

/// 缓存存储配置
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: BackendType,
    pub memory: MemoryConfig,
    pub redis: RedisConfig,
}

/// 内存缓存配置
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct MemoryConfig {
    /// 最大条目数
    pub max_capacity: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10000,
        }
    }
}

/// Redis 配置
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct RedisConfig {
    /// 连接字符串
    pub connection_string: SecretString,
    /// 连接超时时间（毫秒）
    pub connection_timeout_ms: u64,
    /// 命令执行超时时间（毫秒）
    pub command_timeout_ms: u64,
    /// 是否启用 TLS
    pub enable_tls: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            connection_string: SecretString::new("redis://localhost:6379".to_string().into()),
            connection_timeout_ms: 5000,
            command_timeout_ms: 3000,
            enable_tls: false,
        }
    }
}

/// 数据库配置
#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    /// 数据库连接地址，如 `postgres://...`、`sqlite::memory:`
    pub url: SecretString,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// 启动时创建缺失的表
    #[serde(default)]
    pub create_schema: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

/// 单个实体的配置
#[derive(Deserialize, Clone, Debug, Default)]
pub struct EntityConfig {
    /// 缓存过期时间（秒），可覆盖全局配置
    pub ttl: Option<u64>,
}

impl Config {
    /// 从 TOML 文件加载并验证配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        content.parse::<Config>().map_err(|e| match e {
            CacheError::Config(msg) => CacheError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// 指定实体的缓存过期时间
    pub fn ttl_for(&self, entity: &str) -> Duration {
        let secs = self
            .entities
            .get(&entity.to_ascii_lowercase())
            .and_then(|e| e.ttl)
            .unwrap_or(self.global.default_ttl);
        Duration::from_secs(secs)
    }

    /// 验证配置
    ///
    /// 检查配置的有效性，确保所有值都在合理范围内
    pub fn validate(&self) -> std::result::Result<(), String> {
        // 验证配置版本
        if let Some(version) = &self.config_version {
            if *version > CONFIG_VERSION {
                return Err(format!(
                    "Configuration version {} is not supported. Current version is {}.",
                    version, CONFIG_VERSION
                ));
            }
        }

        // 验证全局配置
        if self.global.default_ttl == 0 {
            return Err("Global default_ttl cannot be zero".to_string());
        }

        if self.global.default_ttl > MAX_TTL_SECS {
            return Err("Global default_ttl cannot exceed 30 days (2592000 seconds)".to_string());
        }

        if self.global.compression && !cfg!(feature = "compression") {
            return Err("Compression requested but the 'compression' feature is disabled".to_string());
        }

        // 验证缓存后端配置
        if self.cache.memory.max_capacity == 0 {
            return Err("Memory max_capacity cannot be zero".to_string());
        }

        if self.cache.backend == BackendType::Redis {
            let redis = &self.cache.redis;
            if !(100..=30000).contains(&redis.connection_timeout_ms) {
                return Err("Redis connection_timeout_ms must be between 100 and 30000 ms".to_string());
            }
            if !(100..=60000).contains(&redis.command_timeout_ms) {
                return Err("Redis command_timeout_ms must be between 100 and 60000 ms".to_string());
            }
        }

        if let Some(database) = &self.database {
            if database.max_connections == 0 {
                return Err("Database max_connections cannot be zero".to_string());
            }
        }

        // 验证实体配置
        for (name, entity) in &self.entities {
            if !EntityKind::ALL.iter().any(|kind| kind.entity_name() == name.as_str()) {
                return Err(format!(
                    "Unknown entity '{}', expected one of: categories, services, stories",
                    name
                ));
            }

            if let Some(ttl) = entity.ttl {
                if ttl == 0 {
                    return Err(format!("Entity '{}' TTL cannot be zero", name));
                }
                if ttl > MAX_TTL_SECS {
                    return Err(format!("Entity '{}' TTL cannot exceed 30 days", name));
                }
            }
        }

        Ok(())
    }

    /// 实体名称统一为小写
    fn normalize_entities(&mut self) -> std::result::Result<(), String> {
        let entities = std::mem::take(&mut self.entities);
        for (name, entity) in entities {
            let key = name.to_ascii_lowercase();
            if self.entities.insert(key.clone(), entity).is_some() {
                return Err(format!("Entity '{}' is configured more than once", key));
            }
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(s).map_err(|e| CacheError::Config(format!("invalid TOML: {}", e)))?;
        config.normalize_entities().map_err(CacheError::Config)?;
        config.validate().map_err(CacheError::Config)?;
        Ok(config)
    }
}

//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了基于 Redis 的共享缓存存储。多个进程共享同一 Redis 时，
//! 键布局即为进程间的契约。

use super::CacheStore;
use crate::config::RedisConfig;
use crate::error::{CacheError, Result};
use crate::serialization::SerializerEnum;
use crate::utils::redaction::redact_connection_string;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};
use secrecy::ExposeSecret;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

/// Redis 缓存存储
///
/// 每条命令都受 `command_timeout_ms` 约束，超时以 [`CacheError::Timeout`] 返回，
/// 不会被当作缓存未命中。
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
    serializer: SerializerEnum,
    command_timeout: Duration,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

impl RedisStore {
    /// 连接 Redis 并创建缓存存储
    ///
    /// # 参数
    ///
    /// * `config` - Redis 配置
    /// * `serializer` - 序列化器
    ///
    /// # 返回值
    ///
    /// 返回新的 RedisStore 实例或错误
    #[instrument(skip(config, serializer), level = "info", name = "init_redis_store")]
    pub async fn connect(config: &RedisConfig, serializer: SerializerEnum) -> Result<Self> {
        let raw = config.connection_string.expose_secret();
        let connection_string = if config.enable_tls && !raw.starts_with("rediss://") {
            raw.replace("redis://", "rediss://")
        } else {
            raw.to_string()
        };

        let client = Client::open(connection_string.as_str())?;
        let manager = match timeout(
            Duration::from_millis(config.connection_timeout_ms),
            client.get_connection_manager(),
        )
        .await
        {
            Ok(res) => res?,
            Err(_) => {
                return Err(CacheError::Timeout(format!(
                    "Connection timed out after {}ms. Target: {}",
                    config.connection_timeout_ms,
                    redact_connection_string(&connection_string)
                )));
            }
        };

        info!(
            "Connected to Redis at {}",
            redact_connection_string(&connection_string)
        );
        Ok(Self {
            manager,
            serializer,
            command_timeout: Duration::from_millis(config.command_timeout_ms),
        })
    }

    /// 在命令超时约束下执行
    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match timeout(self.command_timeout, fut).await {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => Err(CacheError::Timeout(format!(
                "Redis {} timed out after {}ms",
                op,
                self.command_timeout.as_millis()
            ))),
        }
    }

    /// 检查连接
    #[instrument(skip(self), level = "debug")]
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: String = self
            .bounded("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    #[instrument(skip(self), level = "debug")]
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.manager.clone();
        let value: Option<Vec<u8>> = self
            .bounded("GET", redis::cmd("GET").arg(key).query_async(&mut conn))
            .await?;
        debug!("Redis get: key={}, found={}", key, value.is_some());
        Ok(value)
    }

    #[instrument(skip(self, value), level = "debug", fields(value_len = value.len()))]
    async fn set_bytes(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.manager.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            // PX 需要至少 1ms
            cmd.arg("PX").arg(ttl.as_millis().max(1) as u64);
        }
        let _: () = self.bounded("SET", cmd.query_async(&mut conn)).await?;
        debug!("Redis set: key={}, ttl={:?}", key, ttl);
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn remove(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: i64 = self
            .bounded("DEL", redis::cmd("DEL").arg(key).query_async(&mut conn))
            .await?;
        debug!("Redis remove: key={}", key);
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn remove_by_pattern(&self, pattern: &str) -> Result<u64> {
        let mut conn = self.manager.clone();
        let mut cursor = 0u64;
        let mut removed = 0u64;
        loop {
            let (next_cursor, keys): (u64, Vec<String>) = self
                .bounded(
                    "SCAN",
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(1000)
                        .query_async(&mut conn),
                )
                .await?;

            if !keys.is_empty() {
                let mut pipe = redis::pipe();
                for key in &keys {
                    pipe.del(key).ignore();
                }
                let _: () = self.bounded("DEL", pipe.query_async(&mut conn)).await?;
                removed += keys.len() as u64;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }
        debug!("Redis remove_by_pattern: pattern={}, removed={}", pattern, removed);
        Ok(removed)
    }

    #[instrument(skip(self), level = "debug")]
    async fn increment(&self, key: &str) -> Result<u64> {
        let mut conn = self.manager.clone();
        let value: i64 = self
            .bounded("INCR", redis::cmd("INCR").arg(key).query_async(&mut conn))
            .await?;
        u64::try_from(value)
            .map_err(|_| CacheError::Serialization(format!("negative counter at {}", key)))
    }

    fn serializer(&self) -> &SerializerEnum {
        &self.serializer
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

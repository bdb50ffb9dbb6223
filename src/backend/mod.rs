//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了键值缓存存储的接口，以及内存（Moka）和 Redis 两种实现。

pub mod memory;
pub mod redis_store;

use crate::error::{CacheError, Result};
use crate::serialization::{Serializer, SerializerEnum};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::instrument;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

/// 缓存存储特征
///
/// 面向不透明字节载荷的键值存储。`get_bytes` 返回 `Ok(None)` 表示键不存在，
/// `Err` 表示存储本身故障，两者不能混用。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// 获取缓存值
    ///
    /// # 参数
    ///
    /// * `key` - 缓存键
    ///
    /// # 返回值
    ///
    /// 返回缓存值，如果不存在或已过期则返回None
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// 设置缓存值
    ///
    /// # 参数
    ///
    /// * `key` - 缓存键
    /// * `value` - 缓存值
    /// * `ttl` - 过期时间，None表示永不过期
    async fn set_bytes(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// 删除缓存项，键不存在时同样返回成功
    async fn remove(&self, key: &str) -> Result<()>;

    /// 按 glob 模式批量删除缓存项
    ///
    /// # 返回值
    ///
    /// 返回删除的键数量
    async fn remove_by_pattern(&self, pattern: &str) -> Result<u64>;

    /// 原子自增
    ///
    /// 键不存在时视为 0，返回自增后的值。值以十进制文本保存，且不带过期时间。
    async fn increment(&self, _key: &str) -> Result<u64> {
        Err(CacheError::NotSupported("increment".to_string()))
    }

    /// 获取序列化器
    fn serializer(&self) -> &SerializerEnum;

    /// 后端名称，用于日志
    fn backend_name(&self) -> &'static str;
}

/// 缓存存储扩展特征
///
/// 在字节接口之上提供类型化的读写
#[async_trait]
pub trait CacheStoreExt: CacheStore {
    /// 获取缓存值（反序列化）
    #[instrument(skip(self), level = "debug")]
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.get_bytes(key).await? {
            Some(data) => Ok(Some(self.serializer().deserialize(&data)?)),
            None => Ok(None),
        }
    }

    /// 设置缓存值（序列化）
    #[instrument(skip(self, value), level = "debug")]
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let bytes = self.serializer().serialize(value)?;
        self.set_bytes(key, bytes, ttl).await
    }
}

impl<T: CacheStore + ?Sized> CacheStoreExt for T {}

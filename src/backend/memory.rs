//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了基于 Moka 的进程内缓存存储。

use super::CacheStore;
use crate::error::{CacheError, Result};
use crate::serialization::SerializerEnum;
use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use moka::Expiry;
use regex::Regex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// 带过期时间的缓存条目
#[derive(Clone)]
struct Entry {
    bytes: Vec<u8>,
    ttl: Duration,
}

/// 按条目自身的 TTL 过期，覆盖写入时重新计时
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// 进程内缓存存储
///
/// 带 TTL 的条目放在容量受限的 Moka 缓存中，由 Moka 负责过期和淘汰。
/// 不带 TTL 的条目（版本计数器）放在独立的表中，永不淘汰。
#[derive(Clone)]
pub struct MemoryStore {
    cache: Cache<String, Entry>,
    persistent: Arc<DashMap<String, Vec<u8>>>,
    serializer: SerializerEnum,
    incr_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.cache.entry_count())
            .field("persistent", &self.persistent.len())
            .finish()
    }
}

impl MemoryStore {
    /// 创建新的内存缓存存储
    ///
    /// # 参数
    ///
    /// * `capacity` - 带 TTL 条目的最大数量
    /// * `serializer` - 序列化器
    pub fn new(capacity: u64, serializer: SerializerEnum) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .expire_after(EntryExpiry)
                .build(),
            persistent: Arc::new(DashMap::new()),
            serializer,
            incr_lock: Arc::new(Mutex::new(())),
        }
    }

    /// 当前键是否存在且未过期
    pub async fn contains(&self, key: &str) -> bool {
        matches!(self.read(key).await, Some(_))
    }

    async fn read(&self, key: &str) -> Option<Vec<u8>> {
        if let Some(bytes) = self.persistent.get(key) {
            return Some(bytes.value().clone());
        }
        self.cache.get(key).await.map(|entry| entry.bytes)
    }

    /// 处理挂起的淘汰与过期任务
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

/// 将 glob 模式转换为正则表达式，支持 `*` 和 `?`
fn pattern_regex(pattern: &str) -> Result<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|e| CacheError::Backend(format!("invalid pattern {}: {}", pattern, e)))
}

#[async_trait]
impl CacheStore for MemoryStore {
    #[instrument(skip(self), level = "debug")]
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.read(key).await;
        debug!("Memory get: key={}, found={}", key, value.is_some());
        Ok(value)
    }

    #[instrument(skip(self, value), level = "debug", fields(value_len = value.len()))]
    async fn set_bytes(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        match ttl {
            Some(ttl) => {
                self.persistent.remove(key);
                self.cache
                    .insert(key.to_string(), Entry { bytes: value, ttl })
                    .await;
            }
            None => {
                self.cache.remove(key).await;
                self.persistent.insert(key.to_string(), value);
            }
        }
        debug!("Memory set: key={}, ttl={:?}", key, ttl);
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn remove(&self, key: &str) -> Result<()> {
        self.persistent.remove(key);
        self.cache.remove(key).await;
        debug!("Memory remove: key={}", key);
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn remove_by_pattern(&self, pattern: &str) -> Result<u64> {
        let matcher = pattern_regex(pattern)?;
        let before = self.persistent.len();
        self.persistent.retain(|key, _| !matcher.is_match(key));
        let mut removed = (before - self.persistent.len()) as u64;

        let keys: Vec<Arc<String>> = self
            .cache
            .iter()
            .filter(|(key, _)| matcher.is_match(key))
            .map(|(key, _)| key)
            .collect();
        for key in &keys {
            if self.cache.remove(key.as_str()).await.is_some() {
                removed += 1;
            }
        }
        debug!("Memory remove_by_pattern: pattern={}, removed={}", pattern, removed);
        Ok(removed)
    }

    #[instrument(skip(self), level = "debug")]
    async fn increment(&self, key: &str) -> Result<u64> {
        let _guard = self.incr_lock.lock().await;
        let current = match self.read(key).await {
            Some(bytes) => std::str::from_utf8(&bytes)
                .ok()
                .and_then(|text| text.trim().parse::<u64>().ok())
                .ok_or_else(|| {
                    CacheError::Serialization(format!("value at {} is not an integer", key))
                })?,
            None => 0,
        };
        let next = current + 1;
        // 计数器不带 TTL，与 Redis INCR 一致
        self.cache.remove(key).await;
        self.persistent
            .insert(key.to_string(), next.to_string().into_bytes());
        Ok(next)
    }

    fn serializer(&self) -> &SerializerEnum {
        &self.serializer
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

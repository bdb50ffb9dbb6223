//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了实体版本计数器，供轮询客户端判断数据是否发生变化。

use crate::backend::CacheStore;
use crate::error::{CacheError, Result};
use crate::keys::EntityKeys;
use crate::metrics::GLOBAL_METRICS;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// 版本跟踪器
///
/// 版本号以十进制文本保存在版本键下，不设置过期时间。首次读取时懒初始化为 0，
/// 每次成功的写操作恰好自增一次。
///
/// 默认的自增为“读-加一-写”，多个并发写者可能丢失一次自增；
/// 开启 `atomic` 后改用存储提供的原子自增（Redis `INCR`）。
#[derive(Clone)]
pub struct VersionTracker {
    store: Arc<dyn CacheStore>,
    keys: EntityKeys,
    atomic: bool,
}

impl std::fmt::Debug for VersionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionTracker")
            .field("entity", &self.keys.entity())
            .field("backend", &self.store.backend_name())
            .field("atomic", &self.atomic)
            .finish()
    }
}

fn parse_version(key: &str, bytes: &[u8]) -> Result<u64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|text| text.trim().parse::<u64>().ok())
        .ok_or_else(|| CacheError::Serialization(format!("version at {} is not an integer", key)))
}

impl VersionTracker {
    /// 创建版本跟踪器
    pub fn new(store: Arc<dyn CacheStore>, keys: EntityKeys) -> Self {
        Self {
            store,
            keys,
            atomic: false,
        }
    }

    /// 是否使用原子自增
    pub fn with_atomic_increment(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// 实体类型名称
    pub fn entity(&self) -> &str {
        self.keys.entity()
    }

    /// 读取当前版本，不存在时写入 0
    #[instrument(skip(self), level = "debug", fields(entity = %self.keys.entity()))]
    pub async fn get_version(&self) -> Result<u64> {
        let key = self.keys.version_key();
        match self.store.get_bytes(key).await? {
            Some(bytes) => {
                let version = parse_version(key, &bytes)?;
                debug!("Current version: {}", version);
                Ok(version)
            }
            None => {
                self.store.set_bytes(key, b"0".to_vec(), None).await?;
                debug!("Version initialized to 0");
                Ok(0)
            }
        }
    }

    /// 版本号加一并返回新值
    #[instrument(skip(self), level = "debug", fields(entity = %self.keys.entity()))]
    pub async fn increment(&self) -> Result<u64> {
        let key = self.keys.version_key();
        if self.atomic {
            match self.store.increment(key).await {
                Ok(version) => {
                    GLOBAL_METRICS.set_version(self.keys.entity(), version);
                    info!("Version increased to: {}", version);
                    return Ok(version);
                }
                Err(CacheError::NotSupported(_)) => {
                    debug!(
                        "{} store has no atomic increment, falling back to read-modify-write",
                        self.store.backend_name()
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let version = self.get_version().await? + 1;
        self.store
            .set_bytes(key, version.to_string().into_bytes(), None)
            .await?;
        GLOBAL_METRICS.set_version(self.keys.entity(), version);
        info!("Version increased to: {}", version);
        Ok(version)
    }

    /// 客户端版本与当前版本是否不同
    #[instrument(skip(self), level = "debug", fields(entity = %self.keys.entity()))]
    pub async fn has_changed(&self, client_version: u64) -> Result<bool> {
        let current = self.get_version().await?;
        let changed = client_version != current;
        if !changed {
            debug!(
                "No version change detected. Client version: {}",
                client_version
            );
        }
        Ok(changed)
    }

    /// 客户端已是最新版本时返回 [`CacheError::NotModified`]，否则返回当前版本
    pub async fn ensure_changed(&self, client_version: u64) -> Result<u64> {
        let current = self.get_version().await?;
        if client_version == current {
            return Err(CacheError::NotModified("No changes detected.".to_string()));
        }
        Ok(current)
    }
}

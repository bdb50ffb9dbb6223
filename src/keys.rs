//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 缓存键方案
//!
//! 每种实体类型拥有三类键：
//! - 集合键 `<entity>`
//! - 详情键 `<entity>:detailcache:<id>`
//! - 版本键 `<entity>:version`
//!
//! 多个进程共享同一缓存时，此布局是对外可见的契约。

use crate::error::{CacheError, Result};

const DETAIL_SEGMENT: &str = "detailcache";
const VERSION_SEGMENT: &str = "version";

/// 实体类型的缓存键集合
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKeys {
    entity: String,
    version: String,
}

impl EntityKeys {
    /// 根据实体类型名称构建键集合
    ///
    /// 名称被转换为小写；只允许 `[a-z0-9_-]`，以保证 `:` 分隔的各类键互不冲突。
    pub fn new(entity: &str) -> Result<Self> {
        let entity = entity.trim().to_lowercase();
        if entity.is_empty() {
            return Err(CacheError::Config("entity name cannot be empty".to_string()));
        }
        if let Some(bad) = entity
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(CacheError::Config(format!(
                "entity name '{}' contains invalid character '{}'",
                entity, bad
            )));
        }
        let version = format!("{}:{}", entity, VERSION_SEGMENT);
        Ok(Self { entity, version })
    }

    /// 实体类型名称（小写）
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// 集合键
    pub fn collection_key(&self) -> &str {
        &self.entity
    }

    /// 详情键
    pub fn detail_key(&self, id: i32) -> String {
        format!("{}:{}:{}", self.entity, DETAIL_SEGMENT, id)
    }

    /// 版本键
    pub fn version_key(&self) -> &str {
        &self.version
    }

    /// 匹配该实体全部详情键的 glob 模式
    pub fn detail_pattern(&self) -> String {
        format!("{}:{}:*", self.entity, DETAIL_SEGMENT)
    }
}

//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 目录实体：分类、服务、故事。

pub mod category;
pub mod service;
pub mod story;

use crate::entity::CatalogEntity;
use crate::error::CacheError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use category::{Category, CategoryRecord, CategoryUpdate, CategoryView, NewCategory};
pub use service::{NewService, Service, ServiceRecord, ServiceUpdate, ServiceView};
pub use story::{NewStory, Story, StoryRecord, StoryUpdate, StoryView};

/// 参与版本同步的实体类型
///
/// 顺序即同步接口返回结果的固定顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Service,
    Story,
    Category,
}

impl EntityKind {
    /// 规范顺序
    pub const ALL: [EntityKind; 3] = [EntityKind::Service, EntityKind::Story, EntityKind::Category];

    /// 模块名称
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Service => "service",
            EntityKind::Story => "story",
            EntityKind::Category => "category",
        }
    }

    /// 缓存键使用的实体类型名称
    pub fn entity_name(&self) -> &'static str {
        match self {
            EntityKind::Service => Service::NAME,
            EntityKind::Story => Story::NAME,
            EntityKind::Category => Category::NAME,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered || kind.entity_name() == lowered)
            .ok_or_else(|| CacheError::BadRequest(format!("unknown entity type '{}'", s)))
    }
}

//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 版本同步聚合器
//!
//! 对每种实体并发执行版本检查，并按固定顺序返回结果。

use crate::catalog::EntityKind;
use crate::error::{CacheError, Result};
use crate::version::VersionTracker;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// 客户端持有的各实体版本
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionCheckRequest {
    #[serde(default)]
    pub service_version: u64,
    #[serde(default)]
    pub story_version: u64,
    #[serde(default)]
    pub category_version: u64,
}

impl VersionCheckRequest {
    /// 转换为按实体类型索引的版本表
    pub fn to_map(&self) -> HashMap<EntityKind, u64> {
        HashMap::from([
            (EntityKind::Service, self.service_version),
            (EntityKind::Story, self.story_version),
            (EntityKind::Category, self.category_version),
        ])
    }
}

/// 单个实体的检查结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleVersion {
    pub module: EntityKind,
    pub has_changed: bool,
    pub version: u64,
}

/// 版本同步聚合器
#[derive(Debug, Clone)]
pub struct SyncAggregator {
    trackers: Vec<(EntityKind, VersionTracker)>,
}

impl SyncAggregator {
    /// 创建聚合器
    ///
    /// 传入顺序不影响结果顺序，结果总是按 [`EntityKind::ALL`] 排列；
    /// 未配置的实体类型不会出现在结果中。
    pub fn new(trackers: Vec<(EntityKind, VersionTracker)>) -> Self {
        let mut trackers = trackers;
        trackers.sort_by_key(|(kind, _)| EntityKind::ALL.iter().position(|k| k == kind));
        trackers.dedup_by_key(|(kind, _)| *kind);
        Self { trackers }
    }

    /// 已配置的实体类型
    pub fn kinds(&self) -> Vec<EntityKind> {
        self.trackers.iter().map(|(kind, _)| *kind).collect()
    }

    /// 检查三个固定实体的版本
    pub async fn check_versions(&self, request: &VersionCheckRequest) -> Result<Vec<ModuleVersion>> {
        self.check(&request.to_map()).await
    }

    /// 并发检查每种实体的版本
    ///
    /// 缺失的条目视为客户端版本 0。任一实体检查失败时，所有失败都会被记录，
    /// 并返回规范顺序中的第一个错误。
    #[instrument(skip(self, client_versions), level = "debug")]
    pub async fn check(&self, client_versions: &HashMap<EntityKind, u64>) -> Result<Vec<ModuleVersion>> {
        let checks = self.trackers.iter().map(|(kind, tracker)| {
            let client_version = client_versions.get(kind).copied().unwrap_or(0);
            async move {
                let has_changed = tracker.has_changed(client_version).await?;
                let version = tracker.get_version().await?;
                Ok::<_, CacheError>(ModuleVersion {
                    module: *kind,
                    has_changed,
                    version,
                })
            }
        });

        let outcomes = join_all(checks).await;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut first_error = None;
        for ((kind, _), outcome) in self.trackers.iter().zip(outcomes) {
            match outcome {
                Ok(module) => {
                    debug!(
                        "Version check {}: changed={}, version={}",
                        kind, module.has_changed, module.version
                    );
                    results.push(module);
                }
                Err(e) => {
                    warn!("Version check for {} failed: {}", kind, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}

//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了缓存引擎的指标收集功能。

use dashmap::DashMap;
use lazy_static::lazy_static;
use std::sync::Arc;

/// 指标收集器
#[derive(Clone, Debug, Default)]
pub struct Metrics {
    /// 请求总数统计
    /// key: "entity:tier:op:result"
    pub requests_total: Arc<DashMap<String, u64>>,
    /// 写操作统计
    /// key: "entity:op"
    pub mutations_total: Arc<DashMap<String, u64>>,
    /// 最近观测到的版本号
    pub versions: Arc<DashMap<String, u64>>,
}

lazy_static! {
    /// 全局指标实例
    pub static ref GLOBAL_METRICS: Metrics = Metrics::default();
}

impl Metrics {
    /// 记录缓存请求
    ///
    /// # 参数
    ///
    /// * `entity` - 实体类型
    /// * `tier` - 缓存层（collection/detail）
    /// * `op` - 操作类型
    /// * `result` - 操作结果（hit/miss）
    pub fn record_request(&self, entity: &str, tier: &str, op: &str, result: &str) {
        let key = format!("{}:{}:{}:{}", entity, tier, op, result);
        *self.requests_total.entry(key).or_insert(0) += 1;
    }

    /// 记录写操作（create/update/delete）
    pub fn record_mutation(&self, entity: &str, op: &str) {
        let key = format!("{}:{}", entity, op);
        *self.mutations_total.entry(key).or_insert(0) += 1;
    }

    /// 记录版本号
    pub fn set_version(&self, entity: &str, version: u64) {
        self.versions.insert(entity.to_string(), version);
    }
}

/// 获取指标字符串
///
/// 将所有指标格式化为文本，用于监控系统采集
pub fn get_metrics_string() -> String {
    let metrics = &GLOBAL_METRICS;
    let mut output = String::new();

    let mut requests: Vec<(String, u64)> = metrics
        .requests_total
        .iter()
        .map(|e| (e.key().clone(), *e.value()))
        .collect();
    requests.sort();
    for (k, v) in requests {
        let parts: Vec<&str> = k.split(':').collect();
        if parts.len() == 4 {
            output.push_str(&format!(
                "cache_requests_total{{entity=\"{}\", tier=\"{}\", op=\"{}\", result=\"{}\"}} {}\n",
                parts[0], parts[1], parts[2], parts[3], v
            ));
        }
    }

    let mut mutations: Vec<(String, u64)> = metrics
        .mutations_total
        .iter()
        .map(|e| (e.key().clone(), *e.value()))
        .collect();
    mutations.sort();
    for (k, v) in mutations {
        if let Some((entity, op)) = k.split_once(':') {
            output.push_str(&format!(
                "cache_mutations_total{{entity=\"{}\", op=\"{}\"}} {}\n",
                entity, op, v
            ));
        }
    }

    let mut versions: Vec<(String, u64)> = metrics
        .versions
        .iter()
        .map(|e| (e.key().clone(), *e.value()))
        .collect();
    versions.sort();
    for (entity, v) in versions {
        output.push_str(&format!("cache_entity_version{{entity=\"{}\"}} {}\n", entity, v));
    }
    output
}

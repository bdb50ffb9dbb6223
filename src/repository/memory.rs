//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 基于 DashMap 的内存仓储，用于测试和无数据库运行。

use super::{CategoryReferences, Repository};
use crate::catalog::Service;
use crate::entity::CatalogEntity;
use crate::error::{CacheError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument};

type Enricher<R> = Arc<dyn Fn(&mut R) + Send + Sync>;

/// 内存仓储
///
/// 记录读写次数，便于验证缓存命中时没有回源。
pub struct MemoryRepository<E: CatalogEntity> {
    rows: DashMap<i32, E::Record>,
    next_id: AtomicI32,
    reads: AtomicUsize,
    writes: AtomicUsize,
    enricher: Option<Enricher<E::Record>>,
}

impl<E: CatalogEntity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CatalogEntity> std::fmt::Debug for MemoryRepository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRepository")
            .field("entity", &E::NAME)
            .field("rows", &self.rows.len())
            .finish()
    }
}

impl<E: CatalogEntity> MemoryRepository<E> {
    /// 创建空仓储，主键从 1 开始分配
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI32::new(1),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            enricher: None,
        }
    }

    /// 指定下一个分配的主键
    pub fn with_next_id(self, id: i32) -> Self {
        self.next_id.store(id, Ordering::SeqCst);
        self
    }

    /// 在读出记录时补全关联字段（模拟关联查询）
    pub fn with_enricher(mut self, enricher: impl Fn(&mut E::Record) + Send + Sync + 'static) -> Self {
        self.enricher = Some(Arc::new(enricher));
        self
    }

    /// 直接写入一条记录，不计入读写次数
    pub fn seed(&self, mut record: E::Record) -> E::Record {
        let id = E::record_id(&record);
        let id = if id > 0 {
            self.next_id.fetch_max(id + 1, Ordering::SeqCst);
            id
        } else {
            self.next_id.fetch_add(1, Ordering::SeqCst)
        };
        E::set_record_id(&mut record, id);
        self.rows.insert(id, record.clone());
        record
    }

    /// 同步读取记录快照
    pub fn snapshot(&self, id: i32) -> Option<E::Record> {
        self.rows.get(&id).map(|r| r.value().clone())
    }

    /// 全部记录快照
    pub fn records(&self) -> Vec<E::Record> {
        let mut records: Vec<E::Record> = self.rows.iter().map(|r| r.value().clone()).collect();
        records.sort_by_key(|r| E::record_id(r));
        records
    }

    /// 读操作次数
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// 写操作次数
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn enrich(&self, mut record: E::Record) -> E::Record {
        if let Some(enricher) = &self.enricher {
            enricher(&mut record);
        }
        record
    }
}

#[async_trait]
impl<E: CatalogEntity> Repository<E> for MemoryRepository<E> {
    #[instrument(skip(self), level = "debug", fields(entity = E::NAME))]
    async fn list(&self) -> Result<Vec<E::Record>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records()
            .into_iter()
            .map(|r| self.enrich(r))
            .collect())
    }

    #[instrument(skip(self), level = "debug", fields(entity = E::NAME))]
    async fn get_by_id(&self, id: i32) -> Result<Option<E::Record>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot(id).map(|r| self.enrich(r)))
    }

    #[instrument(skip(self, record), level = "debug", fields(entity = E::NAME))]
    async fn create(&self, mut record: E::Record) -> Result<E::Record> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        E::set_record_id(&mut record, id);
        self.rows.insert(id, record.clone());
        debug!("Memory repository created id={}", id);
        Ok(self.enrich(record))
    }

    #[instrument(skip(self, record), level = "debug", fields(entity = E::NAME))]
    async fn update(&self, record: E::Record) -> Result<E::Record> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let id = E::record_id(&record);
        match self.rows.get_mut(&id) {
            Some(mut row) => {
                *row = record.clone();
            }
            None => {
                return Err(CacheError::NotFound(format!(
                    "{} with id {} not found",
                    E::LABEL,
                    id
                )))
            }
        }
        Ok(self.enrich(record))
    }

    #[instrument(skip(self, record), level = "debug", fields(entity = E::NAME))]
    async fn delete(&self, record: &E::Record) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.rows.remove(&E::record_id(record));
        Ok(())
    }
}

#[async_trait]
impl CategoryReferences for MemoryRepository<Service> {
    async fn count_services(&self, category_id: i32) -> Result<u64> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.value().category_id == category_id)
            .count() as u64)
    }
}

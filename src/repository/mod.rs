//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 数据仓储接口
//!
//! 缓存引擎只通过这里的能力集合访问关系型存储，软删除、时间戳等细节由实现自行处理。

pub mod memory;

use crate::entity::CatalogEntity;
use crate::error::Result;
use async_trait::async_trait;

pub use memory::MemoryRepository;

/// 单个实体类型的仓储能力集合
#[async_trait]
pub trait Repository<E: CatalogEntity>: Send + Sync {
    /// 按主键升序列出全部未删除记录
    async fn list(&self) -> Result<Vec<E::Record>>;

    /// 按主键读取记录，不存在时返回None
    async fn get_by_id(&self, id: i32) -> Result<Option<E::Record>>;

    /// 持久化新记录，返回带有生成主键的记录
    async fn create(&self, record: E::Record) -> Result<E::Record>;

    /// 持久化更新，返回存储中的最新记录
    async fn update(&self, record: E::Record) -> Result<E::Record>;

    /// 删除记录
    async fn delete(&self, record: &E::Record) -> Result<()>;
}

/// 分类被服务引用情况的查询能力
#[async_trait]
pub trait CategoryReferences: Send + Sync {
    /// 引用指定分类的未删除服务数量
    async fn count_services(&self, category_id: i32) -> Result<u64>;
}

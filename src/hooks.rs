//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 写操作前的跨实体校验钩子。

use crate::catalog::{Category, CategoryView, NewService, Service, ServiceUpdate};
use crate::entity::CatalogEntity;
use crate::error::{CacheError, Result};
use crate::repository::{CategoryReferences, Repository};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// 实体写操作钩子
///
/// 钩子在存储写入之前运行；返回错误时引擎不会写存储、不会写缓存，也不会自增版本。
#[async_trait]
pub trait EntityHooks<E: CatalogEntity>: Send + Sync {
    /// 创建前
    async fn before_create(&self, _input: &E::Create) -> Result<()> {
        Ok(())
    }

    /// 更新前
    async fn before_update(&self, _input: &E::Update) -> Result<()> {
        Ok(())
    }

    /// 删除前，参数为待删除记录的当前视图
    async fn before_delete(&self, _existing: &E::View) -> Result<()> {
        Ok(())
    }
}

/// 不做任何校验
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl<E: CatalogEntity> EntityHooks<E> for NoHooks {}

/// 服务引用的分类必须存在
pub struct CategoryMustExist {
    categories: Arc<dyn Repository<Category>>,
}

impl CategoryMustExist {
    pub fn new(categories: Arc<dyn Repository<Category>>) -> Self {
        Self { categories }
    }

    async fn check(&self, category_id: i32) -> Result<()> {
        if self.categories.get_by_id(category_id).await?.is_none() {
            warn!("Referenced category {} does not exist", category_id);
            return Err(CacheError::NotFound(format!(
                "{} with id {} not found",
                Category::LABEL,
                category_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityHooks<Service> for CategoryMustExist {
    async fn before_create(&self, input: &NewService) -> Result<()> {
        self.check(input.category_id).await
    }

    async fn before_update(&self, input: &ServiceUpdate) -> Result<()> {
        self.check(input.category_id).await
    }
}

/// 仍被服务引用的分类不能删除
pub struct CategoryNotReferenced {
    references: Arc<dyn CategoryReferences>,
}

impl CategoryNotReferenced {
    pub fn new(references: Arc<dyn CategoryReferences>) -> Self {
        Self { references }
    }
}

#[async_trait]
impl EntityHooks<Category> for CategoryNotReferenced {
    async fn before_delete(&self, existing: &CategoryView) -> Result<()> {
        let count = self.references.count_services(existing.id).await?;
        if count > 0 {
            warn!(
                "Category {} is referenced by {} services, refusing delete",
                existing.id, count
            );
            return Err(CacheError::Conflict(
                "This category is used by one or more services and cannot be deleted."
                    .to_string(),
            ));
        }
        Ok(())
    }
}

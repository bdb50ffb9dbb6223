//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块实现了实体缓存引擎：旁路读取、写时失效和版本自增。
//!
//! 每种实体有两个相互独立的缓存层：集合层保存完整列表，详情层按主键保存单条视图。
//! 详情读取不查询集合层，两层各自填充、各自失效。

use crate::backend::{CacheStore, CacheStoreExt};
use crate::entity::CatalogEntity;
use crate::error::{CacheError, Result};
use crate::hooks::{EntityHooks, NoHooks};
use crate::keys::EntityKeys;
use crate::metrics::GLOBAL_METRICS;
use crate::repository::Repository;
use crate::version::VersionTracker;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// 实体缓存引擎
///
/// 读路径先查缓存，未命中时回源仓储并写回缓存；写路径先写仓储，
/// 再刷新或删除相关缓存键，最后将版本号加一。
///
/// 缓存存储故障不会被当作未命中处理，而是原样返回给调用方。
pub struct EntityCache<E: CatalogEntity> {
    keys: EntityKeys,
    repository: Arc<dyn Repository<E>>,
    store: Arc<dyn CacheStore>,
    tracker: VersionTracker,
    hooks: Arc<dyn EntityHooks<E>>,
    ttl: Duration,
}

impl<E: CatalogEntity> Clone for EntityCache<E> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            repository: self.repository.clone(),
            store: self.store.clone(),
            tracker: self.tracker.clone(),
            hooks: self.hooks.clone(),
            ttl: self.ttl,
        }
    }
}

impl<E: CatalogEntity> std::fmt::Debug for EntityCache<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache")
            .field("entity", &E::NAME)
            .field("backend", &self.store.backend_name())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<E: CatalogEntity> EntityCache<E> {
    /// 创建实体缓存引擎
    ///
    /// # 参数
    ///
    /// * `repository` - 实体仓储
    /// * `store` - 缓存存储，版本号也保存在其中
    /// * `ttl` - 集合与详情缓存的过期时间
    pub fn new(
        repository: Arc<dyn Repository<E>>,
        store: Arc<dyn CacheStore>,
        ttl: Duration,
    ) -> Result<Self> {
        if ttl.is_zero() {
            return Err(CacheError::Config(format!(
                "ttl for {} must be greater than zero",
                E::NAME
            )));
        }
        let keys = EntityKeys::new(E::NAME)?;
        let tracker = VersionTracker::new(store.clone(), keys.clone());
        Ok(Self {
            keys,
            repository,
            store,
            tracker,
            hooks: Arc::new(NoHooks),
            ttl,
        })
    }

    /// 设置写操作钩子
    pub fn with_hooks(mut self, hooks: Arc<dyn EntityHooks<E>>) -> Self {
        self.hooks = hooks;
        self
    }

    /// 是否使用原子版本自增
    pub fn with_atomic_versions(mut self, atomic: bool) -> Self {
        self.tracker = self.tracker.with_atomic_increment(atomic);
        self
    }

    /// 版本跟踪器
    pub fn tracker(&self) -> &VersionTracker {
        &self.tracker
    }

    /// 缓存键
    pub fn keys(&self) -> &EntityKeys {
        &self.keys
    }

    /// 缓存过期时间
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 获取全部记录及当前版本
    ///
    /// 仓储为空时返回 [`CacheError::NotFound`]，空列表不会被写入缓存。
    #[instrument(skip(self), level = "debug", fields(entity = E::NAME))]
    pub async fn list_all(&self) -> Result<(Vec<E::View>, u64)> {
        let key = self.keys.collection_key();
        if let Some(views) = self.store.get::<Vec<E::View>>(key).await? {
            GLOBAL_METRICS.record_request(E::NAME, "collection", "list", "hit");
            debug!("Collection cache hit, {} records", views.len());
            let version = self.tracker.get_version().await?;
            return Ok((views, version));
        }
        GLOBAL_METRICS.record_request(E::NAME, "collection", "list", "miss");
        debug!("Collection cache miss, loading from repository");

        let records = self.repository.list().await?;
        if records.is_empty() {
            return Err(CacheError::NotFound("no records of this type".to_string()));
        }
        let views: Vec<E::View> = records.iter().map(E::to_view).collect();
        self.store.set(key, &views, Some(self.ttl)).await?;
        debug!("Collection cache populated with {} records", views.len());

        let version = self.tracker.get_version().await?;
        Ok((views, version))
    }

    /// 分页读取，窗口取自集合缓存
    #[instrument(skip(self), level = "debug", fields(entity = E::NAME))]
    pub async fn list_page(&self, skip: usize, take: usize) -> Result<(Vec<E::View>, u64)> {
        let (views, version) = self.list_all().await?;
        let page = views.into_iter().skip(skip).take(take).collect();
        Ok((page, version))
    }

    /// 按主键读取
    #[instrument(skip(self), level = "debug", fields(entity = E::NAME))]
    pub async fn get_by_id(&self, id: i32) -> Result<E::View> {
        let key = self.keys.detail_key(id);
        if let Some(view) = self.store.get::<E::View>(&key).await? {
            GLOBAL_METRICS.record_request(E::NAME, "detail", "get", "hit");
            debug!("Detail cache hit for {}", key);
            return Ok(view);
        }
        GLOBAL_METRICS.record_request(E::NAME, "detail", "get", "miss");
        debug!("Detail cache miss for {}", key);

        let record = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| self.not_found(id))?;
        let view = E::to_view(&record);
        self.store.set(&key, &view, Some(self.ttl)).await?;
        Ok(view)
    }

    /// 创建记录
    ///
    /// 新视图写入详情缓存；集合缓存已预热时追加新视图，冷缓存保持为空，
    /// 由下一次 [`list_all`](Self::list_all) 完整回源。
    #[instrument(skip(self, input), level = "debug", fields(entity = E::NAME))]
    pub async fn create(&self, input: E::Create) -> Result<E::View> {
        self.hooks.before_create(&input).await?;

        let record = self.repository.create(E::new_record(&input)).await?;
        let view = E::to_view(&record);
        let id = E::view_id(&view);
        self.store
            .set(&self.keys.detail_key(id), &view, Some(self.ttl))
            .await?;

        let collection_key = self.keys.collection_key();
        if let Some(mut views) = self.store.get::<Vec<E::View>>(collection_key).await? {
            views.push(view.clone());
            self.store.set(collection_key, &views, Some(self.ttl)).await?;
            debug!("Appended id={} to warm collection cache", id);
        }

        let version = self.tracker.increment().await?;
        GLOBAL_METRICS.record_mutation(E::NAME, "create");
        info!("{} created: id={}, version={}", E::LABEL, id, version);
        Ok(view)
    }

    /// 更新记录
    ///
    /// 详情缓存写入新视图，集合缓存无条件删除。
    #[instrument(skip(self, input), level = "debug", fields(entity = E::NAME))]
    pub async fn update(&self, input: E::Update) -> Result<E::View> {
        let id = E::update_id(&input);
        let existing = self.get_by_id(id).await?;
        self.hooks.before_update(&input).await?;

        let mut record = E::record_from_view(&existing);
        E::apply_update(&mut record, &input);
        let record = self.repository.update(record).await?;
        let view = E::to_view(&record);

        self.store
            .set(&self.keys.detail_key(id), &view, Some(self.ttl))
            .await?;
        self.store.remove(self.keys.collection_key()).await?;

        let version = self.tracker.increment().await?;
        GLOBAL_METRICS.record_mutation(E::NAME, "update");
        info!("{} updated: id={}, version={}", E::LABEL, id, version);
        Ok(view)
    }

    /// 删除记录，详情与集合缓存都会被删除
    #[instrument(skip(self), level = "debug", fields(entity = E::NAME))]
    pub async fn delete(&self, id: i32) -> Result<()> {
        let existing = self.get_by_id(id).await?;
        self.hooks.before_delete(&existing).await?;

        self.repository
            .delete(&E::record_from_view(&existing))
            .await?;

        self.store.remove(&self.keys.detail_key(id)).await?;
        self.store.remove(self.keys.collection_key()).await?;

        let version = self.tracker.increment().await?;
        GLOBAL_METRICS.record_mutation(E::NAME, "delete");
        info!("{} deleted: id={}, version={}", E::LABEL, id, version);
        Ok(())
    }

    /// 当前版本
    pub async fn get_version(&self) -> Result<u64> {
        self.tracker.get_version().await
    }

    /// 客户端版本是否已过期
    pub async fn has_changed(&self, client_version: u64) -> Result<bool> {
        self.tracker.has_changed(client_version).await
    }

    /// 客户端版本已是最新时返回 [`CacheError::NotModified`]
    pub async fn ensure_changed(&self, client_version: u64) -> Result<u64> {
        self.tracker.ensure_changed(client_version).await
    }

    /// 清空该实体的集合与全部详情缓存，版本号保持不变
    ///
    /// # 返回值
    ///
    /// 返回删除的详情键数量
    #[instrument(skip(self), level = "debug", fields(entity = E::NAME))]
    pub async fn purge(&self) -> Result<u64> {
        self.store.remove(self.keys.collection_key()).await?;
        let removed = self
            .store
            .remove_by_pattern(&self.keys.detail_pattern())
            .await?;
        info!("Purged {} cache: {} detail entries", E::NAME, removed);
        Ok(removed)
    }

    fn not_found(&self, id: i32) -> CacheError {
        CacheError::NotFound(format!("{} with id {} not found", E::LABEL, id))
    }
}

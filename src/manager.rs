//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了目录管理器，负责根据配置组装缓存存储、仓储、引擎和同步聚合器。

use crate::backend::{CacheStore, MemoryStore, RedisStore};
use crate::catalog::{Category, EntityKind, Service, ServiceRecord, Story};
use crate::config::{BackendType, Config, SerializationType};
use crate::database::{
    self, SeaOrmCategoryRepository, SeaOrmServiceRepository, SeaOrmStoryRepository,
};
use crate::engine::EntityCache;
use crate::entity::CatalogEntity;
use crate::error::{CacheError, Result};
use crate::hooks::{CategoryMustExist, CategoryNotReferenced};
use crate::keys::EntityKeys;
use crate::repository::{CategoryReferences, MemoryRepository, Repository};
use crate::serialization::{JsonSerializer, SerializerEnum};
use crate::sync::SyncAggregator;
use crate::version::VersionTracker;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 三种实体的仓储集合
#[derive(Clone)]
pub struct Repositories {
    pub categories: Arc<dyn Repository<Category>>,
    pub services: Arc<dyn Repository<Service>>,
    pub stories: Arc<dyn Repository<Story>>,
    /// 分类引用查询，通常由服务仓储提供
    pub references: Arc<dyn CategoryReferences>,
}

impl Repositories {
    /// 进程内仓储，服务记录读取时从分类仓储补全分类名称
    pub fn in_memory() -> Self {
        let categories = Arc::new(MemoryRepository::<Category>::new());
        let lookup = categories.clone();
        let services = Arc::new(MemoryRepository::<Service>::new().with_enricher(
            move |record: &mut ServiceRecord| {
                record.category_name = lookup.snapshot(record.category_id).map(|c| c.name);
            },
        ));
        Self {
            categories,
            services: services.clone(),
            stories: Arc::new(MemoryRepository::<Story>::new()),
            references: services,
        }
    }

    /// Sea-ORM 仓储
    pub fn sea_orm(db: DatabaseConnection) -> Self {
        let services = Arc::new(SeaOrmServiceRepository::new(db.clone()));
        Self {
            categories: Arc::new(SeaOrmCategoryRepository::new(db.clone())),
            services: services.clone(),
            stories: Arc::new(SeaOrmStoryRepository::new(db)),
            references: services,
        }
    }
}

/// 根据配置创建序列化器
pub fn build_serializer(config: &Config) -> SerializerEnum {
    match config.global.serialization {
        SerializationType::Json if config.global.compression => {
            SerializerEnum::Json(JsonSerializer::with_compression())
        }
        SerializationType::Json => SerializerEnum::Json(JsonSerializer::new()),
    }
}

/// 根据配置创建缓存存储
#[instrument(skip(config), level = "info")]
pub async fn build_store(config: &Config) -> Result<Arc<dyn CacheStore>> {
    let serializer = build_serializer(config);
    let store: Arc<dyn CacheStore> = match config.cache.backend {
        BackendType::Memory => Arc::new(MemoryStore::new(
            config.cache.memory.max_capacity,
            serializer,
        )),
        BackendType::Redis => Arc::new(RedisStore::connect(&config.cache.redis, serializer).await?),
    };
    info!("Cache store ready: {}", store.backend_name());
    Ok(store)
}

/// 仅基于缓存存储构建同步聚合器，不需要数据库
pub fn build_sync(config: &Config, store: Arc<dyn CacheStore>) -> Result<SyncAggregator> {
    let trackers = EntityKind::ALL
        .into_iter()
        .map(|kind| -> Result<(EntityKind, VersionTracker)> {
            let keys = EntityKeys::new(kind.entity_name())?;
            let tracker = VersionTracker::new(store.clone(), keys)
                .with_atomic_increment(config.global.atomic_versions);
            Ok((kind, tracker))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SyncAggregator::new(trackers))
}

/// 目录管理器
///
/// 持有三种实体的缓存引擎，它们共享同一个缓存存储
#[derive(Clone)]
pub struct CatalogManager {
    store: Arc<dyn CacheStore>,
    categories: EntityCache<Category>,
    services: EntityCache<Service>,
    stories: EntityCache<Story>,
    sync: SyncAggregator,
}

impl std::fmt::Debug for CatalogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogManager")
            .field("backend", &self.store.backend_name())
            .field("categories", &self.categories)
            .field("services", &self.services)
            .field("stories", &self.stories)
            .finish()
    }
}

impl CatalogManager {
    /// 根据配置初始化
    ///
    /// 配置了数据库时使用 Sea-ORM 仓储，否则使用进程内仓储
    #[instrument(skip(config), level = "info")]
    pub async fn init(config: Config) -> Result<Self> {
        config.validate().map_err(CacheError::Config)?;

        let store = build_store(&config).await?;
        let repositories = match &config.database {
            Some(db_config) => Repositories::sea_orm(database::connect(db_config).await?),
            None => {
                warn!("No database configured, using in-memory repositories");
                Repositories::in_memory()
            }
        };
        Self::assemble(&config, store, repositories)
    }

    /// 用已有的存储与仓储组装管理器
    pub fn assemble(
        config: &Config,
        store: Arc<dyn CacheStore>,
        repositories: Repositories,
    ) -> Result<Self> {
        let atomic = config.global.atomic_versions;

        let categories = EntityCache::new(
            repositories.categories.clone(),
            store.clone(),
            config.ttl_for(Category::NAME),
        )?
        .with_hooks(Arc::new(CategoryNotReferenced::new(repositories.references)))
        .with_atomic_versions(atomic);

        let services = EntityCache::new(
            repositories.services,
            store.clone(),
            config.ttl_for(Service::NAME),
        )?
        .with_hooks(Arc::new(CategoryMustExist::new(repositories.categories)))
        .with_atomic_versions(atomic);

        let stories = EntityCache::new(
            repositories.stories,
            store.clone(),
            config.ttl_for(Story::NAME),
        )?
        .with_atomic_versions(atomic);

        let sync = SyncAggregator::new(vec![
            (EntityKind::Service, services.tracker().clone()),
            (EntityKind::Story, stories.tracker().clone()),
            (EntityKind::Category, categories.tracker().clone()),
        ]);

        info!(
            "CatalogManager assembled on {} backend (atomic_versions={})",
            store.backend_name(),
            atomic
        );
        Ok(Self {
            store,
            categories,
            services,
            stories,
            sync,
        })
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn categories(&self) -> &EntityCache<Category> {
        &self.categories
    }

    pub fn services(&self) -> &EntityCache<Service> {
        &self.services
    }

    pub fn stories(&self) -> &EntityCache<Story> {
        &self.stories
    }

    pub fn sync(&self) -> &SyncAggregator {
        &self.sync
    }

    /// 各实体当前版本，按固定顺序
    pub async fn versions(&self) -> Result<Vec<(EntityKind, u64)>> {
        let mut versions = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            let version = match kind {
                EntityKind::Service => self.services.get_version().await?,
                EntityKind::Story => self.stories.get_version().await?,
                EntityKind::Category => self.categories.get_version().await?,
            };
            versions.push((kind, version));
        }
        Ok(versions)
    }

    /// 清空指定实体的缓存
    pub async fn purge(&self, kind: EntityKind) -> Result<u64> {
        match kind {
            EntityKind::Service => self.services.purge().await,
            EntityKind::Story => self.stories.purge().await,
            EntityKind::Category => self.categories.purge().await,
        }
    }
}

//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了测试的通用工具函数和设置。

#![allow(dead_code)]

use chrono::Utc;
use smartcache::backend::{CacheStore, MemoryStore};
use smartcache::catalog::{
    Category, CategoryRecord, Service, ServiceRecord, Story, StoryRecord,
};
use smartcache::repository::MemoryRepository;
use smartcache::serialization::SerializerEnum;
use smartcache::{CatalogManager, Config, Repositories};
use std::sync::{Arc, Once};
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

pub fn setup_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_span_events(FmtSpan::CLOSE)
            .with_env_filter(EnvFilter::new("debug"))
            .try_init()
            .ok();
    });
}

/// 默认缓存过期时间
pub const TTL: Duration = Duration::from_secs(600);

/// 新建内存缓存存储
pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new(10_000, SerializerEnum::default()))
}

/// 内存目录：暴露具体仓储类型，便于断言读写次数
pub struct MemoryCatalog {
    pub store: Arc<MemoryStore>,
    pub categories: Arc<MemoryRepository<Category>>,
    pub services: Arc<MemoryRepository<Service>>,
    pub stories: Arc<MemoryRepository<Story>>,
    pub manager: CatalogManager,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, MemoryRepository::new())
    }

    /// 分类主键从指定值开始分配
    pub fn with_category_ids_from(next_id: i32) -> Self {
        Self::build(Config::default(), MemoryRepository::new().with_next_id(next_id))
    }

    fn build(config: Config, categories: MemoryRepository<Category>) -> Self {
        setup_logging();
        let store = memory_store();
        let categories = Arc::new(categories);
        let lookup = categories.clone();
        let services = Arc::new(MemoryRepository::<Service>::new().with_enricher(
            move |record: &mut ServiceRecord| {
                record.category_name = lookup.snapshot(record.category_id).map(|c| c.name);
            },
        ));
        let stories = Arc::new(MemoryRepository::<Story>::new());

        let repositories = Repositories {
            categories: categories.clone(),
            services: services.clone(),
            stories: stories.clone(),
            references: services.clone(),
        };
        let shared: Arc<dyn CacheStore> = store.clone();
        let manager = CatalogManager::assemble(&config, shared, repositories)
            .expect("failed to assemble catalog");

        Self {
            store,
            categories,
            services,
            stories,
            manager,
        }
    }
}

pub fn category_record(id: i32, name: &str) -> CategoryRecord {
    CategoryRecord {
        id,
        name: name.to_string(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn service_record(id: i32, name: &str, category_id: i32) -> ServiceRecord {
    ServiceRecord {
        id,
        name: name.to_string(),
        description: format!("{} description", name),
        is_active: true,
        price: 49.5,
        category_id,
        category_name: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn story_record(id: i32, title: &str) -> StoryRecord {
    StoryRecord {
        id,
        title: title.to_string(),
        content: format!("{} content", title),
        image_url: format!("https://img.example.com/{}.png", id),
        is_published: true,
        created_at: Utc::now(),
        updated_at: None,
    }
}

/// 检查Redis是否可用
pub async fn is_redis_available() -> bool {
    if std::env::var("SMARTCACHE_SKIP_REDIS_TESTS").is_ok() {
        return false;
    }
    let client = match redis::Client::open(redis_url().as_str()) {
        Ok(c) => c,
        Err(_) => return false,
    };
    matches!(
        tokio::time::timeout(
            Duration::from_secs(1),
            client.get_multiplexed_async_connection(),
        )
        .await,
        Ok(Ok(_))
    )
}

pub fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

/// 生成唯一的实体名称，避免共享 Redis 时测试间互相干扰
pub fn unique_entity(base: &str) -> String {
    format!("{}_{}", base, uuid::Uuid::new_v4().simple())
}

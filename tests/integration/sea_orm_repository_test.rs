//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! Sea-ORM 仓储集成测试（SQLite 内存数据库）

use smartcache::backend::CacheStore;
use smartcache::catalog::{
    Category, CategoryUpdate, NewCategory, NewService, NewStory, Service, ServiceUpdate, Story,
};
use smartcache::config::DatabaseConfig;
use smartcache::database::{
    self, SeaOrmCategoryRepository, SeaOrmServiceRepository, SeaOrmStoryRepository,
};
use smartcache::entity::CatalogEntity;
use smartcache::repository::{CategoryReferences, Repository};
use smartcache::{CacheError, CatalogManager, Config, Repositories};
use std::sync::Arc;

#[path = "../common/mod.rs"]
mod common;

async fn connect() -> sea_orm::DatabaseConnection {
    common::setup_logging();
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string().into(),
        max_connections: 5,
        connect_timeout_ms: 5000,
        create_schema: true,
    };
    database::connect(&config)
        .await
        .expect("Failed to connect to sqlite")
}

#[tokio::test]
async fn test_category_crud_with_soft_delete() {
    let db = connect().await;
    let repo = SeaOrmCategoryRepository::new(db);

    let created = repo
        .create(Category::new_record(&NewCategory::new("Massage")))
        .await
        .unwrap();
    assert!(created.id > 0);
    assert!(created.updated_at.is_none());

    let mut record = created.clone();
    Category::apply_update(
        &mut record,
        &CategoryUpdate {
            id: created.id,
            name: "Massage & Spa".into(),
            is_active: false,
        },
    );
    let updated = repo.update(record).await.unwrap();
    assert_eq!(updated.name, "Massage & Spa");
    assert!(!updated.is_active);
    assert!(updated.updated_at.is_some());

    repo.delete(&updated).await.unwrap();
    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    assert!(repo.list().await.unwrap().is_empty());

    // 已软删除的记录不能再次更新或删除
    assert!(matches!(
        repo.update(updated.clone()).await,
        Err(CacheError::NotFound(_))
    ));
    assert!(matches!(
        repo.delete(&updated).await,
        Err(CacheError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_service_joins_category_name() {
    let db = connect().await;
    let categories = SeaOrmCategoryRepository::new(db.clone());
    let services = SeaOrmServiceRepository::new(db);

    let spa = categories
        .create(Category::new_record(&NewCategory::new("Spa")))
        .await
        .unwrap();
    let beauty = categories
        .create(Category::new_record(&NewCategory::new("Beauty")))
        .await
        .unwrap();

    let created = services
        .create(Service::new_record(&NewService {
            name: "Sauna".into(),
            description: "Finnish sauna".into(),
            is_active: true,
            price: 35.5,
            category_id: spa.id,
        }))
        .await
        .unwrap();
    assert_eq!(created.category_name.as_deref(), Some("Spa"));
    assert_eq!(created.price, 35.5);

    let mut record = created.clone();
    Service::apply_update(
        &mut record,
        &ServiceUpdate {
            id: created.id,
            name: "Sauna".into(),
            description: "Finnish sauna".into(),
            is_active: true,
            price: 40.0,
            category_id: beauty.id,
        },
    );
    let moved = services.update(record).await.unwrap();
    assert_eq!(moved.category_name.as_deref(), Some("Beauty"));

    assert_eq!(services.count_services(beauty.id).await.unwrap(), 1);
    assert_eq!(services.count_services(spa.id).await.unwrap(), 0);

    services.delete(&moved).await.unwrap();
    assert_eq!(services.count_services(beauty.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_story_list_ordered_by_id() {
    let db = connect().await;
    let repo = SeaOrmStoryRepository::new(db);

    for title in ["first", "second", "third"] {
        repo.create(Story::new_record(&NewStory {
            title: title.into(),
            content: format!("{} content", title),
            image_url: String::new(),
            is_published: true,
        }))
        .await
        .unwrap();
    }

    let list = repo.list().await.unwrap();
    let titles: Vec<&str> = list.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second", "third"]);
    assert!(list.windows(2).all(|w| w[0].id < w[1].id));
}

/// 引擎与 Sea-ORM 仓储组合：缓存命中不回源，删除守卫生效
#[tokio::test]
async fn test_engine_over_sea_orm() {
    let db = connect().await;
    let store = common::memory_store();
    let shared: Arc<dyn CacheStore> = store.clone();
    let manager =
        CatalogManager::assemble(&Config::default(), shared, Repositories::sea_orm(db)).unwrap();

    let category = manager
        .categories()
        .create(NewCategory::new("Wellness"))
        .await
        .unwrap();
    let service = manager
        .services()
        .create(NewService {
            name: "Yoga".into(),
            description: String::new(),
            is_active: true,
            price: 12.0,
            category_id: category.id,
        })
        .await
        .unwrap();
    assert_eq!(service.category_name.as_deref(), Some("Wellness"));

    assert!(matches!(
        manager.categories().delete(category.id).await,
        Err(CacheError::Conflict(_))
    ));

    manager.services().delete(service.id).await.unwrap();
    manager.categories().delete(category.id).await.unwrap();
    assert!(matches!(
        manager.categories().list_all().await,
        Err(CacheError::NotFound(_))
    ));

    let versions = manager.versions().await.unwrap();
    assert_eq!(
        versions.iter().map(|(_, v)| *v).collect::<Vec<_>>(),
        vec![2, 0, 2]
    );
}

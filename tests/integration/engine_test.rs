//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 实体缓存引擎集成测试

use smartcache::backend::CacheStore;
use smartcache::catalog::{
    CategoryUpdate, CategoryView, NewCategory, NewService, NewStory, ServiceUpdate, StoryUpdate,
    StoryView,
};
use smartcache::{CacheError, ErrorKind};

#[path = "../common/mod.rs"]
mod common;

use common::{category_record, service_record, story_record, MemoryCatalog};

fn new_service(name: &str, category_id: i32) -> NewService {
    NewService {
        name: name.to_string(),
        description: String::new(),
        is_active: true,
        price: 30.0,
        category_id,
    }
}

/// 创建分类后详情缓存已预热，读取不回源，版本为 1
#[tokio::test]
async fn test_create_warms_detail_cache() {
    let catalog = MemoryCatalog::with_category_ids_from(7);
    let categories = catalog.manager.categories();

    let created = categories.create(NewCategory::new("A")).await.unwrap();
    assert_eq!(created.id, 7);

    let reads_before = catalog.categories.reads();
    let fetched = categories.get_by_id(7).await.unwrap();
    assert_eq!(fetched.id, 7);
    assert_eq!(fetched.name, "A");
    assert_eq!(catalog.categories.reads(), reads_before);

    assert_eq!(categories.get_version().await.unwrap(), 1);
}

/// 空存储上的 list_all 返回 NotFound，且不会写入集合缓存
#[tokio::test]
async fn test_list_all_on_empty_store() {
    let catalog = MemoryCatalog::new();

    match catalog.manager.stories().list_all().await {
        Err(CacheError::NotFound(msg)) => assert_eq!(msg, "no records of this type"),
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(!catalog.store.contains("stories").await);
}

/// 连续两次读取返回相同视图，第二次来自缓存
#[tokio::test]
async fn test_idempotent_reads() {
    let catalog = MemoryCatalog::new();
    catalog.stories.seed(story_record(1, "Opening"));
    let stories = catalog.manager.stories();

    let first = stories.get_by_id(1).await.unwrap();
    let second = stories.get_by_id(1).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(catalog.stories.reads(), 1);

    let (list_a, _) = stories.list_all().await.unwrap();
    let (list_b, _) = stories.list_all().await.unwrap();
    assert_eq!(list_a, list_b);
    assert_eq!(catalog.stories.reads(), 2);
}

/// N 次顺序写操作后版本恰好增加 N
#[tokio::test]
async fn test_monotonic_version() {
    let catalog = MemoryCatalog::new();
    let stories = catalog.manager.stories();
    let before = stories.get_version().await.unwrap();

    let a = stories
        .create(NewStory {
            title: "A".into(),
            content: "a".into(),
            image_url: String::new(),
            is_published: false,
        })
        .await
        .unwrap();
    let b = stories
        .create(NewStory {
            title: "B".into(),
            content: "b".into(),
            image_url: String::new(),
            is_published: true,
        })
        .await
        .unwrap();
    stories
        .update(StoryUpdate {
            id: a.id,
            title: "A2".into(),
            content: "a2".into(),
            image_url: String::new(),
            is_published: true,
        })
        .await
        .unwrap();
    stories.delete(b.id).await.unwrap();

    assert_eq!(stories.get_version().await.unwrap(), before + 4);
}

/// has_changed(v) 当且仅当 v 与当前版本不同
#[tokio::test]
async fn test_change_detection() {
    let catalog = MemoryCatalog::new();
    let categories = catalog.manager.categories();

    for v in 0..3 {
        assert_eq!(categories.has_changed(v).await.unwrap(), v != 0);
    }
    categories.create(NewCategory::new("X")).await.unwrap();
    for v in 0..3 {
        assert_eq!(categories.has_changed(v).await.unwrap(), v != 1);
    }

    assert_eq!(categories.ensure_changed(0).await.unwrap(), 1);
    let err = categories.ensure_changed(1).await.unwrap_err();
    assert!(matches!(err, CacheError::NotModified(ref m) if m == "No changes detected."));
    assert_eq!(err.kind(), ErrorKind::NotModified);
    assert_eq!(err.kind().status_code(), 304);
}

/// 更新后 list_all 不再返回旧的集合缓存
#[tokio::test]
async fn test_update_invalidates_collection() {
    let catalog = MemoryCatalog::new();
    catalog.categories.seed(category_record(1, "Old"));
    catalog.categories.seed(category_record(2, "Other"));
    let categories = catalog.manager.categories();

    let (before, _) = categories.list_all().await.unwrap();
    assert_eq!(before[0].name, "Old");

    let updated = categories
        .update(CategoryUpdate {
            id: 1,
            name: "New".into(),
            is_active: false,
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "New");
    assert!(updated.updated_at.is_some());
    assert!(!catalog.store.contains("categories").await);

    let (after, version) = categories.list_all().await.unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].name, "New");
    assert!(!after[0].is_active);
    assert_eq!(version, 1);

    // 详情缓存写入了新视图
    let detail: Option<CategoryView> = catalog
        .store
        .get_bytes("categories:detailcache:1")
        .await
        .unwrap()
        .map(|bytes| serde_json::from_slice(&bytes).unwrap());
    assert_eq!(detail.unwrap().name, "New");
}

/// 删除后详情与集合缓存都被移除，list_all 从存储重新填充
#[tokio::test]
async fn test_delete_invalidates_both_tiers() {
    let catalog = MemoryCatalog::new();
    catalog.stories.seed(story_record(1, "Keep"));
    catalog.stories.seed(story_record(2, "Drop"));
    let stories = catalog.manager.stories();

    stories.list_all().await.unwrap();
    stories.get_by_id(2).await.unwrap();
    assert!(catalog.store.contains("stories:detailcache:2").await);

    stories.delete(2).await.unwrap();
    assert!(!catalog.store.contains("stories:detailcache:2").await);
    assert!(!catalog.store.contains("stories").await);

    let (after, version) = stories.list_all().await.unwrap();
    assert_eq!(after.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(version, 1);

    assert!(matches!(
        stories.get_by_id(2).await,
        Err(CacheError::NotFound(_))
    ));
}

/// 预热的集合缓存在创建时追加新视图，冷缓存保持为空
#[tokio::test]
async fn test_create_appends_only_to_warm_collection() {
    let catalog = MemoryCatalog::new();
    catalog.stories.seed(story_record(1, "First"));
    let stories = catalog.manager.stories();

    let cold = stories
        .create(NewStory {
            title: "Cold".into(),
            content: "c".into(),
            image_url: String::new(),
            is_published: true,
        })
        .await
        .unwrap();
    assert!(!catalog.store.contains("stories").await);

    let (warm, _) = stories.list_all().await.unwrap();
    assert_eq!(warm.len(), 2);
    let reads = catalog.stories.reads();

    let appended = stories
        .create(NewStory {
            title: "Warm".into(),
            content: "w".into(),
            image_url: String::new(),
            is_published: true,
        })
        .await
        .unwrap();

    let (list, version) = stories.list_all().await.unwrap();
    assert_eq!(catalog.stories.reads(), reads);
    let ids: Vec<i32> = list.iter().map(|s: &StoryView| s.id).collect();
    assert_eq!(ids, vec![1, cold.id, appended.id]);
    assert_eq!(version, 2);
}

/// 引用不存在分类的服务创建失败：不写仓储、不写缓存、不改版本
#[tokio::test]
async fn test_cross_entity_guard_on_create() {
    let catalog = MemoryCatalog::new();
    let services = catalog.manager.services();

    let err = services.create(new_service("Orphan", 42)).await.unwrap_err();
    assert!(matches!(err, CacheError::NotFound(ref m) if m == "Category with id 42 not found"));
    assert_eq!(err.kind().status_code(), 404);

    assert_eq!(catalog.services.writes(), 0);
    assert!(catalog.services.records().is_empty());
    assert!(!catalog.store.contains("services:detailcache:1").await);
    assert_eq!(services.get_version().await.unwrap(), 0);
}

/// 服务更新到不存在的分类同样被拒绝
#[tokio::test]
async fn test_cross_entity_guard_on_update() {
    let catalog = MemoryCatalog::new();
    catalog.categories.seed(category_record(1, "Spa"));
    catalog.services.seed(service_record(1, "Sauna", 1));
    let services = catalog.manager.services();

    let result = services
        .update(ServiceUpdate {
            id: 1,
            name: "Sauna".into(),
            description: String::new(),
            is_active: true,
            price: 10.0,
            category_id: 99,
        })
        .await;
    assert!(matches!(result, Err(CacheError::NotFound(_))));
    assert_eq!(catalog.services.writes(), 0);
    assert_eq!(services.get_version().await.unwrap(), 0);
}

/// 被服务引用的分类不能删除，两种实体的缓存与版本保持不变
#[tokio::test]
async fn test_delete_guard_on_referenced_category() {
    let catalog = MemoryCatalog::new();
    catalog.categories.seed(category_record(1, "Spa"));
    catalog.services.seed(service_record(1, "Sauna", 1));
    let categories = catalog.manager.categories();
    let services = catalog.manager.services();

    // 预热两种实体的缓存
    categories.list_all().await.unwrap();
    categories.get_by_id(1).await.unwrap();
    services.list_all().await.unwrap();
    let category_version = categories.get_version().await.unwrap();
    let service_version = services.get_version().await.unwrap();

    let err = categories.delete(1).await.unwrap_err();
    assert!(matches!(err, CacheError::Conflict(_)));
    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert_eq!(err.kind().status_code(), 400);

    assert!(catalog.categories.snapshot(1).is_some());
    assert_eq!(catalog.categories.writes(), 0);
    assert!(catalog.store.contains("categories").await);
    assert!(catalog.store.contains("categories:detailcache:1").await);
    assert!(catalog.store.contains("services").await);
    assert_eq!(categories.get_version().await.unwrap(), category_version);
    assert_eq!(services.get_version().await.unwrap(), service_version);

    // 服务删除后分类即可删除
    services.delete(1).await.unwrap();
    categories.delete(1).await.unwrap();
    assert_eq!(categories.get_version().await.unwrap(), category_version + 1);
}

/// 服务视图携带分类名称
#[tokio::test]
async fn test_service_view_carries_category_name() {
    let catalog = MemoryCatalog::new();
    let category = catalog
        .manager
        .categories()
        .create(NewCategory::new("Beauty"))
        .await
        .unwrap();
    let services = catalog.manager.services();
    let created = services
        .create(new_service("Facial", category.id))
        .await
        .unwrap();
    assert_eq!(created.category_name.as_deref(), Some("Beauty"));

    let (list, _) = services.list_all().await.unwrap();
    assert_eq!(list[0].category_name.as_deref(), Some("Beauty"));
}

/// 更新与删除不存在的记录返回 NotFound 且不改版本
#[tokio::test]
async fn test_missing_record_mutations() {
    let catalog = MemoryCatalog::new();
    let categories = catalog.manager.categories();

    let update = categories
        .update(CategoryUpdate {
            id: 5,
            name: "Ghost".into(),
            is_active: true,
        })
        .await;
    assert!(matches!(update, Err(CacheError::NotFound(ref m)) if m == "Category with id 5 not found"));
    assert!(matches!(
        categories.delete(5).await,
        Err(CacheError::NotFound(_))
    ));
    assert_eq!(categories.get_version().await.unwrap(), 0);
}

/// 分页读取共享集合缓存
#[tokio::test]
async fn test_list_page() {
    let catalog = MemoryCatalog::new();
    for id in 1..=10 {
        catalog.stories.seed(story_record(id, &format!("Story {}", id)));
    }
    let stories = catalog.manager.stories();

    let (page, version) = stories.list_page(3, 4).await.unwrap();
    assert_eq!(page.iter().map(|s| s.id).collect::<Vec<_>>(), vec![4, 5, 6, 7]);
    assert_eq!(version, 0);

    let (empty, _) = stories.list_page(20, 5).await.unwrap();
    assert!(empty.is_empty());
    assert_eq!(catalog.stories.reads(), 1);
}

/// purge 清空缓存但保留版本
#[tokio::test]
async fn test_manager_purge() {
    let catalog = MemoryCatalog::new();
    catalog.categories.seed(category_record(1, "A"));
    catalog.categories.seed(category_record(2, "B"));
    let categories = catalog.manager.categories();
    categories.create(NewCategory::new("C")).await.unwrap();
    categories.list_all().await.unwrap();
    categories.get_by_id(1).await.unwrap();

    let removed = catalog
        .manager
        .purge(smartcache::EntityKind::Category)
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert!(!catalog.store.contains("categories").await);
    assert_eq!(categories.get_version().await.unwrap(), 1);

    let (list, _) = categories.list_all().await.unwrap();
    assert_eq!(list.len(), 3);
}

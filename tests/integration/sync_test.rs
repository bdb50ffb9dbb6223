//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 版本同步集成测试

use smartcache::catalog::{NewCategory, NewStory};
use smartcache::{EntityKind, ModuleVersion, VersionCheckRequest};
use std::collections::HashMap;

#[path = "../common/mod.rs"]
mod common;

use common::MemoryCatalog;

fn module(module: EntityKind, has_changed: bool, version: u64) -> ModuleVersion {
    ModuleVersion {
        module,
        has_changed,
        version,
    }
}

/// 全新系统上所有版本为 0 且未变化
#[tokio::test]
async fn test_fresh_system_reports_no_changes() {
    let catalog = MemoryCatalog::new();

    let result = catalog
        .manager
        .sync()
        .check_versions(&VersionCheckRequest::default())
        .await
        .unwrap();

    assert_eq!(
        result,
        vec![
            module(EntityKind::Service, false, 0),
            module(EntityKind::Story, false, 0),
            module(EntityKind::Category, false, 0),
        ]
    );
    // 懒初始化写入了版本键
    assert!(catalog.store.contains("services:version").await);
    assert!(catalog.store.contains("stories:version").await);
    assert!(catalog.store.contains("categories:version").await);
}

/// 只有发生写操作的实体被报告为已变化
#[tokio::test]
async fn test_reports_changed_modules() {
    let catalog = MemoryCatalog::new();
    catalog
        .manager
        .categories()
        .create(NewCategory::new("A"))
        .await
        .unwrap();
    for title in ["one", "two"] {
        catalog
            .manager
            .stories()
            .create(NewStory {
                title: title.into(),
                content: title.into(),
                image_url: String::new(),
                is_published: true,
            })
            .await
            .unwrap();
    }

    let request = VersionCheckRequest {
        service_version: 0,
        story_version: 1,
        category_version: 1,
    };
    let result = catalog.manager.sync().check_versions(&request).await.unwrap();
    assert_eq!(
        result,
        vec![
            module(EntityKind::Service, false, 0),
            module(EntityKind::Story, true, 2),
            module(EntityKind::Category, false, 1),
        ]
    );

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json[1]["module"], "story");
    assert_eq!(json[1]["hasChanged"], true);
    assert_eq!(json[1]["version"], 2);
}

/// 客户端版本领先于服务端同样视为变化
#[tokio::test]
async fn test_client_ahead_counts_as_changed() {
    let catalog = MemoryCatalog::new();
    let versions = HashMap::from([(EntityKind::Category, 5)]);

    let result = catalog.manager.sync().check(&versions).await.unwrap();
    let category = result
        .iter()
        .find(|m| m.module == EntityKind::Category)
        .unwrap();
    assert!(category.has_changed);
    assert_eq!(category.version, 0);
}

/// 并发检查多次，结果顺序始终固定
#[tokio::test]
async fn test_concurrent_checks_keep_order() {
    let catalog = MemoryCatalog::new();
    let sync = catalog.manager.sync().clone();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let sync = sync.clone();
            tokio::spawn(async move { sync.check(&HashMap::new()).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        let order: Vec<EntityKind> = result.iter().map(|m| m.module).collect();
        assert_eq!(order, EntityKind::ALL.to_vec());
    }
}

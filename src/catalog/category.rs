//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 分类实体

use crate::entity::CatalogEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 分类实体类型
#[derive(Debug, Clone, Copy)]
pub struct Category;

/// 分类存储记录
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecord {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 分类视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// 创建分类
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: true,
        }
    }
}

/// 更新分类
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
}

impl CatalogEntity for Category {
    const NAME: &'static str = "categories";
    const LABEL: &'static str = "Category";

    type Record = CategoryRecord;
    type View = CategoryView;
    type Create = NewCategory;
    type Update = CategoryUpdate;

    fn to_view(record: &CategoryRecord) -> CategoryView {
        CategoryView {
            id: record.id,
            name: record.name.clone(),
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    fn view_id(view: &CategoryView) -> i32 {
        view.id
    }

    fn record_id(record: &CategoryRecord) -> i32 {
        record.id
    }

    fn set_record_id(record: &mut CategoryRecord, id: i32) {
        record.id = id;
    }

    fn new_record(input: &NewCategory) -> CategoryRecord {
        CategoryRecord {
            id: 0,
            name: input.name.clone(),
            is_active: input.is_active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn record_from_view(view: &CategoryView) -> CategoryRecord {
        CategoryRecord {
            id: view.id,
            name: view.name.clone(),
            is_active: view.is_active,
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }

    fn apply_update(record: &mut CategoryRecord, input: &CategoryUpdate) {
        record.name = input.name.clone();
        record.is_active = input.is_active;
        record.updated_at = Some(Utc::now());
    }

    fn update_id(input: &CategoryUpdate) -> i32 {
        input.id
    }
}

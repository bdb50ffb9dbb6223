//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 服务实体。服务属于一个分类，视图中附带分类名称。

use crate::entity::CatalogEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 服务实体类型
#[derive(Debug, Clone, Copy)]
pub struct Service;

/// 服务存储记录
///
/// `category_name` 由仓储在读取时关联查询得到
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRecord {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub price: f64,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 服务视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub price: f64,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// 创建服务
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub price: f64,
    pub category_id: i32,
}

/// 更新服务
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdate {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    pub price: f64,
    pub category_id: i32,
}

impl CatalogEntity for Service {
    const NAME: &'static str = "services";
    const LABEL: &'static str = "Service";

    type Record = ServiceRecord;
    type View = ServiceView;
    type Create = NewService;
    type Update = ServiceUpdate;

    fn to_view(record: &ServiceRecord) -> ServiceView {
        ServiceView {
            id: record.id,
            name: record.name.clone(),
            description: record.description.clone(),
            is_active: record.is_active,
            price: record.price,
            category_id: record.category_id,
            category_name: record.category_name.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    fn view_id(view: &ServiceView) -> i32 {
        view.id
    }

    fn record_id(record: &ServiceRecord) -> i32 {
        record.id
    }

    fn set_record_id(record: &mut ServiceRecord, id: i32) {
        record.id = id;
    }

    fn new_record(input: &NewService) -> ServiceRecord {
        ServiceRecord {
            id: 0,
            name: input.name.clone(),
            description: input.description.clone(),
            is_active: input.is_active,
            price: input.price,
            category_id: input.category_id,
            category_name: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn record_from_view(view: &ServiceView) -> ServiceRecord {
        ServiceRecord {
            id: view.id,
            name: view.name.clone(),
            description: view.description.clone(),
            is_active: view.is_active,
            price: view.price,
            category_id: view.category_id,
            category_name: view.category_name.clone(),
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }

    fn apply_update(record: &mut ServiceRecord, input: &ServiceUpdate) {
        if record.category_id != input.category_id {
            // 关联名称由仓储重新读取
            record.category_name = None;
        }
        record.name = input.name.clone();
        record.description = input.description.clone();
        record.is_active = input.is_active;
        record.price = input.price;
        record.category_id = input.category_id;
        record.updated_at = Some(Utc::now());
    }

    fn update_id(input: &ServiceUpdate) -> i32 {
        input.id
    }
}

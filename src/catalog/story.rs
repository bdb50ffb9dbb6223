//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 故事实体

use crate::entity::CatalogEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 故事实体类型
#[derive(Debug, Clone, Copy)]
pub struct Story;

/// 故事存储记录
#[derive(Debug, Clone, PartialEq)]
pub struct StoryRecord {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 故事视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryView {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 创建故事
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStory {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_published: bool,
}

/// 更新故事
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryUpdate {
    pub id: i32,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    pub is_published: bool,
}

impl CatalogEntity for Story {
    const NAME: &'static str = "stories";
    const LABEL: &'static str = "Story";

    type Record = StoryRecord;
    type View = StoryView;
    type Create = NewStory;
    type Update = StoryUpdate;

    fn to_view(record: &StoryRecord) -> StoryView {
        StoryView {
            id: record.id,
            title: record.title.clone(),
            content: record.content.clone(),
            image_url: record.image_url.clone(),
            is_published: record.is_published,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    fn view_id(view: &StoryView) -> i32 {
        view.id
    }

    fn record_id(record: &StoryRecord) -> i32 {
        record.id
    }

    fn set_record_id(record: &mut StoryRecord, id: i32) {
        record.id = id;
    }

    fn new_record(input: &NewStory) -> StoryRecord {
        StoryRecord {
            id: 0,
            title: input.title.clone(),
            content: input.content.clone(),
            image_url: input.image_url.clone(),
            is_published: input.is_published,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn record_from_view(view: &StoryView) -> StoryRecord {
        StoryRecord {
            id: view.id,
            title: view.title.clone(),
            content: view.content.clone(),
            image_url: view.image_url.clone(),
            is_published: view.is_published,
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }

    fn apply_update(record: &mut StoryRecord, input: &StoryUpdate) {
        record.title = input.title.clone();
        record.content = input.content.clone();
        record.image_url = input.image_url.clone();
        record.is_published = input.is_published;
        record.updated_at = Some(Utc::now());
    }

    fn update_id(input: &StoryUpdate) -> i32 {
        input.id
    }
}

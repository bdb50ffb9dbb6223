//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 基于 Sea-ORM 的仓储实现
//!
//! 所有查询都排除已软删除的行；删除只写入 `deleted_at`。

use super::entities::{category, service, story};
use crate::catalog::{Category, CategoryRecord, Service, ServiceRecord, Story, StoryRecord};
use crate::entity::CatalogEntity;
use crate::error::{CacheError, Result};
use crate::repository::{CategoryReferences, Repository};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, instrument};

fn missing<E: CatalogEntity>(id: i32) -> CacheError {
    CacheError::NotFound(format!("{} with id {} not found", E::LABEL, id))
}

fn category_record(model: category::Model) -> CategoryRecord {
    CategoryRecord {
        id: model.id,
        name: model.name,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn service_record(model: service::Model, category: Option<category::Model>) -> ServiceRecord {
    ServiceRecord {
        id: model.id,
        name: model.name,
        description: model.description,
        is_active: model.is_active,
        price: model.price,
        category_id: model.category_id,
        category_name: category.map(|c| c.name),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn story_record(model: story::Model) -> StoryRecord {
    StoryRecord {
        id: model.id,
        title: model.title,
        content: model.content,
        image_url: model.image_url,
        is_published: model.is_published,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// 分类仓储
#[derive(Debug, Clone)]
pub struct SeaOrmCategoryRepository {
    db: DatabaseConnection,
}

impl SeaOrmCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_live(&self, id: i32) -> Result<Option<category::Model>> {
        Ok(category::Entity::find_by_id(id)
            .filter(category::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?)
    }
}

#[async_trait]
impl Repository<Category> for SeaOrmCategoryRepository {
    #[instrument(skip(self), level = "debug")]
    async fn list(&self) -> Result<Vec<CategoryRecord>> {
        let rows = category::Entity::find()
            .filter(category::Column::DeletedAt.is_null())
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(category_record).collect())
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_by_id(&self, id: i32) -> Result<Option<CategoryRecord>> {
        Ok(self.find_live(id).await?.map(category_record))
    }

    #[instrument(skip(self, record), level = "debug")]
    async fn create(&self, record: CategoryRecord) -> Result<CategoryRecord> {
        let model = category::ActiveModel {
            id: NotSet,
            name: Set(record.name),
            is_active: Set(record.is_active),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;
        debug!("Inserted category id={}", model.id);
        Ok(category_record(model))
    }

    #[instrument(skip(self, record), level = "debug")]
    async fn update(&self, record: CategoryRecord) -> Result<CategoryRecord> {
        let existing = self
            .find_live(record.id)
            .await?
            .ok_or_else(|| missing::<Category>(record.id))?;
        let mut active = existing.into_active_model();
        active.name = Set(record.name);
        active.is_active = Set(record.is_active);
        active.updated_at = Set(Some(Utc::now()));
        Ok(category_record(active.update(&self.db).await?))
    }

    #[instrument(skip(self, record), level = "debug")]
    async fn delete(&self, record: &CategoryRecord) -> Result<()> {
        let result = category::Entity::update_many()
            .col_expr(category::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(category::Column::Id.eq(record.id))
            .filter(category::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(missing::<Category>(record.id));
        }
        Ok(())
    }
}

/// 服务仓储，读取时关联分类名称
#[derive(Debug, Clone)]
pub struct SeaOrmServiceRepository {
    db: DatabaseConnection,
}

impl SeaOrmServiceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_live(&self, id: i32) -> Result<Option<(service::Model, Option<category::Model>)>> {
        Ok(service::Entity::find_by_id(id)
            .find_also_related(category::Entity)
            .filter(service::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?)
    }

    async fn reload(&self, id: i32) -> Result<ServiceRecord> {
        let (model, category) = self
            .find_live(id)
            .await?
            .ok_or_else(|| missing::<Service>(id))?;
        Ok(service_record(model, category))
    }
}

#[async_trait]
impl Repository<Service> for SeaOrmServiceRepository {
    #[instrument(skip(self), level = "debug")]
    async fn list(&self) -> Result<Vec<ServiceRecord>> {
        let rows = service::Entity::find()
            .find_also_related(category::Entity)
            .filter(service::Column::DeletedAt.is_null())
            .order_by_asc(service::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(model, category)| service_record(model, category))
            .collect())
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_by_id(&self, id: i32) -> Result<Option<ServiceRecord>> {
        Ok(self
            .find_live(id)
            .await?
            .map(|(model, category)| service_record(model, category)))
    }

    #[instrument(skip(self, record), level = "debug")]
    async fn create(&self, record: ServiceRecord) -> Result<ServiceRecord> {
        let model = service::ActiveModel {
            id: NotSet,
            name: Set(record.name),
            description: Set(record.description),
            is_active: Set(record.is_active),
            price: Set(record.price),
            category_id: Set(record.category_id),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;
        debug!("Inserted service id={}", model.id);
        self.reload(model.id).await
    }

    #[instrument(skip(self, record), level = "debug")]
    async fn update(&self, record: ServiceRecord) -> Result<ServiceRecord> {
        let (existing, _) = self
            .find_live(record.id)
            .await?
            .ok_or_else(|| missing::<Service>(record.id))?;
        let mut active = existing.into_active_model();
        active.name = Set(record.name);
        active.description = Set(record.description);
        active.is_active = Set(record.is_active);
        active.price = Set(record.price);
        active.category_id = Set(record.category_id);
        active.updated_at = Set(Some(Utc::now()));
        let model = active.update(&self.db).await?;
        self.reload(model.id).await
    }

    #[instrument(skip(self, record), level = "debug")]
    async fn delete(&self, record: &ServiceRecord) -> Result<()> {
        let result = service::Entity::update_many()
            .col_expr(service::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(service::Column::Id.eq(record.id))
            .filter(service::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(missing::<Service>(record.id));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryReferences for SeaOrmServiceRepository {
    #[instrument(skip(self), level = "debug")]
    async fn count_services(&self, category_id: i32) -> Result<u64> {
        Ok(service::Entity::find()
            .filter(service::Column::CategoryId.eq(category_id))
            .filter(service::Column::DeletedAt.is_null())
            .count(&self.db)
            .await?)
    }
}

/// 故事仓储
#[derive(Debug, Clone)]
pub struct SeaOrmStoryRepository {
    db: DatabaseConnection,
}

impl SeaOrmStoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_live(&self, id: i32) -> Result<Option<story::Model>> {
        Ok(story::Entity::find_by_id(id)
            .filter(story::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?)
    }
}

#[async_trait]
impl Repository<Story> for SeaOrmStoryRepository {
    #[instrument(skip(self), level = "debug")]
    async fn list(&self) -> Result<Vec<StoryRecord>> {
        let rows = story::Entity::find()
            .filter(story::Column::DeletedAt.is_null())
            .order_by_asc(story::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(story_record).collect())
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_by_id(&self, id: i32) -> Result<Option<StoryRecord>> {
        Ok(self.find_live(id).await?.map(story_record))
    }

    #[instrument(skip(self, record), level = "debug")]
    async fn create(&self, record: StoryRecord) -> Result<StoryRecord> {
        let model = story::ActiveModel {
            id: NotSet,
            title: Set(record.title),
            content: Set(record.content),
            image_url: Set(record.image_url),
            is_published: Set(record.is_published),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;
        debug!("Inserted story id={}", model.id);
        Ok(story_record(model))
    }

    #[instrument(skip(self, record), level = "debug")]
    async fn update(&self, record: StoryRecord) -> Result<StoryRecord> {
        let existing = self
            .find_live(record.id)
            .await?
            .ok_or_else(|| missing::<Story>(record.id))?;
        let mut active = existing.into_active_model();
        active.title = Set(record.title);
        active.content = Set(record.content);
        active.image_url = Set(record.image_url);
        active.is_published = Set(record.is_published);
        active.updated_at = Set(Some(Utc::now()));
        Ok(story_record(active.update(&self.db).await?))
    }

    #[instrument(skip(self, record), level = "debug")]
    async fn delete(&self, record: &StoryRecord) -> Result<()> {
        let result = story::Entity::update_many()
            .col_expr(story::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(story::Column::Id.eq(record.id))
            .filter(story::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(missing::<Story>(record.id));
        }
        Ok(())
    }
}

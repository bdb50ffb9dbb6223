//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 关系型存储：连接管理、表结构创建以及基于 Sea-ORM 的仓储实现。

pub mod entities;
pub mod repository;

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::utils::redaction::RedactedUrl;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{debug, info, instrument};

pub use repository::{SeaOrmCategoryRepository, SeaOrmServiceRepository, SeaOrmStoryRepository};

/// 是否为 SQLite 内存数据库
///
/// 每个连接都会得到一个独立的内存库，因此连接池只能保留一个连接
pub fn is_sqlite_memory(url: &str) -> bool {
    url.starts_with("sqlite:") && url.contains(":memory:")
}

/// 建立数据库连接
#[instrument(skip(config), level = "info", name = "connect_database")]
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let url = config.url.expose_secret();
    let mut options = ConnectOptions::new(url.to_string());
    options
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .sqlx_logging(false);

    if is_sqlite_memory(url) {
        options.max_connections(1).min_connections(1);
    } else {
        options.max_connections(config.max_connections);
    }

    let db = Database::connect(options).await?;
    info!("Connected to database at {}", RedactedUrl(url));

    if config.create_schema {
        create_schema(&db).await?;
    }
    Ok(db)
}

/// 创建缺失的表
///
/// 分类表先于服务表创建，以满足外键约束
pub async fn create_schema(db: &DatabaseConnection) -> Result<()> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut categories = schema.create_table_from_entity(entities::category::Entity);
    let mut services = schema.create_table_from_entity(entities::service::Entity);
    let mut stories = schema.create_table_from_entity(entities::story::Entity);

    for table in [
        categories.if_not_exists(),
        services.if_not_exists(),
        stories.if_not_exists(),
    ] {
        db.execute(backend.build(&*table)).await?;
    }
    debug!("Database schema ensured");
    Ok(())
}

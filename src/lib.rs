//! smartcache - 目录实体的旁路缓存与版本跟踪引擎
//!
//! 为分类、服务、故事三种实体提供统一的缓存读写策略：
//! 读时回源填充、写时刷新或失效，并维护每种实体单调递增的版本号，
//! 供轮询客户端判断数据是否发生变化。

#![doc(html_root_url = "https://docs.rs/smartcache/0.1.0")]

pub use serde;
pub use serde::{Deserialize, Serialize};
pub use serde_json;
pub use tokio;

pub mod backend;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod database;
pub mod engine;
pub mod entity;
pub mod error;
pub mod hooks;
pub mod keys;
pub mod manager;
pub mod metrics;
pub mod repository;
pub mod serialization;
pub mod sync;
pub mod telemetry;
pub mod utils;
pub mod version;

// Re-export commonly used items
pub use backend::{CacheStore, CacheStoreExt, MemoryStore, RedisStore};
pub use catalog::EntityKind;
pub use config::Config;
pub use engine::EntityCache;
pub use entity::CatalogEntity;
pub use error::{CacheError, ErrorKind, Result};
pub use manager::{CatalogManager, Repositories};
pub use sync::{ModuleVersion, SyncAggregator, VersionCheckRequest};
pub use version::VersionTracker;

/// smartcache 版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

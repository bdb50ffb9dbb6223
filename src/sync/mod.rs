//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块提供面向轮询客户端的多实体版本同步检查。

pub mod aggregator;

pub use aggregator::{ModuleVersion, SyncAggregator, VersionCheckRequest};

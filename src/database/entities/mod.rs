//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! Sea-ORM 实体定义，所有表都带有 `deleted_at` 软删除列。

pub mod category;
pub mod service;
pub mod story;

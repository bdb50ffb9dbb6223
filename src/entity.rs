//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了可缓存实体类型的描述特征。

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// 可缓存的目录实体类型
///
/// 实体类型本身只是一个标记类型，它把存储记录、读视图、创建输入、更新输入
/// 以及它们之间的纯映射关联在一起。缓存引擎只通过此特征认识实体。
pub trait CatalogEntity: Send + Sync + 'static {
    /// 实体类型名称，同时作为缓存键前缀（如 "categories"）
    const NAME: &'static str;

    /// 用于错误消息的显示名称（如 "Category"）
    const LABEL: &'static str;

    /// 存储形态的记录
    type Record: Clone + Debug + Send + Sync + 'static;

    /// 读优化视图，缓存中保存的就是它
    type View: Serialize + DeserializeOwned + Clone + PartialEq + Debug + Send + Sync + 'static;

    /// 创建输入
    type Create: Debug + Send + Sync + 'static;

    /// 更新输入
    type Update: Debug + Send + Sync + 'static;

    /// 记录映射为视图
    fn to_view(record: &Self::Record) -> Self::View;

    /// 视图的主键
    fn view_id(view: &Self::View) -> i32;

    /// 记录的主键
    fn record_id(record: &Self::Record) -> i32;

    /// 设置记录主键（由存储分配）
    fn set_record_id(record: &mut Self::Record, id: i32);

    /// 由创建输入构造尚未持久化的记录
    fn new_record(input: &Self::Create) -> Self::Record;

    /// 由视图还原存储形态的记录
    fn record_from_view(view: &Self::View) -> Self::Record;

    /// 将更新字段写入记录
    fn apply_update(record: &mut Self::Record, input: &Self::Update);

    /// 更新输入针对的主键
    fn update_id(input: &Self::Update) -> i32;
}

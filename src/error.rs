//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了缓存引擎的错误类型，以及错误到请求结果（HTTP 状态码）的分类。

use thiserror::Error;

/// 缓存引擎错误类型枚举
///
/// 业务类错误（NotFound / Conflict / BadRequest / NotModified）原样向调用方传播，
/// 基础设施类错误（缓存、数据库、序列化、超时）不会被当作缓存未命中处理。
#[derive(Error, Debug)]
pub enum CacheError {
    /// 请求的记录或被引用的外键记录不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// 业务规则冲突，例如删除仍被引用的分类
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 请求参数不合法
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 客户端持有的版本已是最新
    #[error("Not modified: {0}")]
    NotModified(String),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 缓存后端错误
    #[error("Backend error: {0}")]
    Backend(String),

    /// Redis错误
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Sea-ORM数据库错误
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 超时错误
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),

    /// 操作不支持
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

/// 错误分类
///
/// 对应请求层的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 404
    NotFound,
    /// 400，包含业务冲突
    BadRequest,
    /// 304
    NotModified,
    /// 500，缓存或存储故障
    Infrastructure,
}

impl ErrorKind {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::BadRequest => 400,
            ErrorKind::NotModified => 304,
            ErrorKind::Infrastructure => 500,
        }
    }
}

impl CacheError {
    /// 获取错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            CacheError::NotFound(_) => ErrorKind::NotFound,
            CacheError::Conflict(_) | CacheError::BadRequest(_) => ErrorKind::BadRequest,
            CacheError::NotModified(_) => ErrorKind::NotModified,
            _ => ErrorKind::Infrastructure,
        }
    }

    /// 是否为基础设施故障
    pub fn is_infrastructure(&self) -> bool {
        self.kind() == ErrorKind::Infrastructure
    }
}

/// 缓存操作结果类型别名
pub type Result<T> = std::result::Result<T, CacheError>;

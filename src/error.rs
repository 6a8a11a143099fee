//! 统一错误处理
//!
//! 提供结构化错误类型和错误处理机制。标注引擎里没有致命错误：
//! 绝大多数错误在入口处被降级处理（空词表、空翻译器、回退网页翻译），
//! 只有配置、IO 以及生词本添加的确认会以 `LexiResult` 形式返回给调用方。

use std::fmt;

use thiserror::Error;

/// 标注与查词错误类型
#[derive(Error, Debug, Clone)]
pub enum LexiError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 宿主绑定失效（例如扩展被重新加载）
    #[error("宿主环境已失效")]
    HostInvalidated,

    /// 词表不可用
    #[error("词表不可用: {0}")]
    WordlistUnavailable(String),

    /// 释义服务不可用
    #[error("释义查询失败: {0}")]
    DefinitionUnavailable(String),

    /// 翻译引擎不可用或创建失败
    #[error("翻译器不可用: {0}")]
    TranslatorUnavailable(String),

    /// 翻译结果为空
    #[error("翻译结果为空: {0}")]
    EmptyTranslation(String),

    /// 翻译服务错误
    #[error("翻译服务错误: {0}")]
    TranslationServiceError(String),

    /// 结果已过期（会话被新的悬停或点击取代）
    #[error("结果已过期: 会话 {0} 已被取代")]
    StaleResult(u64),

    /// 超时错误
    #[error("操作超时: {0}")]
    TimeoutError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 生词本存储错误
    #[error("生词本存储错误: {0}")]
    VocabularyError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl LexiError {
    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            LexiError::ConfigError(_) => ErrorCategory::Configuration,
            LexiError::HostInvalidated => ErrorCategory::EnvironmentInvalidated,
            LexiError::WordlistUnavailable(_) => ErrorCategory::ResourceUnavailable,
            LexiError::DefinitionUnavailable(_) => ErrorCategory::ResourceUnavailable,
            LexiError::TranslatorUnavailable(_) => ErrorCategory::ResourceUnavailable,
            LexiError::EmptyTranslation(_) => ErrorCategory::ResourceUnavailable,
            LexiError::TranslationServiceError(_) => ErrorCategory::ResourceUnavailable,
            LexiError::NetworkError(_) => ErrorCategory::ResourceUnavailable,
            LexiError::VocabularyError(_) => ErrorCategory::ResourceUnavailable,
            LexiError::StaleResult(_) => ErrorCategory::StaleResult,
            LexiError::TimeoutError(_) => ErrorCategory::Timeout,
            LexiError::ParseError(_) => ErrorCategory::Parsing,
            LexiError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::StaleResult => ErrorSeverity::Info,
            ErrorCategory::EnvironmentInvalidated => ErrorSeverity::Warning,
            ErrorCategory::ResourceUnavailable => ErrorSeverity::Warning,
            ErrorCategory::Timeout => ErrorSeverity::Warning,
            ErrorCategory::Parsing => ErrorSeverity::Error,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 点击翻译失败时是否打开网页翻译
    ///
    /// 过期结果与宿主失效保持静默，其余失败（含超时与空译文）都走回退。
    pub fn triggers_fallback(&self) -> bool {
        !matches!(
            self.category(),
            ErrorCategory::StaleResult | ErrorCategory::EnvironmentInvalidated
        )
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let new_msg = format!("{} (上下文: {})", self, context);

        match &mut self {
            LexiError::ConfigError(ref mut msg)
            | LexiError::WordlistUnavailable(ref mut msg)
            | LexiError::DefinitionUnavailable(ref mut msg)
            | LexiError::TranslatorUnavailable(ref mut msg)
            | LexiError::EmptyTranslation(ref mut msg)
            | LexiError::TranslationServiceError(ref mut msg)
            | LexiError::TimeoutError(ref mut msg)
            | LexiError::NetworkError(ref mut msg)
            | LexiError::ParseError(ref mut msg)
            | LexiError::VocabularyError(ref mut msg)
            | LexiError::InternalError(ref mut msg) => *msg = new_msg,
            LexiError::HostInvalidated | LexiError::StaleResult(_) => {}
        }

        self
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 宿主绑定消失，入口处直接 no-op
    EnvironmentInvalidated,
    /// 词表、翻译引擎、释义服务等资源不可用，降级处理
    ResourceUnavailable,
    /// 异步结果到达时会话已被取代，静默丢弃
    StaleResult,
    /// 点击翻译超时，触发回退
    Timeout,
    Configuration,
    Parsing,
    Internal,
}

impl From<std::io::Error> for LexiError {
    fn from(error: std::io::Error) -> Self {
        LexiError::WordlistUnavailable(format!("IO错误: {}", error))
    }
}

impl From<serde_json::Error> for LexiError {
    fn from(error: serde_json::Error) -> Self {
        LexiError::ParseError(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for LexiError {
    fn from(error: toml::de::Error) -> Self {
        LexiError::ConfigError(format!("TOML解析错误: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for LexiError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        LexiError::TimeoutError(format!("异步操作超时: {}", error))
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for LexiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            LexiError::TimeoutError(error.to_string())
        } else {
            LexiError::NetworkError(error.to_string())
        }
    }
}

/// 错误结果类型别名
pub type LexiResult<T> = Result<T, LexiError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log_error(error: &LexiError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::debug!("[Lexi] {}", error),
            ErrorSeverity::Warning => tracing::warn!("[Lexi] {}", error),
            ErrorSeverity::Error => tracing::error!("[Lexi] {}", error),
            ErrorSeverity::Critical => tracing::error!("[Lexi] 严重错误: {}", error),
        }
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> LexiError {
        LexiError::ConfigError(msg.to_string())
    }

    /// 创建翻译器不可用错误
    pub fn translator_unavailable<T: fmt::Display>(msg: T) -> LexiError {
        LexiError::TranslatorUnavailable(msg.to_string())
    }
}

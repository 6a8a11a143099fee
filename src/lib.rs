//! # Lexi
//!
//! 在网页文本中标出值得学习的词汇，提供释义提示框与按需翻译。
//!
//! ## 模块组织
//!
//! - `core` - 页面会话、偏好切换、离线标注
//! - `text` - 分词、词表、词汇分类
//! - `parsers` - HTML 解析、标注、例句提取与序列化
//! - `tooltip` - 提示框状态机与渲染
//! - `translation` - 翻译引擎、翻译器网关、缓存与网页回退
//! - `config` / `env` - 配置文件与环境变量
//! - `error` - 统一错误类型

pub mod config;
pub mod core;
pub mod env;
pub mod error;
pub mod parsers;
pub mod text;
pub mod tooltip;
pub mod translation;

pub use crate::core::{
    annotate_html, claim_document, web_fallback, AnnotateOptions, AnnotatedDocument, LexiSession,
    Preferences,
};
#[cfg(feature = "http")]
pub use crate::core::http_engine;
pub use config::{ConfigManager, LexiConfig};
pub use error::{LexiError, LexiResult};
pub use text::{classify, Classifier, HighlightMode, WordlistStore};
pub use tooltip::{ClickOutcome, LookupRequest, TooltipController, TooltipPhase};

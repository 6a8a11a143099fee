//! 翻译模块
//!
//! - **engine**: 翻译引擎与翻译器句柄抽象（含 HTTP 实现）
//! - **gateway**: 按目标语言缓存翻译器，受用户手势约束
//! - **cache**: 单词翻译结果缓存
//! - **fallback**: 网页翻译回退与一次性闩锁

pub mod cache;
pub mod engine;
pub mod fallback;
pub mod gateway;

pub use cache::TranslationCache;
#[cfg(feature = "http")]
pub use engine::HttpTranslationEngine;
pub use engine::{LanguagePair, TranslationEngine, TranslatorHandle, UnavailableEngine};
pub use fallback::{
    web_translate_url, FallbackLatch, FallbackTranslator, WebPageFallback,
    DEFAULT_FALLBACK_BASE_URL,
};
pub use gateway::{GestureFlag, GestureGuard, TranslatorGateway, UserActivation};

//! 核心流程：页面会话、偏好切换与离线标注

use std::sync::Arc;
use std::time::Duration;

use encoding_rs::Encoding;
use markup5ever_rcdom::{Handle, RcDom};
use serde::{Deserialize, Serialize};

use crate::config::LexiConfig;
use crate::error::LexiResult;
use crate::parsers::html::annotator::{Annotator, HighlightMarker, ScanReport};
use crate::parsers::html::dom::{find_nodes, get_node_attr, html_to_dom, set_node_attr};
use crate::parsers::html::serializer::serialize_document;
use crate::parsers::html::utils::get_charset;
use crate::text::classifier::{Classifier, HighlightMode};
use crate::text::wordlists::WordlistStore;
use crate::tooltip::controller::{TooltipController, TooltipServices, TooltipSettings};
use crate::translation::cache::TranslationCache;
use crate::translation::fallback::WebPageFallback;
use crate::translation::gateway::TranslatorGateway;

#[cfg(feature = "http")]
use crate::translation::engine::HttpTranslationEngine;

/// `<html>` 上的注入标记属性
pub const INJECTED_ATTR: &str = "data-lexi-injected";
pub const INJECTED_ALIVE: &str = "alive";

/// 声明对文档的所有权；同一文档第二次声明返回 `false`
pub fn claim_document(root: &Handle) -> bool {
    let Some(html) = find_nodes(root, &["html"]).into_iter().next() else {
        return false;
    };

    if get_node_attr(&html, INJECTED_ATTR).as_deref() == Some(INJECTED_ALIVE) {
        tracing::debug!("[Lexi] 文档已被注入，跳过初始化");
        return false;
    }

    set_node_attr(&html, INJECTED_ATTR, Some(INJECTED_ALIVE.to_string()));
    true
}

/// 用户偏好
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub learning_mode: bool,
    pub highlight_mode: HighlightMode,
    pub target_lang: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self::from_config(&LexiConfig::default())
    }
}

impl Preferences {
    pub fn from_config(config: &LexiConfig) -> Self {
        Self {
            learning_mode: config.learning_mode,
            highlight_mode: config.highlight_mode,
            target_lang: config.target_lang.clone(),
        }
    }
}

/// 一个页面的会话状态：词表、翻译器、缓存、标注器与提示框
pub struct LexiSession {
    wordlists: WordlistStore,
    annotator: Annotator,
    cache: Arc<TranslationCache>,
    gateway: Arc<TranslatorGateway>,
    tooltip: TooltipController,
    preferences: Preferences,
}

impl LexiSession {
    pub fn new(
        config: &LexiConfig,
        wordlists: WordlistStore,
        gateway: Arc<TranslatorGateway>,
        services: TooltipServices,
        page_url: impl Into<String>,
    ) -> Self {
        let preferences = Preferences::from_config(config);
        let cache = Arc::new(TranslationCache::new());
        let tooltip = TooltipController::new(
            services,
            gateway.clone(),
            cache.clone(),
            TooltipSettings {
                target_lang: preferences.target_lang.clone(),
                click_timeout: config.click_timeout(),
                page_url: page_url.into(),
            },
        );

        Self {
            wordlists,
            annotator: Annotator::default(),
            cache,
            gateway,
            tooltip,
            preferences,
        }
    }

    /// 替换可见性探测（例如宿主提供了布局信息）
    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    /// 初始化页面：声明文档，学习模式开启时加载词表并扫描
    ///
    /// 文档已被其他会话声明时返回 `None`。
    pub async fn initialize(&self, root: &Handle) -> Option<ScanReport> {
        if !claim_document(root) {
            return None;
        }
        if !self.preferences.learning_mode {
            return Some(ScanReport::default());
        }

        let classifier = self.classifier().await;
        Some(self.annotator.scan(root, &classifier))
    }

    /// 应用新的偏好：先清除全部标记，学习模式开启时按新模式重新扫描
    pub async fn apply_preferences(&mut self, root: &Handle, preferences: Preferences) -> ScanReport {
        if preferences.target_lang != self.preferences.target_lang {
            self.tooltip.set_target_lang(&preferences.target_lang);
        }
        self.preferences = preferences;

        let cleared = self.annotator.clear(root);
        tracing::debug!("[Lexi] 偏好已更新，清除 {} 个标记", cleared);

        if !self.preferences.learning_mode {
            return ScanReport::default();
        }

        let classifier = self.classifier().await;
        self.annotator.scan(root, &classifier)
    }

    async fn classifier(&self) -> Classifier {
        let snapshot = self.wordlists.ensure_loaded().await;
        Classifier::new(self.preferences.highlight_mode, snapshot)
    }

    pub fn markers(&self, root: &Handle) -> Vec<HighlightMarker> {
        self.annotator.markers(root)
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn tooltip(&self) -> &TooltipController {
        &self.tooltip
    }

    pub fn gateway(&self) -> &TranslatorGateway {
        &self.gateway
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }
}

/// HTTP 翻译请求超时
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// 按配置中的接口地址构造 HTTP 翻译引擎
#[cfg(feature = "http")]
pub fn http_engine(config: &LexiConfig) -> LexiResult<HttpTranslationEngine> {
    HttpTranslationEngine::new(config.translation_api_url.clone(), HTTP_TIMEOUT)
}

/// 按配置构造网页翻译回退，`opener` 负责真正打开页面
pub fn web_fallback<F>(config: &LexiConfig, opener: F) -> WebPageFallback<F>
where
    F: Fn(&str) + Send + Sync,
{
    WebPageFallback::new(
        config.fallback_base_url.clone(),
        config.source_lang.clone(),
        opener,
    )
}

/// 离线标注选项
#[derive(Debug, Clone, Default)]
pub struct AnnotateOptions {
    pub highlight_mode: HighlightMode,
    /// 强制使用的输入编码；为空时从文档 `<meta>` 探测
    pub encoding: Option<String>,
    pub inject_style: bool,
}

/// 离线标注结果
#[derive(Debug, Clone)]
pub struct AnnotatedDocument {
    pub html: Vec<u8>,
    pub encoding: String,
    pub report: ScanReport,
}

/// 解析文档，必要时按 `<meta charset>` 重新解码
pub fn parse_with_charset(input: &[u8], forced: Option<&str>) -> LexiResult<(RcDom, String)> {
    let mut encoding = forced.unwrap_or("utf-8").to_string();
    let mut dom = html_to_dom(input, &encoding)?;

    if forced.is_none() {
        if let Some(charset) = get_charset(&dom.document) {
            if let Some(detected) = Encoding::for_label_no_replacement(charset.as_bytes()) {
                if !detected.name().eq_ignore_ascii_case(&encoding) {
                    tracing::debug!("[Lexi] 按文档声明的字符集重新解析: {}", detected.name());
                    encoding = detected.name().to_string();
                    dom = html_to_dom(input, &encoding)?;
                }
            }
        }
    }

    Ok((dom, encoding))
}

/// 标注整份 HTML 文档并序列化
pub async fn annotate_html(
    input: &[u8],
    wordlists: &WordlistStore,
    options: &AnnotateOptions,
) -> LexiResult<AnnotatedDocument> {
    let snapshot = wordlists.ensure_loaded().await;
    let (dom, encoding) = parse_with_charset(input, options.encoding.as_deref())?;

    let classifier = Classifier::new(options.highlight_mode, snapshot);
    let report = Annotator::default().scan(&dom.document, &classifier);

    let html = serialize_document(&dom, &encoding, options.inject_style)?;
    tracing::info!(
        "[Lexi] 标注完成: {} 个标记 ({})",
        report.markers_created,
        classifier.mode()
    );

    Ok(AnnotatedDocument {
        html,
        encoding,
        report,
    })
}

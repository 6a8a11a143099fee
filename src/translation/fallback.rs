//! 网页翻译回退
//!
//! 点击翻译失败或超时时打开外部翻译网页。每次点击至多打开一次。

use std::sync::atomic::{AtomicBool, Ordering};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// 默认的网页翻译地址
pub const DEFAULT_FALLBACK_BASE_URL: &str = "https://translate.google.com/";

/// 查询参数值的编码集：只保留非保留字符
const COMPONENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ').add(b'"').add(b'<').add(b'>').add(b'`')
    .add(b':').add(b'/').add(b'?').add(b'#').add(b'[').add(b']').add(b'@')
    .add(b'$').add(b'&').add(b'+').add(b',').add(b';').add(b'=')
    .add(b'%').add(b'{').add(b'}').add(b'|').add(b'\\').add(b'^');

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT_ENCODE_SET).to_string()
}

/// 构造网页翻译地址
pub fn web_translate_url(base_url: &str, source_lang: &str, target_lang: &str, word: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}sl={}&tl={}&text={}&op=translate",
        base_url,
        separator,
        encode_component(source_lang),
        encode_component(target_lang),
        encode_component(word)
    )
}

/// 回退翻译器：打开外部页面，不关心结果
pub trait FallbackTranslator: Send + Sync {
    fn open(&self, word: &str, target_lang: &str);
}

/// 把网页翻译地址交给宿主提供的打开函数
pub struct WebPageFallback<F> {
    base_url: String,
    source_lang: String,
    opener: F,
}

impl<F> WebPageFallback<F>
where
    F: Fn(&str) + Send + Sync,
{
    pub fn new(base_url: impl Into<String>, source_lang: impl Into<String>, opener: F) -> Self {
        Self {
            base_url: base_url.into(),
            source_lang: source_lang.into(),
            opener,
        }
    }
}

impl<F> FallbackTranslator for WebPageFallback<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn open(&self, word: &str, target_lang: &str) {
        let url = web_translate_url(&self.base_url, &self.source_lang, target_lang, word);
        tracing::info!("[Lexi] 打开网页翻译: {}", url);
        (self.opener)(&url);
    }
}

/// 一次性闩锁：超时与翻译失败两条路径共用，保证回退最多触发一次
#[derive(Debug, Default)]
pub struct FallbackLatch {
    fired: AtomicBool,
}

impl FallbackLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 首次调用返回 `true`
    pub fn claim(&self) -> bool {
        !self.fired.swap(true, Ordering::SeqCst)
    }

    pub fn is_claimed(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

// 集成测试公共模块
//
// 提供可编排的释义、翻译引擎、回退与生词本替身，以及词表目录构建工具

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::Poll;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::oneshot;

use lexi::config::LexiConfig;
use lexi::error::{LexiError, LexiResult};
use lexi::text::wordlists::{WordlistCategory, WordlistStore};
use lexi::tooltip::controller::{ClickOutcome, TooltipController, TooltipServices, TooltipSettings};
use lexi::tooltip::services::{
    Definition, DefinitionProvider, ExtensionContext, VocabEntry, VocabularyStore,
};
use lexi::tooltip::session::LookupRequest;
use lexi::translation::cache::TranslationCache;
use lexi::translation::engine::{LanguagePair, TranslationEngine, TranslatorHandle};
use lexi::translation::fallback::FallbackTranslator;
use lexi::translation::gateway::{GestureFlag, TranslatorGateway};

pub const FREQUENT: &[&str] = &["people", "about", "would", "there", "their", "time", "world"];
pub const EXAM: &[&str] = &["ubiquitous", "meticulous", "ephemeral", "serendipity"];
pub const EXTRA_STOPWORDS: &[&str] = &["also", "very"];
pub const CORE: &[&str] = &["sensor", "river"];

/// 在目录中写入四份词表
pub fn write_wordlists(dir: &Path) {
    let lists = [
        (WordlistCategory::Frequent, FREQUENT),
        (WordlistCategory::ExamVocabulary, EXAM),
        (WordlistCategory::ExtraStopwords, EXTRA_STOPWORDS),
        (WordlistCategory::CoreVocabulary, CORE),
    ];
    for (category, words) in lists {
        std::fs::write(dir.join(category.file_name()), words.join("\n")).unwrap();
    }
}

/// 临时词表目录及其存储
pub fn temp_wordlists() -> (tempfile::TempDir, WordlistStore) {
    let dir = tempfile::tempdir().unwrap();
    write_wordlists(dir.path());
    let store = WordlistStore::from_dir(dir.path());
    (dir, store)
}

/// 释义替身：默认立即返回，可为单词设置闸门或失败
#[derive(Default)]
pub struct ScriptedDefinitions {
    gates: Mutex<HashMap<String, oneshot::Receiver<Definition>>>,
    failing: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl ScriptedDefinitions {
    pub fn definition_for(word: &str) -> Definition {
        Definition {
            part_of_speech: "adj.".to_string(),
            short_meaning: format!("Meaning (adj.): meaning of {}", word.to_lowercase()),
        }
    }

    /// 该单词的查询挂起，直到发送端送出释义
    pub fn gate(&self, word: &str) -> oneshot::Sender<Definition> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(word.to_lowercase(), rx);
        tx
    }

    pub fn fail(&self, word: &str) {
        self.failing.lock().unwrap().push(word.to_lowercase());
    }
}

impl DefinitionProvider for ScriptedDefinitions {
    fn lookup(&self, word: &str, _context: &str) -> BoxFuture<'static, LexiResult<Definition>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = word.to_lowercase();

        if self.failing.lock().unwrap().contains(&key) {
            return Box::pin(async move { Err(LexiError::DefinitionUnavailable(key)) });
        }

        match self.gates.lock().unwrap().remove(&key) {
            Some(rx) => Box::pin(async move {
                rx.await
                    .map_err(|_| LexiError::DefinitionUnavailable("gate dropped".to_string()))
            }),
            None => {
                let definition = Self::definition_for(word);
                Box::pin(async move { Ok(definition) })
            }
        }
    }
}

/// 翻译器对某个单词的回应
pub enum Reply {
    Text(String),
    After(Duration, String),
    Gate(oneshot::Receiver<String>),
    Never,
    Fail,
    FailAfter(Duration),
    Error(LexiError),
}

/// 翻译器替身；未编排的单词返回 `译:<word>`
#[derive(Default)]
pub struct FakeTranslator {
    replies: Mutex<HashMap<String, Reply>>,
    pub calls: AtomicUsize,
}

impl FakeTranslator {
    pub fn script(&self, word: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(word.to_string(), reply);
    }

    pub fn gate(&self, word: &str) -> oneshot::Sender<String> {
        let (tx, rx) = oneshot::channel();
        self.script(word, Reply::Gate(rx));
        tx
    }
}

impl TranslatorHandle for FakeTranslator {
    fn translate(&self, text: &str) -> BoxFuture<'static, LexiResult<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().unwrap().remove(text);
        let default = format!("译:{}", text);

        match reply {
            None => Box::pin(async move { Ok(default) }),
            Some(Reply::Text(text)) => Box::pin(async move { Ok(text) }),
            Some(Reply::After(delay, text)) => Box::pin(async move {
                tokio::time::sleep(delay).await;
                Ok(text)
            }),
            Some(Reply::Gate(rx)) => Box::pin(async move {
                rx.await
                    .map_err(|_| LexiError::TranslationServiceError("gate dropped".to_string()))
            }),
            Some(Reply::Never) => Box::pin(futures::future::pending()),
            Some(Reply::Fail) => Box::pin(async {
                Err(LexiError::TranslationServiceError("service returned 500".to_string()))
            }),
            Some(Reply::FailAfter(delay)) => Box::pin(async move {
                tokio::time::sleep(delay).await;
                Err(LexiError::TranslationServiceError("service returned 503".to_string()))
            }),
            Some(Reply::Error(error)) => Box::pin(async move { Err(error) }),
        }
    }
}

/// 引擎替身：总是交出同一个翻译器
pub struct FakeEngine {
    pub translator: Arc<FakeTranslator>,
    pub available: bool,
    pub create_delay: Duration,
    pub creations: AtomicUsize,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            translator: Arc::new(FakeTranslator::default()),
            available: true,
            create_delay: Duration::ZERO,
            creations: AtomicUsize::new(0),
        }
    }
}

impl TranslationEngine for FakeEngine {
    fn is_available(&self) -> bool {
        self.available
    }

    fn create(
        &self,
        _pair: LanguagePair,
    ) -> BoxFuture<'static, LexiResult<Arc<dyn TranslatorHandle>>> {
        self.creations.fetch_add(1, Ordering::SeqCst);
        let translator: Arc<dyn TranslatorHandle> = self.translator.clone();
        let delay = self.create_delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(translator)
        })
    }
}

/// 记录打开过的回退页面
#[derive(Default)]
pub struct RecordingFallback {
    pub opened: Mutex<Vec<(String, String)>>,
}

impl RecordingFallback {
    pub fn count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }
}

impl FallbackTranslator for RecordingFallback {
    fn open(&self, word: &str, target_lang: &str) {
        self.opened
            .lock()
            .unwrap()
            .push((word.to_string(), target_lang.to_string()));
    }
}

/// 记录生词本条目
#[derive(Default)]
pub struct RecordingVocabulary {
    pub entries: Mutex<Vec<VocabEntry>>,
}

impl VocabularyStore for RecordingVocabulary {
    fn add(&self, entry: VocabEntry) -> BoxFuture<'static, LexiResult<()>> {
        self.entries.lock().unwrap().push(entry);
        Box::pin(async { Ok(()) })
    }
}

pub const PAGE_URL: &str = "https://example.com/article";

/// 提示框测试装置
pub struct Harness {
    pub controller: Arc<TooltipController>,
    pub gateway: Arc<TranslatorGateway>,
    pub cache: Arc<TranslationCache>,
    pub gesture: Arc<GestureFlag>,
    pub engine: Arc<FakeEngine>,
    pub host: Arc<ExtensionContext>,
    pub definitions: Arc<ScriptedDefinitions>,
    pub fallback: Arc<RecordingFallback>,
    pub vocabulary: Arc<RecordingVocabulary>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_engine(FakeEngine::default())
    }

    pub fn with_engine(engine: FakeEngine) -> Self {
        let engine = Arc::new(engine);
        let gesture = Arc::new(GestureFlag::new());
        let gateway = Arc::new(TranslatorGateway::new(
            engine.clone(),
            gesture.clone(),
            "en",
        ));
        let cache = Arc::new(TranslationCache::new());
        let host = Arc::new(ExtensionContext::new());
        let definitions = Arc::new(ScriptedDefinitions::default());
        let fallback = Arc::new(RecordingFallback::default());
        let vocabulary = Arc::new(RecordingVocabulary::default());

        let controller = Arc::new(TooltipController::new(
            services(&host, &definitions, &fallback, &vocabulary),
            gateway.clone(),
            cache.clone(),
            TooltipSettings {
                target_lang: LexiConfig::default().target_lang,
                click_timeout: Duration::from_millis(600),
                page_url: PAGE_URL.to_string(),
            },
        ));

        Self {
            controller,
            gateway,
            cache,
            gesture,
            engine,
            host,
            definitions,
            fallback,
            vocabulary,
        }
    }

    pub fn translator(&self) -> &FakeTranslator {
        &self.engine.translator
    }

    /// 在用户手势内发起点击：手势只在第一次轮询期间有效
    pub async fn click(&self, word: &str) -> ClickOutcome {
        let mut click = Box::pin(self.controller.click(LookupRequest::new(word)));
        {
            let _gesture = self.gesture.activate();
            if let Poll::Ready(outcome) = futures::poll!(click.as_mut()) {
                return outcome;
            }
        }
        click.await
    }

    pub async fn hover(&self, word: &str) {
        self.controller.hover_enter(LookupRequest::new(word)).await;
    }
}

pub fn services(
    host: &Arc<ExtensionContext>,
    definitions: &Arc<ScriptedDefinitions>,
    fallback: &Arc<RecordingFallback>,
    vocabulary: &Arc<RecordingVocabulary>,
) -> TooltipServices {
    TooltipServices {
        host: host.clone(),
        definitions: definitions.clone(),
        vocabulary: vocabulary.clone(),
        fallback: fallback.clone(),
    }
}

//! 提示框控制器
//!
//! 驱动唯一的提示框：悬停/点击开启新会话，异步结果到达时与当前会话序号比对，
//! 过期结果直接丢弃。点击翻译与超时计时器竞争，回退网页翻译至多触发一次。
//! 超时后点击立即返回，翻译交给后台任务继续等待（最长 [`LATE_TRANSLATION_WINDOW`]），
//! 迟到的译文只在会话仍可见时写入提示框。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use futures::future::BoxFuture;

use super::render::{render_tooltip, STATUS_ADDED};
use super::services::{
    clean_meaning, DefinitionProvider, HostBinding, VocabEntry, VocabExample, VocabularyStore,
    DEFAULT_DECK,
};
use super::session::{LookupRequest, SessionCounter, TooltipPhase, TooltipView};
use crate::config::{DEFAULT_CLICK_TIMEOUT_MS, DEFAULT_TARGET_LANG};
use crate::error::helpers::{log_error, translator_unavailable};
use crate::error::{LexiError, LexiResult};
use crate::parsers::html::annotator::HighlightMarker;
use crate::translation::cache::TranslationCache;
use crate::translation::fallback::{FallbackLatch, FallbackTranslator};
use crate::translation::gateway::TranslatorGateway;

/// 回退触发后继续等待译文的上限
pub const LATE_TRANSLATION_WINDOW: Duration = Duration::from_secs(30);

/// 标记上的交互事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerEvent {
    HoverEnter,
    HoverLeave,
    Click,
}

/// 关闭原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    ClickOutside,
    EscapeKey,
    CloseButton,
}

/// 点击翻译的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickOutcome {
    /// 计时器触发前拿到译文
    Translated,
    /// 超时、失败或结果为空，走了回退
    FellBack,
    /// 宿主失效、单词为空，或错误不需要回退
    Ignored,
}

/// 外部协作者
#[derive(Clone)]
pub struct TooltipServices {
    pub host: Arc<dyn HostBinding>,
    pub definitions: Arc<dyn DefinitionProvider>,
    pub vocabulary: Arc<dyn VocabularyStore>,
    pub fallback: Arc<dyn FallbackTranslator>,
}

/// 控制器设置
#[derive(Debug, Clone)]
pub struct TooltipSettings {
    pub target_lang: String,
    pub click_timeout: Duration,
    pub page_url: String,
}

impl Default for TooltipSettings {
    fn default() -> Self {
        Self {
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            click_timeout: Duration::from_millis(DEFAULT_CLICK_TIMEOUT_MS),
            page_url: String::new(),
        }
    }
}

/// 会话序号与当前视图；后台的迟到译文任务也持有一份
#[derive(Default)]
struct TooltipSurface {
    counter: SessionCounter,
    view: Mutex<TooltipView>,
}

impl TooltipSurface {
    fn lock_view(&self) -> MutexGuard<'_, TooltipView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 会话仍为当前且可见时才修改提示框
    fn apply_if_current<F>(&self, sequence_id: u64, update: F) -> bool
    where
        F: FnOnce(&mut TooltipView),
    {
        let mut view = self.lock_view();
        let current = self.counter.is_current(sequence_id)
            && view.sequence_id() == sequence_id
            && view.phase().is_visible();

        if current {
            update(&mut view);
        } else {
            tracing::debug!(
                "[Lexi] 丢弃过期结果: 会话 {}，当前 {}",
                sequence_id,
                self.counter.current()
            );
        }
        current
    }

    fn show_translation(&self, sequence_id: u64, translation: String) -> bool {
        self.apply_if_current(sequence_id, |view| {
            view.translation = Some(translation);
        })
    }
}

/// 回退的唯一入口：错误需要回退时返回 `true`，闩锁保证页面最多打开一次
fn fall_back(
    latch: &FallbackLatch,
    fallback: &dyn FallbackTranslator,
    error: &LexiError,
    word: &str,
    target_lang: &str,
) -> bool {
    if !error.triggers_fallback() {
        return false;
    }
    if latch.claim() {
        tracing::warn!("[Lexi] 打开网页翻译 {}: {}", word, error);
        fallback.open(word, target_lang);
    } else {
        tracing::debug!("[Lexi] 回退已触发，忽略: {}", error);
    }
    true
}

/// 提示框控制器
pub struct TooltipController {
    services: TooltipServices,
    gateway: Arc<TranslatorGateway>,
    cache: Arc<TranslationCache>,
    surface: Arc<TooltipSurface>,
    target_lang: RwLock<String>,
    click_timeout: Duration,
    page_url: String,
    prewarmed: AtomicBool,
}

impl TooltipController {
    pub fn new(
        services: TooltipServices,
        gateway: Arc<TranslatorGateway>,
        cache: Arc<TranslationCache>,
        settings: TooltipSettings,
    ) -> Self {
        Self {
            services,
            gateway,
            cache,
            surface: Arc::new(TooltipSurface::default()),
            target_lang: RwLock::new(settings.target_lang),
            click_timeout: settings.click_timeout,
            page_url: settings.page_url,
            prewarmed: AtomicBool::new(false),
        }
    }

    /// 当前提示框快照
    pub fn view(&self) -> TooltipView {
        self.lock_view().clone()
    }

    pub fn render_html(&self) -> String {
        render_tooltip(&self.lock_view())
    }

    pub fn current_sequence(&self) -> u64 {
        self.surface.counter.current()
    }

    pub fn target_lang(&self) -> String {
        self.target_lang
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_target_lang(&self, target_lang: &str) {
        *self
            .target_lang
            .write()
            .unwrap_or_else(PoisonError::into_inner) = target_lang.to_string();
    }

    /// 把标记事件分发到对应入口；查询参数在返回 future 之前同步采集
    pub fn dispatch(&self, event: MarkerEvent, marker: &HighlightMarker) -> BoxFuture<'_, ()> {
        match event {
            MarkerEvent::HoverEnter => {
                let request = LookupRequest::from_marker(marker);
                Box::pin(self.hover_enter(request))
            }
            MarkerEvent::HoverLeave => {
                self.hover_leave();
                Box::pin(async {})
            }
            MarkerEvent::Click => {
                let request = LookupRequest::from_marker(marker);
                Box::pin(async move {
                    self.click(request).await;
                })
            }
        }
    }

    /// 悬停：开启新会话，查询释义，再尝试不创建翻译器的悬停翻译
    pub async fn hover_enter(&self, request: LookupRequest) {
        if !self.services.host.is_alive() {
            tracing::debug!("[Lexi] 宿主已失效，忽略悬停");
            return;
        }
        if request.word.is_empty() {
            return;
        }

        let sequence_id = self.begin_session(&request);
        if self.load_definition(sequence_id, &request).await {
            self.hover_translation(sequence_id, &request.word).await;
        }
    }

    /// 鼠标移出：提示框保持打开，只能显式关闭
    pub fn hover_leave(&self) {}

    /// 点击：释义流程与点击翻译并行
    ///
    /// 超时后立即以 [`ClickOutcome::FellBack`] 返回，不等待底层翻译结束。
    pub async fn click(&self, request: LookupRequest) -> ClickOutcome {
        if !self.services.host.is_alive() {
            tracing::debug!("[Lexi] 宿主已失效，忽略点击");
            return ClickOutcome::Ignored;
        }
        if request.word.is_empty() {
            return ClickOutcome::Ignored;
        }
        tracing::debug!("[Lexi] 点击单词: {}", request.word);

        // 同一单词的提示框已打开时沿用当前会话
        let (sequence_id, fresh) = match self.live_session_for(&request.lemma) {
            Some(sequence_id) => (sequence_id, false),
            None => (self.begin_session(&request), true),
        };

        let definition = async {
            if fresh {
                self.load_definition(sequence_id, &request).await;
            }
        };
        let (_, outcome) = tokio::join!(
            definition,
            self.click_translation(sequence_id, &request.word)
        );
        outcome
    }

    /// 关闭提示框；不分配新序号，迟到的结果因阶段为 Hidden 而被丢弃
    pub fn close(&self, reason: CloseReason) {
        let mut view = self.lock_view();
        if view.phase().is_visible() {
            tracing::debug!("[Lexi] 关闭提示框: {:?}", reason);
            view.session.phase = TooltipPhase::Hidden;
        }
    }

    /// 文档点击：点在提示框之外时关闭
    pub fn on_document_click(&self, inside_tooltip: bool) {
        if !inside_tooltip {
            self.close(CloseReason::ClickOutside);
        }
    }

    pub fn on_key(&self, key: &str) {
        if key == "Escape" {
            self.close(CloseReason::EscapeKey);
        }
    }

    /// 首次文档点击时预热目标语言翻译器，之后调用不做任何事
    pub async fn prewarm_once(&self) -> bool {
        if self.prewarmed.swap(true, Ordering::SeqCst) {
            return false;
        }
        let target_lang = self.target_lang();
        self.gateway.prewarm(&target_lang).await
    }

    /// 把当前就绪会话的单词加入生词本
    pub async fn add_to_vocabulary(&self, deck: Option<&str>) -> LexiResult<()> {
        if !self.services.host.is_alive() {
            return Err(LexiError::HostInvalidated);
        }

        let (sequence_id, entry) = {
            let view = self.lock_view();
            if view.phase() != TooltipPhase::Ready
                || !self.surface.counter.is_current(view.sequence_id())
            {
                return Err(LexiError::StaleResult(view.sequence_id()));
            }
            (view.sequence_id(), self.vocab_entry(&view, deck))
        };

        self.services.vocabulary.add(entry).await?;
        self.apply_if_current(sequence_id, |view| {
            view.status = Some(STATUS_ADDED.to_string());
        });
        Ok(())
    }

    fn vocab_entry(&self, view: &TooltipView, deck: Option<&str>) -> VocabEntry {
        let deck = deck
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DECK);

        VocabEntry {
            word: view.session.word.clone(),
            lemma: view.session.lemma.clone(),
            url: self.page_url.clone(),
            meaning: view.meaning.clone(),
            example: view.example.as_ref().map(|example| VocabExample {
                text: example.text.clone(),
                url: self.page_url.clone(),
            }),
            deck: deck.to_string(),
            added_at: Utc::now(),
        }
    }

    fn lock_view(&self) -> MutexGuard<'_, TooltipView> {
        self.surface.lock_view()
    }

    fn begin_session(&self, request: &LookupRequest) -> u64 {
        let mut view = self.lock_view();
        let sequence_id = self.surface.counter.advance();
        *view = TooltipView::loading(sequence_id, request);
        sequence_id
    }

    fn live_session_for(&self, lemma: &str) -> Option<u64> {
        let view = self.lock_view();
        (view.phase().is_visible()
            && view.session.lemma == lemma
            && self.surface.counter.is_current(view.sequence_id()))
        .then(|| view.sequence_id())
    }

    fn apply_if_current<F>(&self, sequence_id: u64, update: F) -> bool
    where
        F: FnOnce(&mut TooltipView),
    {
        self.surface.apply_if_current(sequence_id, update)
    }

    async fn load_definition(&self, sequence_id: u64, request: &LookupRequest) -> bool {
        let result = self
            .services
            .definitions
            .lookup(&request.word, &request.context)
            .await;

        match result {
            Ok(definition) => self.apply_if_current(sequence_id, |view| {
                view.session.phase = TooltipPhase::Ready;
                view.part_of_speech = definition.part_of_speech;
                view.meaning = clean_meaning(&definition.short_meaning);
            }),
            Err(e) => {
                log_error(&e);
                self.apply_if_current(sequence_id, |view| {
                    view.session.phase = TooltipPhase::Error;
                });
                false
            }
        }
    }

    fn show_translation(&self, sequence_id: u64, translation: String) -> bool {
        self.surface.show_translation(sequence_id, translation)
    }

    // 悬停翻译失败一律静默
    async fn hover_translation(&self, sequence_id: u64, word: &str) {
        let target_lang = self.target_lang();

        if let Some(cached) = self.cache.get(word, &target_lang) {
            self.show_translation(sequence_id, cached);
            return;
        }

        let Some(translator) = self.gateway.reuse(&target_lang).await else {
            return;
        };

        match translator.translate(word).await {
            Ok(translation) if !translation.trim().is_empty() => {
                let translation = translation.trim().to_string();
                self.cache.insert(word, &target_lang, &translation);
                self.show_translation(sequence_id, translation);
            }
            Ok(_) => tracing::debug!("[Lexi] 悬停翻译结果为空: {}", word),
            Err(e) => log_error(&e),
        }
    }

    // 返回 'static future，超时后可以移交给后台任务
    fn translation_work(
        &self,
        word: &str,
        target_lang: &str,
    ) -> BoxFuture<'static, LexiResult<String>> {
        let gateway = Arc::clone(&self.gateway);
        let word = word.to_string();
        let target_lang = target_lang.to_string();

        Box::pin(async move {
            let translator = gateway
                .get_or_create(&target_lang, true)
                .await
                .ok_or_else(|| {
                    translator_unavailable(format!("{} -> {}", gateway.source_lang(), target_lang))
                })?;

            let translation = translator.translate(&word).await?;
            let translation = translation.trim();
            if translation.is_empty() {
                return Err(LexiError::EmptyTranslation(word));
            }
            Ok(translation.to_string())
        })
    }

    async fn click_translation(&self, sequence_id: u64, word: &str) -> ClickOutcome {
        let target_lang = self.target_lang();

        if let Some(cached) = self.cache.get(word, &target_lang) {
            self.show_translation(sequence_id, cached);
            return ClickOutcome::Translated;
        }

        let latch = Arc::new(FallbackLatch::new());
        let mut work = self.translation_work(word, &target_lang);

        let early = tokio::select! {
            result = &mut work => Some(result),
            _ = tokio::time::sleep(self.click_timeout) => None,
        };

        let (error, pending) = match early {
            Some(Ok(translation)) => {
                self.cache.insert(word, &target_lang, &translation);
                self.show_translation(sequence_id, translation);
                return ClickOutcome::Translated;
            }
            Some(Err(e)) => (e, None),
            None => {
                let timeout = LexiError::TimeoutError(format!(
                    "{} ({}ms)",
                    word,
                    self.click_timeout.as_millis()
                ));
                (timeout, Some(work))
            }
        };

        log_error(&error);
        let fell_back = fall_back(&latch, self.services.fallback.as_ref(), &error, word, &target_lang);

        if let Some(work) = pending {
            self.spawn_late_translation(sequence_id, word, &target_lang, latch, work);
        }

        if fell_back {
            ClickOutcome::FellBack
        } else {
            ClickOutcome::Ignored
        }
    }

    // 底层请求不取消：迟到的译文写入缓存，会话仍可见时更新提示框
    fn spawn_late_translation(
        &self,
        sequence_id: u64,
        word: &str,
        target_lang: &str,
        latch: Arc<FallbackLatch>,
        work: BoxFuture<'static, LexiResult<String>>,
    ) {
        let surface = Arc::clone(&self.surface);
        let cache = Arc::clone(&self.cache);
        let fallback = Arc::clone(&self.services.fallback);
        let word = word.to_string();
        let target_lang = target_lang.to_string();

        tokio::spawn(async move {
            let result = tokio::time::timeout(LATE_TRANSLATION_WINDOW, work)
                .await
                .unwrap_or_else(|elapsed| Err(elapsed.into()));

            match result {
                Ok(translation) => {
                    tracing::debug!("[Lexi] 回退之后译文到达: {}", word);
                    cache.insert(&word, &target_lang, &translation);
                    surface.show_translation(sequence_id, translation);
                }
                Err(e) => {
                    log_error(&e);
                    fall_back(&latch, fallback.as_ref(), &e, &word, &target_lang);
                }
            }
        });
    }
}

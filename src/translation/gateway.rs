//! 翻译器网关
//!
//! 每个目标语言至多创建一个翻译器。创建需要用户手势（除非调用方放宽），
//! 复用已有翻译器永远不需要手势。检查与写入槽位之间没有 await，
//! 并发请求只会触发一次创建。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use futures::future::{BoxFuture, FutureExt, Shared};

use super::engine::{LanguagePair, TranslationEngine, TranslatorHandle};

type Creation = Shared<BoxFuture<'static, Option<Arc<dyn TranslatorHandle>>>>;

enum Slot {
    Pending(Creation),
    Ready(Arc<dyn TranslatorHandle>),
}

enum Lookup {
    Ready(Arc<dyn TranslatorHandle>),
    Pending(Creation),
    Refused,
}

/// 用户手势状态
pub trait UserActivation: Send + Sync {
    fn is_active(&self) -> bool;
}

/// 由宿主在处理用户输入期间置位的手势标记
#[derive(Debug, Default)]
pub struct GestureFlag {
    depth: AtomicUsize,
}

impl GestureFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 进入用户手势，守卫释放时退出
    pub fn activate(&self) -> GestureGuard<'_> {
        self.depth.fetch_add(1, Ordering::SeqCst);
        GestureGuard { flag: self }
    }
}

impl UserActivation for GestureFlag {
    fn is_active(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }
}

/// 手势守卫
#[must_use]
pub struct GestureGuard<'a> {
    flag: &'a GestureFlag,
}

impl Drop for GestureGuard<'_> {
    fn drop(&mut self) {
        self.flag.depth.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 翻译器网关
pub struct TranslatorGateway {
    engine: Arc<dyn TranslationEngine>,
    activation: Arc<dyn UserActivation>,
    source_lang: String,
    slots: Arc<DashMap<String, Slot>>,
    warmed: DashSet<String>,
    creations: Arc<AtomicUsize>,
}

impl TranslatorGateway {
    pub fn new(
        engine: Arc<dyn TranslationEngine>,
        activation: Arc<dyn UserActivation>,
        source_lang: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            activation,
            source_lang: source_lang.into(),
            slots: Arc::new(DashMap::new()),
            warmed: DashSet::new(),
            creations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    fn pair(&self, target_lang: &str) -> LanguagePair {
        LanguagePair::new(self.source_lang.as_str(), target_lang)
    }

    /// 获取或创建翻译器
    ///
    /// 已存在（或正在创建）则直接复用；否则在 `require_gesture` 且没有用户手势时返回 `None`；
    /// 创建失败记录日志并返回 `None`。
    pub async fn get_or_create(
        &self,
        target_lang: &str,
        require_gesture: bool,
    ) -> Option<Arc<dyn TranslatorHandle>> {
        match self.lookup_or_start(target_lang, require_gesture) {
            Lookup::Ready(handle) => Some(handle),
            Lookup::Pending(creation) => creation.await,
            Lookup::Refused => None,
        }
    }

    /// 只复用、从不创建
    pub async fn reuse(&self, target_lang: &str) -> Option<Arc<dyn TranslatorHandle>> {
        let key = self.pair(target_lang).key();
        let pending = match self.slots.get(&key).as_deref() {
            Some(Slot::Ready(handle)) => return Some(handle.clone()),
            Some(Slot::Pending(creation)) => creation.clone(),
            None => return None,
        };
        pending.await
    }

    /// 已创建完成的翻译器
    pub fn cached(&self, target_lang: &str) -> Option<Arc<dyn TranslatorHandle>> {
        match self.slots.get(&self.pair(target_lang).key()).as_deref() {
            Some(Slot::Ready(handle)) => Some(handle.clone()),
            _ => None,
        }
    }

    /// 在用户手势内预热翻译器
    pub async fn prewarm(&self, target_lang: &str) -> bool {
        let ready = self.get_or_create(target_lang, true).await.is_some();
        if ready {
            self.warmed.insert(target_lang.to_string());
            tracing::debug!("[Lexi] 翻译器已预热: {}", self.pair(target_lang));
        }
        ready
    }

    pub fn is_warm(&self, target_lang: &str) -> bool {
        self.warmed.contains(target_lang) || self.cached(target_lang).is_some()
    }

    /// 向引擎发起过的创建次数
    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    // 同步完成检查与占位，期间不能 await
    fn lookup_or_start(&self, target_lang: &str, require_gesture: bool) -> Lookup {
        let pair = self.pair(target_lang);
        let key = pair.key();

        match self.slots.entry(key.clone()) {
            Entry::Occupied(entry) => match entry.get() {
                Slot::Ready(handle) => Lookup::Ready(handle.clone()),
                Slot::Pending(creation) => Lookup::Pending(creation.clone()),
            },
            Entry::Vacant(entry) => {
                if !self.engine.is_available() {
                    tracing::debug!("[Lexi] 翻译引擎不可用: {}", pair);
                    return Lookup::Refused;
                }
                if require_gesture && !self.activation.is_active() {
                    tracing::debug!("[Lexi] 没有用户手势，跳过创建翻译器: {}", pair);
                    return Lookup::Refused;
                }

                let creation = self.start_creation(pair, key);
                entry.insert(Slot::Pending(creation.clone()));
                Lookup::Pending(creation)
            }
        }
    }

    fn start_creation(&self, pair: LanguagePair, key: String) -> Creation {
        self.creations.fetch_add(1, Ordering::SeqCst);
        let create = self.engine.create(pair.clone());
        let slots = Arc::clone(&self.slots);

        async move {
            match create.await {
                Ok(handle) => {
                    tracing::info!("[Lexi] 翻译器已创建: {}", pair);
                    slots.insert(key, Slot::Ready(handle.clone()));
                    Some(handle)
                }
                Err(e) => {
                    tracing::warn!("[Lexi] 翻译器创建失败 {}: {}", pair, e);
                    slots.remove(&key);
                    None
                }
            }
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LexiError, LexiResult};

    struct EchoHandle;

    impl TranslatorHandle for EchoHandle {
        fn translate(&self, text: &str) -> BoxFuture<'static, LexiResult<String>> {
            let text = text.to_uppercase();
            Box::pin(async move { Ok(text) })
        }
    }

    struct CountingEngine {
        fail: bool,
    }

    impl TranslationEngine for CountingEngine {
        fn create(
            &self,
            pair: LanguagePair,
        ) -> BoxFuture<'static, LexiResult<Arc<dyn TranslatorHandle>>> {
            let fail = self.fail;
            Box::pin(async move {
                tokio::task::yield_now().await;
                if fail {
                    Err(LexiError::TranslatorUnavailable(pair.key()))
                } else {
                    Ok(Arc::new(EchoHandle) as Arc<dyn TranslatorHandle>)
                }
            })
        }
    }

    fn gateway(fail: bool) -> (TranslatorGateway, Arc<GestureFlag>) {
        let flag = Arc::new(GestureFlag::new());
        let gateway =
            TranslatorGateway::new(Arc::new(CountingEngine { fail }), flag.clone(), "en");
        (gateway, flag)
    }

    #[tokio::test]
    async fn test_gesture_gating() {
        let (gateway, flag) = gateway(false);

        assert!(gateway.get_or_create("zh-CN", true).await.is_none());
        assert_eq!(gateway.creations(), 0);

        {
            let _gesture = flag.activate();
            assert!(gateway.get_or_create("zh-CN", true).await.is_some());
        }

        assert!(!flag.is_active());
        assert!(gateway.get_or_create("zh-CN", true).await.is_some());
        assert!(gateway.get_or_create("zh-CN", false).await.is_some());
        assert_eq!(gateway.creations(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_create_once() {
        let (gateway, _flag) = gateway(false);

        let (a, b, c) = tokio::join!(
            gateway.get_or_create("ja", false),
            gateway.get_or_create("ja", false),
            gateway.reuse("ja"),
        );

        assert!(a.is_some() && b.is_some());
        assert!(c.is_some(), "Reuse should await the pending creation");
        assert_eq!(gateway.creations(), 1);
    }

    #[tokio::test]
    async fn test_reuse_never_creates() {
        let (gateway, flag) = gateway(false);
        let _gesture = flag.activate();

        assert!(gateway.reuse("fr").await.is_none());
        assert_eq!(gateway.creations(), 0);
        assert!(!gateway.is_warm("fr"));
    }

    #[tokio::test]
    async fn test_failed_creation_returns_none_and_can_retry() {
        let (gateway, _flag) = gateway(true);

        assert!(gateway.get_or_create("de", false).await.is_none());
        assert!(gateway.cached("de").is_none());
        assert!(gateway.get_or_create("de", false).await.is_none());
        assert_eq!(gateway.creations(), 2);
    }

    #[tokio::test]
    async fn test_prewarm() {
        let (gateway, flag) = gateway(false);

        assert!(!gateway.prewarm("ko").await);
        let _gesture = flag.activate();
        assert!(gateway.prewarm("ko").await);
        assert!(gateway.is_warm("ko"));

        let handle = gateway.cached("ko").unwrap();
        assert_eq!(handle.translate("hi").await.unwrap(), "HI");
    }
}

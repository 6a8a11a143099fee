//! 提示框会话状态

use std::sync::atomic::{AtomicU64, Ordering};

use crate::parsers::html::annotator::HighlightMarker;
use crate::parsers::html::example::{context_sentence, extract_example, Example};

/// 提示框阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TooltipPhase {
    #[default]
    Hidden,
    Loading,
    Ready,
    Error,
}

impl TooltipPhase {
    pub fn is_visible(&self) -> bool {
        !matches!(self, TooltipPhase::Hidden)
    }
}

/// 单调递增的会话序号
#[derive(Debug, Default)]
pub struct SessionCounter {
    current: AtomicU64,
}

impl SessionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 分配新序号，之前的会话随之过期
    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, sequence_id: u64) -> bool {
        self.current() == sequence_id
    }
}

/// 从标记上同步采集的查询参数
///
/// 在第一个 await 之前完成采集，之后的异步流程不再接触 DOM。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupRequest {
    pub word: String,
    pub lemma: String,
    pub context: String,
    pub example: Option<Example>,
}

impl LookupRequest {
    pub fn new(word: &str) -> Self {
        let word = word.trim();
        Self {
            word: word.to_string(),
            lemma: word.to_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn from_marker(marker: &HighlightMarker) -> Self {
        let word = marker.surface_text.trim().to_string();
        Self {
            lemma: marker.normalized_lemma.clone(),
            context: context_sentence(&marker.node),
            example: extract_example(&marker.node, &word),
            word,
        }
    }
}

/// 当前唯一的提示框会话
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TooltipSession {
    pub word: String,
    pub lemma: String,
    pub context_sentence: String,
    pub sequence_id: u64,
    pub phase: TooltipPhase,
}

/// 提示框内容快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TooltipView {
    pub session: TooltipSession,
    pub part_of_speech: String,
    pub meaning: String,
    pub translation: Option<String>,
    pub example: Option<Example>,
    pub status: Option<String>,
}

impl TooltipView {
    /// 新会话的加载态
    pub fn loading(sequence_id: u64, request: &LookupRequest) -> Self {
        Self {
            session: TooltipSession {
                word: request.word.clone(),
                lemma: request.lemma.clone(),
                context_sentence: request.context.clone(),
                sequence_id,
                phase: TooltipPhase::Loading,
            },
            example: request.example.clone(),
            ..Default::default()
        }
    }

    pub fn phase(&self) -> TooltipPhase {
        self.session.phase
    }

    pub fn sequence_id(&self) -> u64 {
        self.session.sequence_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_monotonic() {
        let counter = SessionCounter::new();
        let a = counter.advance();
        let b = counter.advance();

        assert!(b > a);
        assert!(counter.is_current(b));
        assert!(!counter.is_current(a));
    }

    #[test]
    fn test_lookup_request_normalizes() {
        let request = LookupRequest::new("  Serendipity ").with_context("ctx");
        assert_eq!(request.word, "Serendipity");
        assert_eq!(request.lemma, "serendipity");
        assert_eq!(request.context, "ctx");
    }

    #[test]
    fn test_loading_view() {
        let view = TooltipView::loading(4, &LookupRequest::new("word"));
        assert_eq!(view.phase(), TooltipPhase::Loading);
        assert_eq!(view.sequence_id(), 4);
        assert!(view.phase().is_visible());
    }
}

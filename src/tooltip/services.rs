//! 提示框依赖的外部服务：宿主绑定、释义查询、生词本

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::LexiResult;

/// 宿主绑定（例如扩展运行时）是否仍然有效
pub trait HostBinding: Send + Sync {
    fn is_alive(&self) -> bool;
}

/// 可被显式失效的宿主上下文
#[derive(Debug)]
pub struct ExtensionContext {
    alive: AtomicBool,
}

impl Default for ExtensionContext {
    fn default() -> Self {
        Self {
            alive: AtomicBool::new(true),
        }
    }
}

impl ExtensionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟扩展被重新加载
    pub fn invalidate(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            tracing::warn!("[Lexi] 扩展上下文已失效，请刷新页面");
        }
    }
}

impl HostBinding for ExtensionContext {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

/// 释义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub part_of_speech: String,
    pub short_meaning: String,
}

/// 释义提供者
pub trait DefinitionProvider: Send + Sync {
    fn lookup(&self, word: &str, context: &str) -> BoxFuture<'static, LexiResult<Definition>>;
}

/// 去掉释义开头的 `Meaning (...):` 标签
pub fn clean_meaning(raw: &str) -> String {
    static LABEL_RE: OnceLock<Regex> = OnceLock::new();
    let re = LABEL_RE.get_or_init(|| {
        Regex::new(r"(?i)^Meaning\s*\(.*?\)\s*:\s*").expect("meaning label pattern is valid")
    });
    re.replace(raw, "").trim().to_string()
}

/// 未收录单词的提示
pub const UNKNOWN_WORD_HINT: &str = "Click the highlighted word to translate";

/// 内置的小词典
#[derive(Debug, Clone)]
pub struct MiniDictionary {
    entries: HashMap<String, String>,
}

impl Default for MiniDictionary {
    fn default() -> Self {
        Self::with_entries([
            ("ubiquitous", "present or found everywhere"),
            (
                "serendipity",
                "the occurrence of events by chance in a happy way",
            ),
            ("meticulous", "showing great attention to detail; very careful"),
            ("ephemeral", "lasting for a very short time"),
        ])
    }
}

impl MiniDictionary {
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_lowercase(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, word: &str) -> Definition {
        let short_meaning = self
            .entries
            .get(&word.trim().to_lowercase())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_WORD_HINT.to_string());

        Definition {
            part_of_speech: "?".to_string(),
            short_meaning,
        }
    }
}

impl DefinitionProvider for MiniDictionary {
    fn lookup(&self, word: &str, _context: &str) -> BoxFuture<'static, LexiResult<Definition>> {
        let definition = self.get(word);
        Box::pin(async move { Ok(definition) })
    }
}

/// 默认词组
pub const DEFAULT_DECK: &str = "default";

/// 生词本中的例句
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabExample {
    pub text: String,
    pub url: String,
}

/// 发送给生词本的条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub word: String,
    pub lemma: String,
    pub url: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<VocabExample>,
    pub deck: String,
    pub added_at: DateTime<Utc>,
}

/// 生词本存储；核心只关心确认结果
pub trait VocabularyStore: Send + Sync {
    fn add(&self, entry: VocabEntry) -> BoxFuture<'static, LexiResult<()>>;
}

//! 词表存储
//!
//! 按类别惰性加载换行分隔的小写词表，每个会话只加载一次。
//! 加载失败降级为空集合（对"未被排除"而言是 fail-open）。

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::OnceCell;

use crate::error::{LexiError, LexiResult};

/// 词表类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordlistCategory {
    /// 高频词（常用词排除）
    Frequent,
    /// 考试词汇（exam-only 模式的白名单）
    ExamVocabulary,
    /// 额外停用词
    ExtraStopwords,
    /// 基础词汇，只参与专有名词判断
    CoreVocabulary,
}

impl WordlistCategory {
    pub const ALL: [WordlistCategory; 4] = [
        WordlistCategory::Frequent,
        WordlistCategory::ExamVocabulary,
        WordlistCategory::ExtraStopwords,
        WordlistCategory::CoreVocabulary,
    ];

    /// 相对于词表目录的默认文件名
    pub fn file_name(&self) -> &'static str {
        match self {
            WordlistCategory::Frequent => "freq_top5000.txt",
            WordlistCategory::ExamVocabulary => "gre.txt",
            WordlistCategory::ExtraStopwords => "stopwords_extra.txt",
            WordlistCategory::CoreVocabulary => "cet4.txt",
        }
    }

    fn index(&self) -> usize {
        match self {
            WordlistCategory::Frequent => 0,
            WordlistCategory::ExamVocabulary => 1,
            WordlistCategory::ExtraStopwords => 2,
            WordlistCategory::CoreVocabulary => 3,
        }
    }
}

/// 不可变的小写词集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordlistSet {
    words: HashSet<String>,
}

impl WordlistSet {
    /// 解析换行分隔的词表：逐行去空白、转小写、跳过空行
    pub fn parse(text: &str) -> Self {
        let words = text
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// 查询（调用方负责传入小写形式）
    pub fn contains(&self, lowercase: &str) -> bool {
        self.words.contains(lowercase)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// 四类词表在某一时刻的只读快照，分类器只依赖它
#[derive(Debug, Clone, Default)]
pub struct WordlistSnapshot {
    pub frequent: Arc<WordlistSet>,
    pub exam_vocabulary: Arc<WordlistSet>,
    pub extra_stopwords: Arc<WordlistSet>,
    pub core_vocabulary: Arc<WordlistSet>,
}

impl WordlistSnapshot {
    pub fn get(&self, category: WordlistCategory) -> &WordlistSet {
        match category {
            WordlistCategory::Frequent => &self.frequent,
            WordlistCategory::ExamVocabulary => &self.exam_vocabulary,
            WordlistCategory::ExtraStopwords => &self.extra_stopwords,
            WordlistCategory::CoreVocabulary => &self.core_vocabulary,
        }
    }

    /// 是否出现在任一词表中
    pub fn in_any(&self, lowercase: &str) -> bool {
        WordlistCategory::ALL
            .iter()
            .any(|category| self.get(*category).contains(lowercase))
    }
}

/// 词表来源：按路径取回整份文本
pub trait WordlistSource: Send + Sync {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, LexiResult<String>>;
}

/// 从本地目录读取词表
#[derive(Debug, Clone)]
pub struct FsWordlistSource {
    root: PathBuf,
}

impl FsWordlistSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl WordlistSource for FsWordlistSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, LexiResult<String>> {
        Box::pin(async move {
            let full_path = self.root.join(path);
            tokio::fs::read_to_string(&full_path).await.map_err(|e| {
                LexiError::WordlistUnavailable(format!("{}: {}", full_path.display(), e))
            })
        })
    }
}

/// 会话级词表缓存
///
/// 每个类别一个 `OnceCell`，并发的首次访问只会触发一次加载。
pub struct WordlistStore {
    source: Arc<dyn WordlistSource>,
    sets: [OnceCell<Arc<WordlistSet>>; 4],
}

impl WordlistStore {
    pub fn new(source: Arc<dyn WordlistSource>) -> Self {
        Self {
            source,
            sets: Default::default(),
        }
    }

    /// 使用本地目录创建
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FsWordlistSource::new(root)))
    }

    /// 获取某一类词表，首次访问时加载
    pub async fn get(&self, category: WordlistCategory) -> Arc<WordlistSet> {
        self.sets[category.index()]
            .get_or_init(|| self.load(category))
            .await
            .clone()
    }

    /// 已加载则直接返回，不触发加载
    pub fn peek(&self, category: WordlistCategory) -> Option<Arc<WordlistSet>> {
        self.sets[category.index()].get().cloned()
    }

    /// 确保四类词表都已加载，返回快照
    pub async fn ensure_loaded(&self) -> WordlistSnapshot {
        let (frequent, exam_vocabulary, extra_stopwords, core_vocabulary) = futures::join!(
            self.get(WordlistCategory::Frequent),
            self.get(WordlistCategory::ExamVocabulary),
            self.get(WordlistCategory::ExtraStopwords),
            self.get(WordlistCategory::CoreVocabulary),
        );

        WordlistSnapshot {
            frequent,
            exam_vocabulary,
            extra_stopwords,
            core_vocabulary,
        }
    }

    async fn load(&self, category: WordlistCategory) -> Arc<WordlistSet> {
        match self.source.fetch(category.file_name()).await {
            Ok(text) => {
                let set = WordlistSet::parse(&text);
                tracing::debug!("[Lexi] 已加载词表 {:?}: {} 个词", category, set.len());
                Arc::new(set)
            }
            Err(e) => {
                tracing::warn!("[Lexi] 词表 {:?} 加载失败，使用空集合: {}", category, e);
                Arc::new(WordlistSet::default())
            }
        }
    }
}

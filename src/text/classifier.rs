//! 单词分类器
//!
//! 判断一个单词片段是否值得高亮。规则按顺序执行，命中即返回。

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LexiError, LexiResult};
use crate::text::wordlists::WordlistSnapshot;

/// 最短可高亮长度（按字符计）
pub const MIN_WORD_CHARS: usize = 4;

/// 基础停用词（封闭词类）
pub const COMMON: [&str; 25] = [
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from",
];

/// 不按专有名词处理的日历词
pub const CALENDAR_WHITELIST: [&str; 19] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// 高亮模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightMode {
    /// 通过前五条规则即可高亮
    #[default]
    Basic,
    /// 只高亮考试词表中的词
    #[serde(alias = "gre-only")]
    ExamOnly,
}

impl HighlightMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightMode::Basic => "basic",
            HighlightMode::ExamOnly => "exam-only",
        }
    }
}

impl fmt::Display for HighlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HighlightMode {
    type Err = LexiError;

    fn from_str(s: &str) -> LexiResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(HighlightMode::Basic),
            "exam-only" | "gre-only" => Ok(HighlightMode::ExamOnly),
            other => Err(LexiError::ConfigError(format!(
                "高亮模式 '{}' 尚未定义，可用: basic, exam-only",
                other
            ))),
        }
    }
}

fn title_case_regex() -> &'static Regex {
    static TITLE_RE: OnceLock<Regex> = OnceLock::new();
    TITLE_RE.get_or_init(|| {
        Regex::new(r"^[A-Z][a-z]+(?:[-'’][A-Z][a-z]+)*$").expect("title case pattern is valid")
    })
}

fn is_common(lowercase: &str) -> bool {
    COMMON.contains(&lowercase)
}

/// 专有名词启发式：只针对首字母大写形式，全大写缩写不在此过滤
pub fn is_probable_proper_noun(surface: &str, wordlists: &WordlistSnapshot) -> bool {
    if !title_case_regex().is_match(surface) {
        return false;
    }
    if surface.chars().count() <= 2 {
        return false;
    }

    let lowercase = surface.to_lowercase();
    if is_common(&lowercase) || wordlists.in_any(&lowercase) {
        return false;
    }

    !CALENDAR_WHITELIST.contains(&surface)
}

/// 判断单词是否可高亮
///
/// 集合查询不区分大小写，专有名词判断使用原始拼写。
pub fn classify(surface: &str, mode: HighlightMode, wordlists: &WordlistSnapshot) -> bool {
    let lowercase = surface.to_lowercase();

    if lowercase.chars().count() < MIN_WORD_CHARS {
        return false;
    }
    if is_common(&lowercase) {
        return false;
    }
    if wordlists.frequent.contains(&lowercase) {
        return false;
    }
    if wordlists.extra_stopwords.contains(&lowercase) {
        return false;
    }
    if mode != HighlightMode::ExamOnly && is_probable_proper_noun(surface, wordlists) {
        return false;
    }

    match mode {
        // 考试词表为空时不高亮任何词
        HighlightMode::ExamOnly => {
            !wordlists.exam_vocabulary.is_empty() && wordlists.exam_vocabulary.contains(&lowercase)
        }
        HighlightMode::Basic => true,
    }
}

/// 绑定了模式与词表快照的分类器
#[derive(Debug, Clone)]
pub struct Classifier {
    mode: HighlightMode,
    wordlists: WordlistSnapshot,
}

impl Classifier {
    pub fn new(mode: HighlightMode, wordlists: WordlistSnapshot) -> Self {
        Self { mode, wordlists }
    }

    pub fn mode(&self) -> HighlightMode {
        self.mode
    }

    pub fn wordlists(&self) -> &WordlistSnapshot {
        &self.wordlists
    }

    pub fn is_eligible(&self, surface: &str) -> bool {
        classify(surface, self.mode, &self.wordlists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokenizer::tokenize;
    use crate::text::wordlists::WordlistSet;
    use std::sync::Arc;

    fn snapshot(frequent: &[&str], exam: &[&str]) -> WordlistSnapshot {
        WordlistSnapshot {
            frequent: Arc::new(WordlistSet::from_words(frequent)),
            exam_vocabulary: Arc::new(WordlistSet::from_words(exam)),
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_sentence_eligibility() {
        let lists = snapshot(&["the", "is"], &[]);
        let eligible: Vec<&str> = tokenize("The ubiquitous sensor network is remarkable.")
            .filter(|t| t.is_word() && classify(t.text, HighlightMode::Basic, &lists))
            .map(|t| t.text)
            .collect();

        assert_eq!(eligible, vec!["ubiquitous", "sensor", "network", "remarkable"]);
    }

    #[test]
    fn test_proper_noun_rejected_in_basic_mode() {
        let lists = WordlistSnapshot::default();
        assert!(!classify("Boston", HighlightMode::Basic, &lists));
        assert!(is_probable_proper_noun("Boston", &lists));
        assert!(is_probable_proper_noun("Jean-Luc", &lists));
    }

    #[test]
    fn test_calendar_words_are_not_proper_nouns() {
        let lists = WordlistSnapshot::default();
        assert!(!is_probable_proper_noun("Monday", &lists));
        assert!(classify("Monday", HighlightMode::Basic, &lists));

        let frequent = snapshot(&["monday"], &[]);
        assert!(!classify("Monday", HighlightMode::Basic, &frequent));
    }

    #[test]
    fn test_title_case_word_in_wordlist_is_not_proper_noun() {
        let lists = snapshot(&[], &["serendipity"]);
        assert!(!is_probable_proper_noun("Serendipity", &lists));
        assert!(classify("Serendipity", HighlightMode::Basic, &lists));

        let core_only = WordlistSnapshot {
            core_vocabulary: Arc::new(WordlistSet::from_words(["river"])),
            ..Default::default()
        };
        assert!(!is_probable_proper_noun("River", &core_only));
        assert!(is_probable_proper_noun("Danube", &core_only));
    }

    #[test]
    fn test_acronyms_not_filtered_by_heuristic() {
        let lists = WordlistSnapshot::default();
        assert!(!is_probable_proper_noun("NASA", &lists));
        assert!(classify("NASA", HighlightMode::Basic, &lists));
    }

    #[test]
    fn test_short_and_common_words_rejected() {
        let lists = WordlistSnapshot::default();
        assert!(!classify("cat", HighlightMode::Basic, &lists));
        assert!(!classify("that", HighlightMode::Basic, &lists));
        assert!(!classify("THAT", HighlightMode::Basic, &lists));
    }

    #[test]
    fn test_extra_stopwords_rejected() {
        let lists = WordlistSnapshot {
            extra_stopwords: Arc::new(WordlistSet::from_words(["however"])),
            ..Default::default()
        };
        assert!(!classify("However", HighlightMode::ExamOnly, &lists));
        assert!(!classify("however", HighlightMode::Basic, &lists));
    }

    #[test]
    fn test_exam_only_requires_membership() {
        let lists = snapshot(&[], &["ubiquitous"]);
        assert!(classify("ubiquitous", HighlightMode::ExamOnly, &lists));
        assert!(classify("Ubiquitous", HighlightMode::ExamOnly, &lists));
        assert!(!classify("sensor", HighlightMode::ExamOnly, &lists));
    }

    #[test]
    fn test_exam_only_with_empty_list_allows_nothing() {
        let lists = WordlistSnapshot::default();
        assert!(!classify("ubiquitous", HighlightMode::ExamOnly, &lists));
    }

    #[test]
    fn test_exam_only_skips_proper_noun_heuristic() {
        let lists = snapshot(&[], &["boston"]);
        assert!(classify("Boston", HighlightMode::ExamOnly, &lists));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let lists = snapshot(&["network"], &["sensor"]);
        let classifier = Classifier::new(HighlightMode::Basic, lists);
        for word in ["network", "sensor", "Boston", "remarkable"] {
            assert_eq!(classifier.is_eligible(word), classifier.is_eligible(word));
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("basic".parse::<HighlightMode>().unwrap(), HighlightMode::Basic);
        assert_eq!("gre-only".parse::<HighlightMode>().unwrap(), HighlightMode::ExamOnly);
        assert_eq!(" Exam-Only ".parse::<HighlightMode>().unwrap(), HighlightMode::ExamOnly);

        let err = "exclude-cet4".parse::<HighlightMode>().unwrap_err();
        assert!(err.to_string().contains("exclude-cet4"));
    }

    #[test]
    fn test_mode_serde_alias() {
        let mode: HighlightMode = serde_json::from_str("\"gre-only\"").unwrap();
        assert_eq!(mode, HighlightMode::ExamOnly);
        assert_eq!(serde_json::to_string(&mode).unwrap(), "\"exam-only\"");
    }
}

//! 单词翻译缓存
//!
//! 键为（小写单词，目标语言），会话内只追加、不淘汰。

use dashmap::DashMap;

/// 翻译缓存
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: DashMap<(String, String), String>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(word: &str, target_lang: &str) -> (String, String) {
        (word.trim().to_lowercase(), target_lang.to_string())
    }

    /// 查询缓存
    pub fn get(&self, word: &str, target_lang: &str) -> Option<String> {
        self.entries
            .get(&Self::key(word, target_lang))
            .map(|entry| entry.value().clone())
    }

    /// 写入缓存；空译文不缓存，已有条目不会被覆盖
    pub fn insert(&self, word: &str, target_lang: &str, translation: &str) {
        if translation.trim().is_empty() {
            return;
        }
        self.entries
            .entry(Self::key(word, target_lang))
            .or_insert_with(|| translation.to_string());
    }

    pub fn contains(&self, word: &str, target_lang: &str) -> bool {
        self.entries.contains_key(&Self::key(word, target_lang))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_by_lowercase_word_and_language() {
        let cache = TranslationCache::new();
        cache.insert("Ubiquitous", "zh-CN", "无处不在的");

        assert_eq!(cache.get("ubiquitous", "zh-CN").as_deref(), Some("无处不在的"));
        assert_eq!(cache.get("UBIQUITOUS", "zh-CN").as_deref(), Some("无处不在的"));
        assert!(cache.get("ubiquitous", "ja").is_none());
    }

    #[test]
    fn test_append_only() {
        let cache = TranslationCache::new();
        cache.insert("word", "ja", "first");
        cache.insert("word", "ja", "second");
        cache.insert("empty", "ja", "  ");

        assert_eq!(cache.get("word", "ja").as_deref(), Some("first"));
        assert!(!cache.contains("empty", "ja"));
        assert_eq!(cache.len(), 1);
    }
}

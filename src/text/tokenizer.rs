//! 分词器
//!
//! 把一段文本切分为单词与分隔符两类片段。片段按顺序首尾相接，
//! 拼接后与原文逐字节一致；只保证"够用"的切分，不做任何 Unicode 规范化。

use std::sync::OnceLock;

use regex::{Match, Regex};

/// 片段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Word,
    Separator,
}

/// 分词结果片段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// 片段在原文中的字节偏移
    pub offset: usize,
}

impl<'a> Token<'a> {
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    /// 片段结束位置（不含）
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// 字母串，内部允许连字符与撇号（含弯撇号），首尾必须是字母
fn word_regex() -> &'static Regex {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    WORD_RE.get_or_init(|| {
        Regex::new(r"[A-Za-z]+(?:['’\-]+[A-Za-z]+)*").expect("word pattern is valid")
    })
}

/// 惰性的片段迭代器
///
/// 纯函数式：同一输入总是产生同一序列，`clone()` 即可从当前位置重新开始。
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    pos: usize,
    pending: Option<Match<'a>>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }

        let found = self
            .pending
            .take()
            .or_else(|| word_regex().find_at(self.text, self.pos));

        match found {
            Some(m) if m.start() > self.pos => {
                // 先吐出单词前面的分隔符，单词留到下一次
                let token = Token {
                    kind: TokenKind::Separator,
                    text: &self.text[self.pos..m.start()],
                    offset: self.pos,
                };
                self.pos = m.start();
                self.pending = Some(m);
                Some(token)
            }
            Some(m) => {
                self.pos = m.end();
                Some(Token {
                    kind: TokenKind::Word,
                    text: m.as_str(),
                    offset: m.start(),
                })
            }
            None => {
                let token = Token {
                    kind: TokenKind::Separator,
                    text: &self.text[self.pos..],
                    offset: self.pos,
                };
                self.pos = self.text.len();
                Some(token)
            }
        }
    }
}

/// 对文本分词
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens {
        text,
        pos: 0,
        pending: None,
    }
}

/// 是否包含至少一个单词片段
pub fn has_words(text: &str) -> bool {
    word_regex().is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(text: &str) -> String {
        tokenize(text).map(|t| t.text).collect()
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let samples = [
            "",
            " ",
            "The ubiquitous sensor network is remarkable.",
            "well-known rock'n'roll — don’t stop",
            "abc123def!!",
            "   leading and trailing   ",
            "中文 mixed with English, 123.",
            "trailing-hyphen- and 'quoted'",
        ];

        for sample in samples {
            assert_eq!(joined(sample), sample, "Round trip failed for {:?}", sample);
        }
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let text = "Hello, brave new-world!";
        let mut expected = 0;
        for token in tokenize(text) {
            assert_eq!(token.offset, expected);
            expected = token.end();
        }
        assert_eq!(expected, text.len());
    }

    #[test]
    fn test_word_segmentation() {
        let words: Vec<&str> = tokenize("It's a well-known don’t-care case: rock-")
            .filter(Token::is_word)
            .map(|t| t.text)
            .collect();

        assert_eq!(words, vec!["It's", "a", "well-known", "don’t-care", "case", "rock"]);
    }

    #[test]
    fn test_digits_split_words() {
        let tokens: Vec<(TokenKind, &str)> =
            tokenize("abc123def").map(|t| (t.kind, t.text)).collect();
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Word, "abc"),
                (TokenKind::Separator, "123"),
                (TokenKind::Word, "def"),
            ]
        );
    }

    #[test]
    fn test_restartable_sequence() {
        let mut tokens = tokenize("one two three");
        tokens.next();
        let rest: Vec<_> = tokens.clone().collect();
        let again: Vec<_> = tokens.collect();
        assert_eq!(rest, again);
    }

    #[test]
    fn test_separator_only_text() {
        let tokens: Vec<_> = tokenize(" 42 — ").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Separator);
        assert!(!has_words(" 42 — "));
    }
}

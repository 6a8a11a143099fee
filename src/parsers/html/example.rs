//! 例句提取

use markup5ever_rcdom::Handle;
use regex::Regex;

use super::dom::{closest_ancestor, parent_element, text_content};
use super::utils::{collapse_whitespace, escape_html, truncate_chars};

/// 例句最大长度（字符）
pub const MAX_EXAMPLE_CHARS: usize = 260;
/// 释义请求附带的上下文最大长度（字符）
pub const MAX_CONTEXT_CHARS: usize = 200;
/// 例句所在的块级祖先
pub const BLOCK_TAGS: [&str; 9] = ["p", "li", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6"];
/// 提取文本时跳过的元素
const NON_TEXT_TAGS: [&str; 3] = ["script", "style", "noscript"];

/// 例句中包裹目标词的元素类名
pub const SENTENCE_MARK_CLASS: &str = "lexi-mark-in-sent";

/// 提取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    /// 纯文本例句
    pub text: String,
    /// 已转义、目标词被 `<mark>` 包裹的 HTML
    pub html: String,
}

/// 在标记所在的块中寻找最佳例句
pub fn extract_example(marker: &Handle, word: &str) -> Option<Example> {
    let block = closest_ancestor(marker, &BLOCK_TAGS).or_else(|| parent_element(marker))?;
    let raw = collapse_whitespace(&text_content(&block, &NON_TEXT_TAGS));
    best_sentence(&raw, word)
}

/// 释义请求的上下文：最近的 `<p>`，否则父元素文本的前 200 个字符
pub fn context_sentence(marker: &Handle) -> String {
    closest_ancestor(marker, &["p"])
        .or_else(|| parent_element(marker))
        .map(|block| {
            let text = text_content(&block, &NON_TEXT_TAGS);
            truncate_chars(&text, MAX_CONTEXT_CHARS).to_string()
        })
        .unwrap_or_default()
}

/// 按句末标点（后跟空白）切分
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
            let end = index + c.len_utf8();
            sentences.push(text[start..end].trim());
            start = end;
        }
    }
    sentences.push(text[start..].trim());

    sentences.retain(|s| !s.is_empty());
    sentences
}

fn whole_word_regex(word: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))).ok()
}

/// 从已折叠空白的文本中挑选例句
///
/// 优先选择包含目标词（整词、不区分大小写）的第一句，否则取第一句。
pub fn best_sentence(text: &str, word: &str) -> Option<Example> {
    let sentences = split_sentences(text);
    let word_re = whole_word_regex(word.trim());

    let best = word_re
        .as_ref()
        .and_then(|re| sentences.iter().find(|s| re.is_match(s)))
        .or_else(|| sentences.first())?;
    let best = truncate_chars(best, MAX_EXAMPLE_CHARS);

    Some(Example {
        text: best.to_string(),
        html: highlight(best, word_re.as_ref()),
    })
}

fn highlight(sentence: &str, word_re: Option<&Regex>) -> String {
    let Some(re) = word_re else {
        return escape_html(sentence);
    };

    let mut html = String::with_capacity(sentence.len() + 32);
    let mut last = 0;
    for m in re.find_iter(sentence) {
        html.push_str(&escape_html(&sentence[last..m.start()]));
        html.push_str(&format!(
            "<mark class=\"{}\">{}</mark>",
            SENTENCE_MARK_CLASS,
            escape_html(m.as_str())
        ));
        last = m.end();
    }
    html.push_str(&escape_html(&sentence[last..]));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{find_nodes, html_to_dom};

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("One. Two! Three? Four"),
            vec!["One.", "Two!", "Three?", "Four"]
        );
        assert_eq!(split_sentences("v1.2 is out."), vec!["v1.2 is out."]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_picks_sentence_with_word() {
        let text = "Sensors are cheap. Networks are ubiquitous now. Ubiquitous again.";
        let example = best_sentence(text, "ubiquitous").unwrap();

        assert_eq!(example.text, "Networks are ubiquitous now.");
        assert_eq!(
            example.html,
            "Networks are <mark class=\"lexi-mark-in-sent\">ubiquitous</mark> now."
        );
    }

    #[test]
    fn test_whole_word_case_insensitive() {
        let text = "Unsensored text here. The SENSOR works.";
        let example = best_sentence(text, "sensor").unwrap();
        assert_eq!(example.text, "The SENSOR works.");
    }

    #[test]
    fn test_falls_back_to_first_sentence() {
        let example = best_sentence("First one. Second one.", "absent").unwrap();
        assert_eq!(example.text, "First one.");
        assert_eq!(example.html, "First one.");
    }

    #[test]
    fn test_truncates_and_escapes() {
        let long = format!("<b> {} meticulous", "x".repeat(400));
        let example = best_sentence(&long, "meticulous").unwrap();

        assert_eq!(example.text.chars().count(), MAX_EXAMPLE_CHARS);
        assert!(example.html.starts_with("&lt;b&gt;"));
        assert!(!example.html.contains("<mark"), "Truncated word is not highlighted");
    }

    #[test]
    fn test_extract_from_dom_block() {
        let html = "<html><body><ul><li>Intro text. A <span class=\"lexi-mark\">meticulous</span> \
                    plan\n  works.</li></ul></body></html>";
        let dom = html_to_dom(html.as_bytes(), "utf-8").unwrap();
        let span = find_nodes(&dom.document, &["span"]).pop().unwrap();

        let example = extract_example(&span, "meticulous").unwrap();
        assert_eq!(example.text, "A meticulous plan works.");
        assert_eq!(context_sentence(&span), "Intro text. A meticulous plan\n  works.");
    }
}

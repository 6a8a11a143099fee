use markup5ever_rcdom::Handle;

use super::dom::{find_nodes, get_node_attr};

/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// HTML 转义（文本与属性值通用）
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 把任意空白序列折叠为单个空格并去掉首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 按字符数截断
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// 读取文档声明的字符集（`<meta charset>` 或 `http-equiv=content-type`）
pub fn get_charset(document: &Handle) -> Option<String> {
    for meta in find_nodes(document, &["html", "head", "meta"]) {
        if let Some(charset) = get_node_attr(&meta, "charset") {
            return Some(charset.trim().to_string());
        }

        let is_content_type = get_node_attr(&meta, "http-equiv")
            .is_some_and(|v| v.eq_ignore_ascii_case("content-type"));
        if is_content_type {
            if let Some(content) = get_node_attr(&meta, "content") {
                return charset_from_content_type(&content);
            }
        }
    }

    None
}

/// 从 `text/html; charset=...` 中取出字符集
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|part| part.trim_matches(WHITESPACES))
        .find_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"').to_string())
        })
        .filter(|charset| !charset.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::html_to_dom;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_collapse_and_truncate() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn test_charset_detection() {
        let dom = html_to_dom(b"<html><head><meta charset=\"GBK\"></head></html>", "utf-8").unwrap();
        assert_eq!(get_charset(&dom.document).as_deref(), Some("GBK"));

        let dom = html_to_dom(
            b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=latin1\"></head></html>",
            "utf-8",
        )
        .unwrap();
        assert_eq!(get_charset(&dom.document).as_deref(), Some("latin1"));

        assert_eq!(
            charset_from_content_type("text/html; Charset=\"utf-8\"").as_deref(),
            Some("utf-8")
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }
}

use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, RcDom, SerializableHandle};

use super::annotator::MARKER_CLASS;
use super::dom::{get_child_node_by_name, get_node_attr, new_element};
use crate::error::{LexiError, LexiResult};

/// 注入到输出文档中的标记样式
pub const MARKER_STYLE_ID: &str = "lexi-style";

fn marker_stylesheet() -> String {
    format!(
        ".{c}{{background:rgba(255,214,102,.35);border-bottom:1px dotted #c90;cursor:pointer}}",
        c = MARKER_CLASS
    )
}

/// 序列化文档
///
/// `inject_style` 为真时在 `<head>` 开头插入标记样式（已存在则跳过）。
pub fn serialize_document(
    dom: &RcDom,
    document_encoding: &str,
    inject_style: bool,
) -> LexiResult<Vec<u8>> {
    if inject_style {
        inject_marker_style(dom);
    }

    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = dom.document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())
        .map_err(|e| LexiError::InternalError(format!("无法序列化 DOM: {}", e)))?;

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let s = String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(&s);
            buf = data.into_owned();
        }
    }

    Ok(buf)
}

/// 序列化单个节点的子树（文档节点则序列化其全部子节点）
pub fn serialize_node(node: &Handle) -> LexiResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    serialize(&mut buf, &serializable, opts)
        .map_err(|e| LexiError::InternalError(format!("无法序列化节点: {}", e)))?;

    String::from_utf8(buf).map_err(|e| LexiError::InternalError(e.to_string()))
}

fn inject_marker_style(dom: &RcDom) {
    let Some(html) = get_child_node_by_name(&dom.document, "html") else {
        return;
    };
    let Some(head) = get_child_node_by_name(&html, "head") else {
        return;
    };
    let already = head
        .children
        .borrow()
        .iter()
        .any(|child| get_node_attr(child, "id").as_deref() == Some(MARKER_STYLE_ID));
    if already {
        return;
    }

    let style = new_element("style", &[("id", MARKER_STYLE_ID)], Some(&marker_stylesheet()));
    style.parent.set(Some(Rc::downgrade(&head)));
    head.children.borrow_mut().insert(0, style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::html_to_dom;

    #[test]
    fn test_style_injected_once() {
        let dom = html_to_dom(b"<html><head></head><body>x</body></html>", "utf-8").unwrap();

        serialize_document(&dom, "", true).unwrap();
        let out = String::from_utf8(serialize_document(&dom, "", true).unwrap()).unwrap();

        assert_eq!(out.matches(MARKER_STYLE_ID).count(), 1);
        assert!(out.contains(".lexi-mark{"));
    }

    #[test]
    fn test_encoding_applied() {
        let dom = html_to_dom("<p>café</p>".as_bytes(), "utf-8").unwrap();
        let out = serialize_document(&dom, "iso-8859-1", false).unwrap();
        assert!(out.windows(4).any(|w| w == b"caf\xe9"));
    }
}

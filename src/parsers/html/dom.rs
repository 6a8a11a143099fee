//! rcdom 树操作助手

use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::tree_builder::create_element;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

use crate::error::{LexiError, LexiResult};

/// 将 HTML 字节按给定编码解码后解析为 DOM
///
/// 编码标签无法识别时按 UTF-8（有损）解码。
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> LexiResult<RcDom> {
    let text = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => encoding.decode(data).0.into_owned(),
        None => String::from_utf8_lossy(data).into_owned(),
    };

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut text.as_bytes())
        .map_err(|e| LexiError::ParseError(format!("HTML 解析失败: {}", e)))
}

/// 按标签路径查找节点，例如 `["html", "body"]`
pub fn find_nodes(node: &Handle, path: &[&str]) -> Vec<Handle> {
    let mut found = Vec::new();
    let Some((first, rest)) = path.split_first() else {
        return found;
    };

    if get_node_name(node) == Some(*first) {
        if rest.is_empty() {
            found.push(node.clone());
        } else {
            for child in node.children.borrow().iter() {
                found.extend(find_nodes(child, rest));
            }
            return found;
        }
    }

    for child in node.children.borrow().iter() {
        found.extend(find_nodes(child, path));
    }

    found
}

/// 根据名称获取直接子元素
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| get_node_name(child) == Some(node_name))
        .cloned()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 获取元素名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点（不改变节点的父指针）
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    child.parent.set(weak);
    parent
}

/// 设置或删除（`None`）节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    let NodeData::Element { attrs, .. } = &node.data else {
        return;
    };
    let mut attrs = attrs.borrow_mut();

    match attr_value {
        Some(value) => {
            if let Some(attr) = attrs.iter_mut().find(|a| &*a.name.local == attr_name) {
                attr.value = format_tendril!("{}", value);
            } else {
                attrs.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: format_tendril!("{}", value),
                });
            }
        }
        None => attrs.retain(|a| &*a.name.local != attr_name),
    }
}

/// `class` 属性中是否包含给定类名
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

/// 文本节点内容
pub fn text_of(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 节点的全部文本内容；`skip` 中的元素子树被忽略
pub fn text_content(node: &Handle, skip: &[&str]) -> String {
    let mut out = String::new();
    collect_text(node, skip, &mut out);
    out
}

fn collect_text(node: &Handle, skip: &[&str], out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } if skip.contains(&name.local.as_ref()) => {}
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, skip, out);
            }
        }
    }
}

/// 向上查找最近的、标签名在 `names` 中的祖先元素（不含自身）
pub fn closest_ancestor(node: &Handle, names: &[&str]) -> Option<Handle> {
    let mut current = get_parent_node(node);
    while let Some(candidate) = current {
        if get_node_name(&candidate).is_some_and(|name| names.contains(&name)) {
            return Some(candidate);
        }
        current = get_parent_node(&candidate);
    }
    None
}

/// 最近的元素父节点
pub fn parent_element(node: &Handle) -> Option<Handle> {
    get_parent_node(node).filter(|parent| get_node_name(parent).is_some())
}

/// 创建游离的文本节点
pub fn new_text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

/// 创建游离的元素节点，`text` 非空时附带一个文本子节点
pub fn new_element(tag: &str, attrs: &[(&str, &str)], text: Option<&str>) -> Handle {
    let scratch = RcDom::default();
    let element = create_element(
        &scratch,
        QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*name)),
                value: format_tendril!("{}", value),
            })
            .collect(),
    );

    if let Some(text) = text {
        append_child(&element, new_text_node(text));
    }

    element
}

/// 追加子节点并设置父指针
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 用一组新节点替换 `target`；返回 `false` 表示节点已脱离文档
pub fn replace_node(target: &Handle, replacements: Vec<Handle>) -> bool {
    let Some(parent) = get_parent_node(target) else {
        return false;
    };

    let mut children = parent.children.borrow_mut();
    let Some(index) = children.iter().position(|c| Rc::ptr_eq(c, target)) else {
        return false;
    };

    for node in &replacements {
        node.parent.set(Some(Rc::downgrade(&parent)));
    }
    children.splice(index..=index, replacements);
    target.parent.set(None);

    true
}

/// 合并相邻文本节点，丢弃空文本节点
pub fn normalize_text_children(parent: &Handle) {
    let mut children = parent.children.borrow_mut();
    let mut merged: Vec<Handle> = Vec::with_capacity(children.len());

    for child in children.drain(..) {
        let Some(text) = text_of(&child) else {
            merged.push(child);
            continue;
        };
        if text.is_empty() {
            child.parent.set(None);
            continue;
        }

        if let Some(NodeData::Text { contents }) = merged.last().map(|last| &last.data) {
            contents.borrow_mut().push_slice(&text);
            child.parent.set(None);
        } else {
            merged.push(child);
        }
    }

    *children = merged;
}

//! 页面标注器
//!
//! 扫描可见文本节点，把可高亮的单词包装成标记元素；`clear` 是 `scan` 的精确逆操作。

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use markup5ever_rcdom::{Handle, NodeData};

use super::dom::{
    find_nodes, get_node_attr, get_node_name, get_parent_node, has_class, new_element,
    new_text_node, normalize_text_children, replace_node, text_content, text_of,
};
use super::visibility::{StaticVisibility, VisibilityProbe};
use crate::text::classifier::Classifier;
use crate::text::tokenizer::{has_words, tokenize, Token};

/// 标记元素的类名
pub const MARKER_CLASS: &str = "lexi-mark";
/// 标记元素上保存小写词形的属性
pub const LEMMA_ATTR: &str = "data-lemma";
/// 标记元素使用的标签
pub const MARKER_TAG: &str = "span";

/// 不扫描的元素子树
pub const IGNORED_TAGS: [&str; 10] = [
    "script", "style", "noscript", "code", "pre", "textarea", "input", "img", "video", "audio",
];

/// 标注片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentPiece {
    Text(String),
    Marker { surface: String, lemma: String },
}

impl FragmentPiece {
    pub fn text(&self) -> &str {
        match self {
            FragmentPiece::Text(text) => text,
            FragmentPiece::Marker { surface, .. } => surface,
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, FragmentPiece::Marker { .. })
    }
}

/// 小写词形
pub fn normalize_lemma(surface: &str) -> String {
    surface.to_lowercase()
}

/// 把片段序列转换为标注片段，相邻的普通文本合并为一段
///
/// 与 DOM 无关；片段文本按顺序拼接后与输入一致。
pub fn compute_annotated_fragment<'a, I, F>(tokens: I, mut eligible: F) -> Vec<FragmentPiece>
where
    I: IntoIterator<Item = Token<'a>>,
    F: FnMut(&str) -> bool,
{
    let mut pieces: Vec<FragmentPiece> = Vec::new();

    for token in tokens {
        if token.is_word() && eligible(token.text) {
            pieces.push(FragmentPiece::Marker {
                surface: token.text.to_string(),
                lemma: normalize_lemma(token.text),
            });
            continue;
        }

        match pieces.last_mut() {
            Some(FragmentPiece::Text(text)) => text.push_str(token.text),
            _ => pieces.push(FragmentPiece::Text(token.text.to_string())),
        }
    }

    pieces
}

/// 页面上的一个高亮标记
#[derive(Debug, Clone)]
pub struct HighlightMarker {
    pub node: Handle,
    pub surface_text: String,
    pub normalized_lemma: String,
}

impl HighlightMarker {
    /// 节点是标记元素时构造
    pub fn from_handle(node: &Handle) -> Option<Self> {
        if !is_marker(node) {
            return None;
        }
        let surface_text = text_content(node, &[]);
        let normalized_lemma =
            get_node_attr(node, LEMMA_ATTR).unwrap_or_else(|| normalize_lemma(&surface_text));

        Some(Self {
            node: node.clone(),
            surface_text,
            normalized_lemma,
        })
    }

    /// 标记是否仍在文档树中
    pub fn is_attached(&self) -> bool {
        get_parent_node(&self.node).is_some()
    }
}

impl PartialEq for HighlightMarker {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

/// 节点是否为标记元素
pub fn is_marker(node: &Handle) -> bool {
    get_node_name(node) == Some(MARKER_TAG) && has_class(node, MARKER_CLASS)
}

/// 单次扫描的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// 被替换的文本节点数
    pub nodes_rewritten: usize,
    /// 新建的标记数
    pub markers_created: usize,
    /// 本轮实际执行分类的不同拼写数
    pub words_classified: usize,
}

/// DOM 标注器
#[derive(Clone)]
pub struct Annotator {
    visibility: Arc<dyn VisibilityProbe>,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(Arc::new(StaticVisibility))
    }
}

impl Annotator {
    pub fn new(visibility: Arc<dyn VisibilityProbe>) -> Self {
        Self { visibility }
    }

    /// 扫描并标注 `root` 之下（存在 `<body>` 时只扫描 body）的可见文本
    pub fn scan(&self, root: &Handle, classifier: &Classifier) -> ScanReport {
        let scope = find_nodes(root, &["body"])
            .into_iter()
            .next()
            .unwrap_or_else(|| root.clone());

        let mut text_nodes = Vec::new();
        self.collect_text_nodes(&scope, &mut text_nodes);

        // 同一轮扫描内每个拼写只分类一次
        let mut verdicts: HashMap<String, bool> = HashMap::new();
        let mut report = ScanReport::default();
        let mut rewrites = Vec::new();

        for node in text_nodes {
            let Some(text) = text_of(&node) else {
                continue;
            };
            let pieces = compute_annotated_fragment(tokenize(&text), |word| {
                *verdicts
                    .entry(word.to_string())
                    .or_insert_with(|| classifier.is_eligible(word))
            });

            let markers = pieces.iter().filter(|p| p.is_marker()).count();
            if markers > 0 {
                report.markers_created += markers;
                rewrites.push((node, pieces));
            }
        }
        report.words_classified = verdicts.len();

        // 收集完成后再统一替换
        for (node, pieces) in rewrites {
            if replace_node(&node, pieces.iter().map(build_piece).collect()) {
                report.nodes_rewritten += 1;
            }
        }

        tracing::debug!(
            "[Lexi] 标注完成: {} 个文本节点, {} 个标记, 模式 {}",
            report.nodes_rewritten,
            report.markers_created,
            classifier.mode()
        );
        report
    }

    /// 把所有标记还原为普通文本，返回移除的标记数
    pub fn clear(&self, root: &Handle) -> usize {
        let mut markers = Vec::new();
        collect_markers(root, &mut markers);

        let mut parents: Vec<Handle> = Vec::new();
        for marker in &markers {
            let Some(parent) = get_parent_node(marker) else {
                continue;
            };
            let surface = text_content(marker, &[]);
            if replace_node(marker, vec![new_text_node(&surface)])
                && !parents.iter().any(|p| Rc::ptr_eq(p, &parent))
            {
                parents.push(parent);
            }
        }

        for parent in &parents {
            normalize_text_children(parent);
        }

        if !markers.is_empty() {
            tracing::debug!("[Lexi] 已清除 {} 个标记", markers.len());
        }
        markers.len()
    }

    /// 先清除再扫描，避免残留旧模式下的标记
    pub fn rescan(&self, root: &Handle, classifier: &Classifier) -> ScanReport {
        self.clear(root);
        self.scan(root, classifier)
    }

    /// 文档中当前的全部标记（文档顺序）
    pub fn markers(&self, root: &Handle) -> Vec<HighlightMarker> {
        let mut nodes = Vec::new();
        collect_markers(root, &mut nodes);
        nodes.iter().filter_map(HighlightMarker::from_handle).collect()
    }

    fn collect_text_nodes(&self, node: &Handle, out: &mut Vec<Handle>) {
        for child in node.children.borrow().iter() {
            match &child.data {
                NodeData::Text { contents } => {
                    if has_words(&contents.borrow()) {
                        out.push(child.clone());
                    }
                }
                NodeData::Element { name, .. } => {
                    let tag = name.local.as_ref();
                    if IGNORED_TAGS.contains(&tag)
                        || is_marker(child)
                        || !self.visibility.is_visible(child)
                    {
                        continue;
                    }
                    self.collect_text_nodes(child, out);
                }
                _ => {}
            }
        }
    }
}

fn build_piece(piece: &FragmentPiece) -> Handle {
    match piece {
        FragmentPiece::Text(text) => new_text_node(text),
        FragmentPiece::Marker { surface, lemma } => new_element(
            MARKER_TAG,
            &[("class", MARKER_CLASS), (LEMMA_ATTR, lemma)],
            Some(surface),
        ),
    }
}

fn collect_markers(node: &Handle, out: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if is_marker(child) {
            out.push(child.clone());
        } else {
            collect_markers(child, out);
        }
    }
}

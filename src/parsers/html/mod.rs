//! HTML 解析、标注与序列化
//!
//! - `dom`: rcdom 树操作
//! - `visibility`: 元素可见性探测
//! - `annotator`: 扫描/清除高亮标记
//! - `example`: 例句与上下文提取
//! - `serializer`: 序列化输出
//! - `utils`: 转义、空白处理、字符集探测

pub mod annotator;
pub mod dom;
pub mod example;
pub mod serializer;
pub mod utils;
pub mod visibility;

pub use annotator::{
    compute_annotated_fragment, Annotator, FragmentPiece, HighlightMarker, ScanReport,
    IGNORED_TAGS, LEMMA_ATTR, MARKER_CLASS,
};
pub use dom::{find_nodes, get_node_attr, get_node_name, html_to_dom, set_node_attr};
pub use example::{context_sentence, extract_example, Example};
pub use serializer::{serialize_document, serialize_node};
pub use utils::{escape_html, get_charset};
pub use visibility::{StaticVisibility, VisibilityProbe};

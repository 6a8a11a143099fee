//! # 解析器模块
//!
//! 目前只有 HTML：文档解析、可见文本扫描、标记注入与还原、例句提取。

pub mod html;

pub use html::{html_to_dom, serialize_document, Annotator, HighlightMarker};

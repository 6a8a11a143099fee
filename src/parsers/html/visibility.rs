//! 元素可见性判断
//!
//! 没有布局引擎时只能做静态推断：`hidden` 属性、内联样式以及不参与渲染的容器。
//! 有真实布局信息的宿主可以注入自己的 [`VisibilityProbe`]。

use markup5ever_rcdom::Handle;

use super::dom::{get_node_attr, get_node_name};

/// 不会被渲染的容器元素
pub const NON_RENDERED_TAGS: [&str; 3] = ["head", "title", "template"];

/// 可见性探测器
pub trait VisibilityProbe: Send + Sync {
    /// 元素自身是否可见（祖先由调用方逐级检查）
    fn is_visible(&self, element: &Handle) -> bool;
}

/// 基于属性与内联样式的默认探测器
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticVisibility;

impl VisibilityProbe for StaticVisibility {
    fn is_visible(&self, element: &Handle) -> bool {
        let Some(name) = get_node_name(element) else {
            return true;
        };
        if NON_RENDERED_TAGS.contains(&name) {
            return false;
        }
        if get_node_attr(element, "hidden").is_some() {
            return false;
        }

        match get_node_attr(element, "style") {
            Some(style) => !style_hides(&style),
            None => true,
        }
    }
}

/// 内联样式是否让元素不可见
pub fn style_hides(style: &str) -> bool {
    style.split(';').any(|declaration| {
        let Some((property, value)) = declaration.split_once(':') else {
            return false;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();

        match property.as_str() {
            "display" => value == "none",
            "visibility" => value == "hidden" || value == "collapse",
            "width" | "height" => is_zero_length(&value),
            _ => false,
        }
    })
}

fn is_zero_length(value: &str) -> bool {
    let number = value.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
    number.parse::<f64>().map(|n| n == 0.0).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_hides() {
        assert!(style_hides("display: none"));
        assert!(style_hides("color: red; DISPLAY:NONE !important;"));
        assert!(style_hides("visibility:hidden"));
        assert!(style_hides("width: 0px"));
        assert!(style_hides("height:0"));

        assert!(!style_hides("display: block"));
        assert!(!style_hides("width: 10px"));
        assert!(!style_hides("width: auto"));
        assert!(!style_hides("garbage"));
    }
}

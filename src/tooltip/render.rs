//! 提示框 HTML 渲染

use super::session::{TooltipPhase, TooltipView};
use crate::parsers::html::utils::escape_html;

pub const LOADING_TEXT: &str = "Loading…";
pub const ERROR_TEXT: &str = "No meaning available.";
pub const SOURCE_BUILTIN: &str = "via built-in lookup";
pub const STATUS_ADDED: &str = "Added ✓";

/// 渲染提示框内容；隐藏时为空串
pub fn render_tooltip(view: &TooltipView) -> String {
    match view.phase() {
        TooltipPhase::Hidden => String::new(),
        TooltipPhase::Loading => LOADING_TEXT.to_string(),
        TooltipPhase::Error => ERROR_TEXT.to_string(),
        TooltipPhase::Ready => render_ready(view),
    }
}

fn render_ready(view: &TooltipView) -> String {
    let mut html = String::new();

    html.push_str("<div class=\"lexi-head\"><div class=\"lexi-word-row\">");
    html.push_str(&format!(
        "<span class=\"lexi-word\">{}</span>",
        escape_html(&view.session.word)
    ));
    html.push_str("<button class=\"lexi-btn lexi-audio\" title=\"Pronounce\">🔈</button>");
    html.push_str(&format!(
        "<span class=\"lexi-pos\">{}</span>",
        escape_html(&view.part_of_speech)
    ));
    html.push_str("<div class=\"lexi-spacer\"></div>");
    html.push_str("<button class=\"lexi-btn\" id=\"lexi-add\" title=\"Add to deck\">+ Add</button>");
    html.push_str("<button class=\"lexi-btn\" id=\"lexi-close\" title=\"Close\">✕</button>");
    html.push_str("</div></div>");

    html.push_str(&format!(
        "<div class=\"lexi-mean\">{}</div>",
        escape_html(&view.meaning)
    ));

    if let Some(translation) = &view.translation {
        html.push_str(&format!(
            "<div class=\"lexi-mean-zh\">{}</div>",
            escape_html(translation)
        ));
    }

    // 例句 HTML 在提取时已转义
    if let Some(example) = &view.example {
        html.push_str("<div class=\"lexi-ex\"><div class=\"ex-label\">Example</div>");
        html.push_str(&format!("<div class=\"ex-text\">{}</div></div>", example.html));
    }

    html.push_str(&format!(
        "<div class=\"lexi-source\">{}</div>",
        escape_html(view.status.as_deref().unwrap_or(SOURCE_BUILTIN))
    ));

    html
}

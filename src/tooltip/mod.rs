//! 提示框
//!
//! - **session**: 会话序号、阶段与内容快照
//! - **services**: 宿主绑定、释义、生词本等外部协作者
//! - **controller**: 悬停/点击/关闭的状态机
//! - **render**: 提示框 HTML

pub mod controller;
pub mod render;
pub mod services;
pub mod session;

pub use controller::{
    ClickOutcome, CloseReason, MarkerEvent, TooltipController, TooltipServices, TooltipSettings,
};
pub use render::render_tooltip;
pub use services::{
    clean_meaning, Definition, DefinitionProvider, ExtensionContext, HostBinding, MiniDictionary,
    VocabEntry, VocabExample, VocabularyStore, DEFAULT_DECK,
};
pub use session::{LookupRequest, SessionCounter, TooltipPhase, TooltipSession, TooltipView};

//! 文本处理：分词、词表与分类

pub mod classifier;
pub mod tokenizer;
pub mod wordlists;

pub use classifier::{classify, Classifier, HighlightMode};
pub use tokenizer::{tokenize, Token, TokenKind, Tokens};
pub use wordlists::{
    FsWordlistSource, WordlistCategory, WordlistSet, WordlistSnapshot, WordlistSource,
    WordlistStore,
};

//! 配置管理模块
//!
//! 支持配置文件（TOML/JSON）、`.env`、环境变量和默认值

use std::path::PathBuf;

pub mod manager;

pub use manager::{ConfigManager, LexiConfig};

pub const DEFAULT_SOURCE_LANG: &str = "en";
pub const DEFAULT_TARGET_LANG: &str = "zh-CN";
pub const DEFAULT_CLICK_TIMEOUT_MS: u64 = 600;
pub const DEFAULT_WORDLIST_DIR: &str = "assets/lists";
pub const DEFAULT_API_URL: &str = "http://localhost:1188/translate";

/// 配置文件搜索路径
pub const CONFIG_PATHS: &[&str] = &[
    "lexi.toml",
    ".lexi.toml",
    "lexi.json",
    "~/.config/lexi/config.toml",
    "/etc/lexi/config.toml",
];

/// 按搜索顺序返回第一个存在的配置文件
pub fn find_config_file() -> Option<PathBuf> {
    CONFIG_PATHS
        .iter()
        .map(|path| PathBuf::from(shellexpand::tilde(path).into_owned()))
        .find(|path| path.exists())
}

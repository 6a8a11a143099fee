//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，所有变量以 `LEXI_` 为前缀

use std::env;
use std::fmt;
use std::time::Duration;

use crate::text::classifier::HighlightMode;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::DEFAULT.ok_or_else(|| EnvError {
                variable: Self::NAME.to_string(),
                message: "Required environment variable not set".to_string(),
            }),
        }
    }

    /// 仅在变量被显式设置时返回值，用于覆盖配置文件
    fn get_set() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "LEXI_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// 高亮相关环境变量
pub mod highlight {
    use super::*;

    /// 学习模式开关
    pub struct LearningMode;
    impl EnvVar<bool> for LearningMode {
        const NAME: &'static str = "LEXI_LEARNING_MODE";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Highlight vocabulary on the page";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 高亮模式
    pub struct Mode;
    impl EnvVar<HighlightMode> for Mode {
        const NAME: &'static str = "LEXI_HIGHLIGHT_MODE";
        const DEFAULT: Option<HighlightMode> = Some(HighlightMode::Basic);
        const DESCRIPTION: &'static str = "Highlight mode: basic, exam-only";

        fn parse(value: &str) -> EnvResult<HighlightMode> {
            value.parse().map_err(|e: crate::error::LexiError| EnvError {
                variable: Self::NAME.to_string(),
                message: e.to_string(),
            })
        }
    }

    /// 词表目录
    pub struct WordlistDir;
    impl EnvVar<String> for WordlistDir {
        const NAME: &'static str = "LEXI_WORDLIST_DIR";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Directory containing the wordlist files";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::config::DEFAULT_WORDLIST_DIR.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let dir = value.trim();
            if dir.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Directory cannot be empty".to_string(),
                });
            }
            Ok(shellexpand::tilde(dir).into_owned())
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// 目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "LEXI_TARGET_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Target language for translation (BCP 47 tag)";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::config::DEFAULT_TARGET_LANG.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_lang_tag(value, Self::NAME)
        }
    }

    /// 源语言
    pub struct SourceLang;
    impl EnvVar<String> for SourceLang {
        const NAME: &'static str = "LEXI_SOURCE_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Source language of the pages being read";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::config::DEFAULT_SOURCE_LANG.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_lang_tag(value, Self::NAME)
        }
    }

    /// 点击翻译超时
    pub struct ClickTimeout;
    impl EnvVar<Duration> for ClickTimeout {
        const NAME: &'static str = "LEXI_CLICK_TIMEOUT_MS";
        const DEFAULT: Option<Duration> =
            Some(Duration::from_millis(crate::config::DEFAULT_CLICK_TIMEOUT_MS));
        const DESCRIPTION: &'static str =
            "Milliseconds to wait for a click translation before opening the web fallback";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis = parse_positive_u64(value, Self::NAME, 50, 60_000)?;
            Ok(Duration::from_millis(millis))
        }
    }

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "LEXI_TRANSLATION_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Translation API endpoint URL";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::config::DEFAULT_API_URL.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_u64(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<u64> {
    let num: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

// 形如 en、zh-CN、pt-BR
fn parse_lang_tag(value: &str, var_name: &str) -> EnvResult<String> {
    let tag = value.trim();
    let mut parts = tag.split('-');
    let primary = parts.next().unwrap_or_default();
    let primary_ok = (2..=3).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_alphabetic());
    let rest_ok = parts.all(|p| (2..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()));

    if primary_ok && rest_ok {
        Ok(tag.to_string())
    } else {
        Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid language tag '{}'", value),
        })
    }
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub log_level: String,
    pub learning_mode: bool,
    pub highlight_mode: HighlightMode,
    pub wordlist_dir: String,
    pub source_lang: String,
    pub target_lang: String,
    pub click_timeout: Duration,
    pub translation_api_url: String,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            learning_mode: highlight::LearningMode::get()?,
            highlight_mode: highlight::Mode::get()?,
            wordlist_dir: highlight::WordlistDir::get()?,
            source_lang: translation::SourceLang::get()?,
            target_lang: translation::TargetLang::get()?,
            click_timeout: translation::ClickTimeout::get()?,
            translation_api_url: translation::ApiUrl::get()?,
        })
    }

    /// 打印配置摘要
    pub fn print_summary(&self) {
        println!("Environment Configuration Summary:");
        println!("  Log Level: {}", self.log_level);
        println!(
            "  Learning Mode: {}",
            if self.learning_mode { "on" } else { "off" }
        );
        println!("  Highlight Mode: {}", self.highlight_mode);
        println!("  Wordlist Dir: {}", self.wordlist_dir);
        println!("  Languages: {} -> {}", self.source_lang, self.target_lang);
        println!("  Click Timeout: {}ms", self.click_timeout.as_millis());
        println!("  Translation API: {}", self.translation_api_url);
    }
}

fn doc_line(name: &str, description: &str, default: &dyn fmt::Debug) -> String {
    format!("- `{}`: {} (default: {:?})\n", name, description, default)
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    docs.push_str(&doc_line(core::LogLevel::NAME, core::LogLevel::DESCRIPTION, &"info"));

    docs.push_str("\n## Highlight Configuration\n\n");
    docs.push_str(&doc_line(
        highlight::LearningMode::NAME,
        highlight::LearningMode::DESCRIPTION,
        &highlight::LearningMode::DEFAULT,
    ));
    docs.push_str(&doc_line(
        highlight::Mode::NAME,
        highlight::Mode::DESCRIPTION,
        &highlight::Mode::DEFAULT,
    ));
    docs.push_str(&doc_line(
        highlight::WordlistDir::NAME,
        highlight::WordlistDir::DESCRIPTION,
        &crate::config::DEFAULT_WORDLIST_DIR,
    ));

    docs.push_str("\n## Translation Configuration\n\n");
    docs.push_str(&doc_line(
        translation::SourceLang::NAME,
        translation::SourceLang::DESCRIPTION,
        &crate::config::DEFAULT_SOURCE_LANG,
    ));
    docs.push_str(&doc_line(
        translation::TargetLang::NAME,
        translation::TargetLang::DESCRIPTION,
        &crate::config::DEFAULT_TARGET_LANG,
    ));
    docs.push_str(&doc_line(
        translation::ClickTimeout::NAME,
        translation::ClickTimeout::DESCRIPTION,
        &crate::config::DEFAULT_CLICK_TIMEOUT_MS,
    ));
    docs.push_str(&doc_line(
        translation::ApiUrl::NAME,
        translation::ApiUrl::DESCRIPTION,
        &crate::config::DEFAULT_API_URL,
    ));

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert!(core::LogLevel::parse("loud").is_err());
    }

    #[test]
    fn test_boolean_parsing() {
        assert!(highlight::LearningMode::parse("true").unwrap());
        assert!(highlight::LearningMode::parse("1").unwrap());
        assert!(highlight::LearningMode::parse("YES").unwrap());
        assert!(!highlight::LearningMode::parse("off").unwrap());
        assert!(!highlight::LearningMode::parse("disabled").unwrap());

        assert!(highlight::LearningMode::parse("maybe").is_err());
    }

    #[test]
    fn test_highlight_mode_parsing() {
        assert_eq!(highlight::Mode::parse("basic").unwrap(), HighlightMode::Basic);
        assert_eq!(highlight::Mode::parse("gre-only").unwrap(), HighlightMode::ExamOnly);

        let err = highlight::Mode::parse("rainbow").unwrap_err();
        assert_eq!(err.variable, "LEXI_HIGHLIGHT_MODE");
        assert!(err.message.contains("rainbow"), "message should name the mode: {}", err.message);
    }

    #[test]
    fn test_language_tags() {
        assert_eq!(translation::TargetLang::parse(" zh-CN ").unwrap(), "zh-CN");
        assert_eq!(translation::SourceLang::parse("en").unwrap(), "en");
        assert!(translation::TargetLang::parse("").is_err());
        assert!(translation::TargetLang::parse("chinese simplified").is_err());
        assert!(translation::TargetLang::parse("zh-").is_err());
    }

    #[test]
    fn test_click_timeout_range() {
        assert_eq!(
            translation::ClickTimeout::parse("600").unwrap(),
            Duration::from_millis(600)
        );
        assert!(translation::ClickTimeout::parse("0").is_err());
        assert!(translation::ClickTimeout::parse("600000").is_err());
        assert!(translation::ClickTimeout::parse("soon").is_err());
    }

    #[test]
    fn test_url_validation() {
        assert!(translation::ApiUrl::parse("http://localhost:1188/translate").is_ok());
        assert!(translation::ApiUrl::parse("https://api.example.com").is_ok());
        assert!(translation::ApiUrl::parse("ftp://example.com").is_err());
    }

    #[test]
    fn test_env_docs_list_every_variable() {
        let docs = generate_env_docs();
        for name in [
            "LEXI_LOG_LEVEL",
            "LEXI_LEARNING_MODE",
            "LEXI_HIGHLIGHT_MODE",
            "LEXI_WORDLIST_DIR",
            "LEXI_SOURCE_LANG",
            "LEXI_TARGET_LANG",
            "LEXI_CLICK_TIMEOUT_MS",
            "LEXI_TRANSLATION_API_URL",
        ] {
            assert!(docs.contains(name), "docs should mention {}", name);
        }
    }
}

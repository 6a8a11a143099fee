//! 配置管理器
//!
//! 读取顺序：`.env` 文件 → 配置文件 → 环境变量覆盖 → 校验

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{
    find_config_file, DEFAULT_API_URL, DEFAULT_CLICK_TIMEOUT_MS, DEFAULT_SOURCE_LANG,
    DEFAULT_TARGET_LANG, DEFAULT_WORDLIST_DIR,
};
use crate::error::{helpers::config_error, LexiResult};
use crate::text::classifier::HighlightMode;
use crate::translation::fallback::DEFAULT_FALLBACK_BASE_URL;

/// LexiLearn 配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LexiConfig {
    /// 学习模式：开启时高亮页面词汇
    #[serde(alias = "enabled")]
    pub learning_mode: bool,
    pub highlight_mode: HighlightMode,
    pub source_lang: String,
    pub target_lang: String,
    pub click_translate_timeout_ms: u64,
    pub wordlist_dir: String,
    pub translation_api_url: String,
    pub fallback_base_url: String,
}

impl Default for LexiConfig {
    fn default() -> Self {
        Self {
            learning_mode: true,
            highlight_mode: HighlightMode::Basic,
            source_lang: DEFAULT_SOURCE_LANG.to_string(),
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            click_translate_timeout_ms: DEFAULT_CLICK_TIMEOUT_MS,
            wordlist_dir: DEFAULT_WORDLIST_DIR.to_string(),
            translation_api_url: DEFAULT_API_URL.to_string(),
            fallback_base_url: DEFAULT_FALLBACK_BASE_URL.to_string(),
        }
    }
}

impl LexiConfig {
    /// 验证配置
    pub fn validate(&self) -> LexiResult<()> {
        if self.source_lang.trim().is_empty() {
            return Err(config_error("源语言不能为空"));
        }

        if self.target_lang.trim().is_empty() {
            return Err(config_error("目标语言不能为空"));
        }

        if self.click_translate_timeout_ms == 0 {
            return Err(config_error("点击翻译超时必须大于0"));
        }

        if self.wordlist_dir.trim().is_empty() {
            return Err(config_error("词表目录不能为空"));
        }

        for (name, url) in [
            ("translation_api_url", &self.translation_api_url),
            ("fallback_base_url", &self.fallback_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(config_error(format!("{} 必须以 http:// 或 https:// 开头", name)));
            }
        }

        Ok(())
    }

    /// 应用环境变量覆盖；只有显式设置的变量参与，非法值直接报错
    pub fn apply_env_overrides(&mut self) -> LexiResult<()> {
        use crate::env::{highlight, translation, EnvVar};

        fn take<T>(value: Option<crate::env::EnvResult<T>>) -> LexiResult<Option<T>> {
            value
                .transpose()
                .map_err(|e| config_error(e.to_string()))
        }

        if let Some(learning_mode) = take(highlight::LearningMode::get_set())? {
            self.learning_mode = learning_mode;
        }

        if let Some(mode) = take(highlight::Mode::get_set())? {
            self.highlight_mode = mode;
        }

        if let Some(dir) = take(highlight::WordlistDir::get_set())? {
            self.wordlist_dir = dir;
        }

        if let Some(source_lang) = take(translation::SourceLang::get_set())? {
            self.source_lang = source_lang;
        }

        if let Some(target_lang) = take(translation::TargetLang::get_set())? {
            self.target_lang = target_lang;
        }

        if let Some(timeout) = take(translation::ClickTimeout::get_set())? {
            self.click_translate_timeout_ms = timeout.as_millis() as u64;
        }

        if let Some(api_url) = take(translation::ApiUrl::get_set())? {
            tracing::info!("[Lexi] 环境变量覆盖 API URL: {}", api_url);
            self.translation_api_url = api_url;
        }

        Ok(())
    }

    pub fn click_timeout(&self) -> Duration {
        Duration::from_millis(self.click_translate_timeout_ms)
    }

    /// 展开 `~` 后的词表目录
    pub fn wordlist_path(&self) -> String {
        shellexpand::tilde(&self.wordlist_dir).into_owned()
    }
}

/// 配置管理器
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: LexiConfig,
}

impl ConfigManager {
    /// 加载 `.env`、搜索配置文件、应用环境变量覆盖并校验
    pub fn new() -> LexiResult<Self> {
        Self::load_dotenv();
        let config = Self::load_config()?;
        Self::finish(config)
    }

    /// 从指定文件加载（仍然应用环境变量覆盖）
    pub fn from_path<P: AsRef<Path>>(path: P) -> LexiResult<Self> {
        Self::load_dotenv();
        let config = Self::load_from_file(path.as_ref())?;
        Self::finish(config)
    }

    fn finish(mut config: LexiConfig) -> LexiResult<Self> {
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &LexiConfig {
        &self.config
    }

    pub fn into_config(self) -> LexiConfig {
        self.config
    }

    fn load_config() -> LexiResult<LexiConfig> {
        match find_config_file() {
            Some(path) => {
                tracing::info!("[Lexi] 加载配置文件: {}", path.display());
                Self::load_from_file(&path)
            }
            None => {
                tracing::info!("[Lexi] 未找到配置文件，使用默认配置");
                Ok(LexiConfig::default())
            }
        }
    }

    /// 按扩展名解析 TOML 或 JSON
    pub fn load_from_file(path: &Path) -> LexiResult<LexiConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("读取配置文件失败 {}: {}", path.display(), e)))?;

        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content)
                .map_err(|e| config_error(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content).map_err(|e| config_error(format!("解析TOML配置失败: {}", e)))
        }
    }

    fn load_dotenv() {
        let env_files = [".env.local", ".env.development", ".env.production", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("[Lexi] 已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> LexiResult<()> {
        let content = toml::to_string_pretty(&LexiConfig::default())
            .map_err(|e| config_error(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| config_error(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}

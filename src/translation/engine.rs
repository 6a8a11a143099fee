//! 翻译引擎抽象
//!
//! 引擎负责创建针对某一语言对的翻译器句柄；句柄创建昂贵、复用廉价。

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::LexiResult;

/// 语言对
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// 翻译器缓存键，例如 `en->zh-CN`
    pub fn key(&self) -> String {
        format!("{}->{}", self.source, self.target)
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// 已创建的翻译器
pub trait TranslatorHandle: Send + Sync {
    fn translate(&self, text: &str) -> BoxFuture<'static, LexiResult<String>>;
}

/// 翻译引擎
pub trait TranslationEngine: Send + Sync {
    /// 运行时能力探测
    fn is_available(&self) -> bool {
        true
    }

    fn create(&self, pair: LanguagePair) -> BoxFuture<'static, LexiResult<Arc<dyn TranslatorHandle>>>;
}

/// 不可用的引擎（宿主不提供翻译能力时使用）
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEngine;

impl TranslationEngine for UnavailableEngine {
    fn is_available(&self) -> bool {
        false
    }

    fn create(&self, pair: LanguagePair) -> BoxFuture<'static, LexiResult<Arc<dyn TranslatorHandle>>> {
        Box::pin(async move {
            Err(crate::error::LexiError::TranslatorUnavailable(format!(
                "没有可用的翻译引擎: {}",
                pair
            )))
        })
    }
}

#[cfg(feature = "http")]
pub use http::HttpTranslationEngine;

#[cfg(feature = "http")]
mod http {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::BoxFuture;
    use serde::{Deserialize, Serialize};

    use super::{LanguagePair, TranslationEngine, TranslatorHandle};
    use crate::error::{LexiError, LexiResult};

    #[derive(Serialize)]
    struct TranslateRequest<'a> {
        text: &'a str,
        source_lang: &'a str,
        target_lang: &'a str,
    }

    #[derive(Deserialize)]
    struct TranslateResponse {
        code: i64,
        #[serde(default)]
        data: Option<String>,
        #[serde(default)]
        message: Option<String>,
    }

    /// DeepLX 风格的 HTTP 翻译引擎
    ///
    /// 请求 `POST {text, source_lang, target_lang}`，响应 `{code, data}`，`code == 200` 为成功。
    #[derive(Debug, Clone)]
    pub struct HttpTranslationEngine {
        client: reqwest::Client,
        api_url: String,
    }

    impl HttpTranslationEngine {
        pub fn new(api_url: impl Into<String>, timeout: Duration) -> LexiResult<Self> {
            let client = reqwest::Client::builder().timeout(timeout).build()?;
            Ok(Self {
                client,
                api_url: api_url.into(),
            })
        }

        pub fn api_url(&self) -> &str {
            &self.api_url
        }
    }

    impl TranslationEngine for HttpTranslationEngine {
        fn create(
            &self,
            pair: LanguagePair,
        ) -> BoxFuture<'static, LexiResult<Arc<dyn TranslatorHandle>>> {
            let handle = HttpTranslator {
                client: self.client.clone(),
                api_url: self.api_url.clone(),
                pair,
            };
            Box::pin(async move { Ok(Arc::new(handle) as Arc<dyn TranslatorHandle>) })
        }
    }

    struct HttpTranslator {
        client: reqwest::Client,
        api_url: String,
        pair: LanguagePair,
    }

    impl TranslatorHandle for HttpTranslator {
        fn translate(&self, text: &str) -> BoxFuture<'static, LexiResult<String>> {
            let client = self.client.clone();
            let api_url = self.api_url.clone();
            let pair = self.pair.clone();
            let text = text.to_string();

            Box::pin(async move {
                let response = client
                    .post(&api_url)
                    .json(&TranslateRequest {
                        text: &text,
                        source_lang: &pair.source,
                        target_lang: &pair.target,
                    })
                    .send()
                    .await?;

                if !response.status().is_success() {
                    return Err(LexiError::TranslationServiceError(format!(
                        "HTTP {}",
                        response.status()
                    )));
                }

                let body: TranslateResponse = response.json().await?;
                if body.code != 200 {
                    return Err(LexiError::TranslationServiceError(format!(
                        "code {}: {}",
                        body.code,
                        body.message.unwrap_or_default()
                    )));
                }

                Ok(body.data.unwrap_or_default())
            })
        }
    }
}

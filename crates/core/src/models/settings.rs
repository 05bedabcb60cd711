use std::env;

use crate::errors::CoreError;

/// Library configuration, read from the environment.
///
/// Two secrets are required: the financial-statements API key and the
/// LLM API key. The ratio and news providers are optional — operations
/// that need an unconfigured provider fail with `CoreError::NoProvider`.
#[derive(Debug, Clone)]
pub struct Settings {
    /// financialmodelingprep.com API key (statements + profiles). Required.
    pub fmp_api_key: String,
    /// OpenAI API key (narrative analysis + sentiment). Required.
    pub openai_api_key: String,
    /// finnhub.io API key (ratios + peers).
    pub finnhub_api_key: Option<String>,
    /// polygon.io API key (news).
    pub polygon_api_key: Option<String>,
    /// Chat model identifier override. Defaults to "gpt-4".
    pub openai_model: Option<String>,
    /// Chat-completion base URL override (e.g. a proxy).
    pub openai_base_url: Option<String>,
    /// LLM request timeout override, in seconds.
    pub openai_timeout_secs: Option<u64>,
}

impl Settings {
    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            fmp_api_key: require_env("FMP_API_KEY")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            finnhub_api_key: optional_env("FINNHUB_API_KEY"),
            polygon_api_key: optional_env("POLYGON_API_KEY"),
            openai_model: optional_env("OPENAI_MODEL"),
            openai_base_url: optional_env("OPENAI_BASE_URL"),
            openai_timeout_secs: optional_env("OPENAI_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok()),
        })
    }

    /// Programmatic construction with just the two required secrets.
    pub fn new(fmp_api_key: impl Into<String>, openai_api_key: impl Into<String>) -> Self {
        Self {
            fmp_api_key: fmp_api_key.into(),
            openai_api_key: openai_api_key.into(),
            finnhub_api_key: None,
            polygon_api_key: None,
            openai_model: None,
            openai_base_url: None,
            openai_timeout_secs: None,
        }
    }
}

fn require_env(name: &str) -> Result<String, CoreError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CoreError::Configuration(name.to_string())),
    }
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

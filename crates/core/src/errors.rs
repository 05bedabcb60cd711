use thiserror::Error;

/// Unified error type for the entire finsight-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input validation (checked before any network call) ──────────
    #[error("\"{0}\" is a mandatory field")]
    MissingField(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Missing required environment variable: {0}")]
    Configuration(String),

    #[error("No provider configured for {0}")]
    NoProvider(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api { provider: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    EmptyResult(String),

    // ── LLM ─────────────────────────────────────────────────────────
    #[error("LLM error: {0}")]
    Llm(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs to prevent
        // API key leakage. reqwest errors often contain full URLs with secrets.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

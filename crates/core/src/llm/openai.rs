use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::settings::Settings;

use super::{CompletionRequest, LlmClient};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Literal returned when the API answers with no completion choices.
pub const NO_RESPONSE_FALLBACK: &str = "No response from the model.";

/// OpenAI chat-completion client.
///
/// Every request is the same two-message exchange: a fixed system
/// message plus the caller's prompt. Token budget and sampling
/// parameters ride along unchanged from the request.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, CoreError> {
        let timeout_secs = settings.openai_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CoreError::Llm(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: settings.openai_api_key.clone(),
            base_url: settings
                .openai_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: settings
                .openai_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// First choice's message content, trimmed; the literal fallback when
    /// the completion list is empty.
    fn response_text(resp: ChatCompletionResponse) -> String {
        resp.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content.trim().to_string())
            .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string())
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, CoreError> {
        tracing::info!(
            model = %self.model,
            max_tokens = request.max_tokens,
            prompt_chars = request.prompt.len(),
            "sending chat completion request"
        );

        let body = ChatCompletionBody {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.sampling.temperature,
            top_p: request.sampling.top_p,
            frequency_penalty: request.sampling.frequency_penalty,
        };

        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::Llm(e.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| CoreError::Llm(e.to_string()))?;

        if !status.is_success() {
            // Surface the API's own message when the body carries one.
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("status={status}: {text}"));
            return Err(CoreError::Llm(message));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text).map_err(|e| {
            CoreError::Llm(format!("failed to decode chat completion response: {e}"))
        })?;

        Ok(Self::response_text(parsed))
    }
}

// ── OpenAI wire types ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionBody {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

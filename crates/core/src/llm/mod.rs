pub mod openai;

use async_trait::async_trait;

use crate::errors::CoreError;

/// Static sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 1.0,
            frequency_penalty: 0.5,
        }
    }
}

/// One prompt plus its token budget and sampling parameters.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub sampling: SamplingParams,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            sampling: SamplingParams::default(),
        }
    }
}

/// Chat-completion client abstraction. Tests swap in a recording mock;
/// production uses `openai::OpenAiClient`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Human-readable name of this client (for logs/errors).
    fn name(&self) -> &str;

    /// Send one prompt and return the trimmed response text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CoreError>;
}

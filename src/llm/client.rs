//! HTTP client for an Ollama-compatible endpoint
//!
//! Error policy: any transport failure or non-success status collapses into
//! a fixed apology string. Callers never see an error from this boundary.

use crate::llm::config::LlmConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Reply substituted for any failed request
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I encountered an error while processing your request.";

/// One entry of a chat-endpoint history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_ctx: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

/// Client for the local generation endpoint
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();

        Self { config, http }
    }

    /// Single-turn generation. Returns the response text, or the fallback
    /// reply if anything at all goes wrong.
    pub async fn generate(&self, prompt: &str) -> String {
        match self.try_generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Generate request failed: {e}");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    /// Chat-style generation over a message history. Same fallback policy
    /// as `generate`.
    pub async fn chat(&self, messages: &[ChatMessage]) -> String {
        match self.try_chat(messages).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Chat request failed: {e}");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn try_generate(&self, prompt: &str) -> Result<String, reqwest::Error> {
        let url = format!("{}/api/generate", self.endpoint_base());
        debug!("POST {url} ({} chars)", prompt.len());

        let body = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_ctx: self.config.num_ctx,
            },
        };

        let response: GenerateResponse = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.response)
    }

    async fn try_chat(&self, messages: &[ChatMessage]) -> Result<String, reqwest::Error> {
        let url = format!("{}/api/chat", self.endpoint_base());
        debug!("POST {url} ({} messages)", messages.len());

        let body = ChatRequest {
            model: &self.config.model,
            messages,
            stream: false,
        };

        let response: ChatResponse = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.message.content)
    }

    fn endpoint_base(&self) -> &str {
        self.config.endpoint.trim_end_matches('/')
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

use std::time::Duration;

/// Configuration for the LLM endpoint client
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of the generation endpoint
    pub endpoint: String,
    /// Model identifier passed with every request
    pub model: String,
    /// Context window requested for single-turn generation
    pub num_ctx: u32,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "qwen2:0.5b".to_string(),
            num_ctx: 4096,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl LlmConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("Endpoint URL is required".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("Model name is required".to_string());
        }
        Ok(())
    }
}

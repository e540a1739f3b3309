//! Application configuration
//!
//! Centralized configuration for the capture source, LLM endpoint, and
//! spoken-reply behavior. There is no config file; defaults match the
//! hardcoded values the UI was designed against.

use crate::llm::LlmConfig;

/// Which capture pipeline feeds voice mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    /// Timer-driven fabricated input ending in a canned phrase
    Simulated,
    /// A platform speech recognizer, when one is available
    Live,
}

/// Which endpoint operation requests go through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStyle {
    /// Single-turn `/api/generate` calls
    Generate,
    /// `/api/chat` calls carrying a one-message history
    Chat,
}

/// Configuration for the complete application
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// LLM endpoint configuration
    pub llm: LlmConfig,

    /// Capture pipeline selection
    pub capture: CaptureSource,

    /// Endpoint operation selection
    pub api: ApiStyle,

    /// Whether assistant replies are spoken aloud after they arrive
    pub speak_replies: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            capture: CaptureSource::Simulated,
            api: ApiStyle::Generate,
            speak_replies: false,
        }
    }
}

impl AppConfig {
    /// Use the live capture pipeline and chat endpoint with spoken replies
    pub fn voice_first() -> Self {
        Self {
            capture: CaptureSource::Live,
            api: ApiStyle::Chat,
            speak_replies: true,
            ..Self::default()
        }
    }

    pub fn with_llm(mut self, llm: LlmConfig) -> Self {
        self.llm = llm;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.llm.validate()
    }
}

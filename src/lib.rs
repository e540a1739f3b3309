pub mod capture;
pub mod config;
pub mod llm;
pub mod messages;
pub mod speech;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PatterError {
    #[error("Capture error: {0}")]
    CaptureError(String),

    #[error("Speech synthesis error: {0}")]
    SynthesisError(String),

    #[error("LLM endpoint error: {0}")]
    EndpointError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl PatterError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // A capture session can simply be restarted
            PatterError::CaptureError(_) => true,
            PatterError::SynthesisError(_) => true,
            // The endpoint may come back between requests
            PatterError::EndpointError(_) => true,
            PatterError::ConfigError(_) => false,
            PatterError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            PatterError::CaptureError(_) => {
                "Voice capture failed. Please try again.".to_string()
            }
            PatterError::SynthesisError(_) => {
                "Text-to-speech failed. Response will be shown as text.".to_string()
            }
            PatterError::EndpointError(_) => {
                "The assistant endpoint is unreachable. Please check it is running.".to_string()
            }
            PatterError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            PatterError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PatterError>;

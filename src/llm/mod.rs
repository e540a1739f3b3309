//! LLM endpoint integration
//!
//! A thin HTTP client for a local Ollama-compatible endpoint plus a
//! channel-based worker pipeline that keeps requests off the UI thread.

pub mod client;
pub mod config;
pub mod worker;

pub use client::{ChatMessage, LlmClient, FALLBACK_REPLY};
pub use config::LlmConfig;
pub use worker::{LlmCommand, LlmEvent, LlmPipeline};

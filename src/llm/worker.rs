//! LLM worker pipeline
//!
//! Channel-based interface in front of [`LlmClient`]: the worker thread
//! owns a tokio runtime and blocks on one request at a time, so the UI
//! thread only ever touches channels. Because the client converts every
//! failure into the fallback reply, completion is the only outcome a
//! request can have.

use crate::llm::client::{ChatMessage, LlmClient};
use crate::llm::config::LlmConfig;
use crate::{PatterError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Commands that can be sent to the LLM pipeline
#[derive(Debug, Clone)]
pub enum LlmCommand {
    /// Single-turn generation for the given prompt
    Generate {
        prompt: String,
        request_id: Uuid,
    },

    /// Chat-style generation over a message history
    Chat {
        messages: Vec<ChatMessage>,
        request_id: Uuid,
    },

    /// Shutdown the pipeline
    Shutdown,
}

/// Events emitted by the LLM pipeline
#[derive(Debug, Clone)]
pub enum LlmEvent {
    /// A request finished; `response` is the reply text (possibly the
    /// fallback apology)
    Complete {
        response: String,
        request_id: Uuid,
        total_ms: u64,
    },

    /// Pipeline has shut down
    Shutdown,
}

/// LLM pipeline with channel-based communication
pub struct LlmPipeline {
    config: LlmConfig,
    command_tx: Sender<LlmCommand>,
    command_rx: Receiver<LlmCommand>,
    event_tx: Sender<LlmEvent>,
    event_rx: Receiver<LlmEvent>,
}

impl LlmPipeline {
    pub fn new(config: LlmConfig) -> Self {
        let (command_tx, command_rx) = bounded(16);
        let (event_tx, event_rx) = bounded(16);

        Self {
            config,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    /// Get a sender for commands
    pub fn command_sender(&self) -> Sender<LlmCommand> {
        self.command_tx.clone()
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<LlmEvent> {
        self.event_rx.clone()
    }

    /// Start the pipeline worker thread
    pub fn start_worker(self) -> Result<()> {
        let config = self.config.clone();
        let command_rx = self.command_rx.clone();
        let event_tx = self.event_tx.clone();

        std::thread::Builder::new()
            .name("llm-worker".to_string())
            .spawn(move || {
                info!("LLM worker starting (endpoint: {})", config.endpoint);

                let runtime = match Runtime::new() {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!("Failed to create tokio runtime: {e}");
                        let _ = event_tx.send(LlmEvent::Shutdown);
                        return;
                    }
                };

                let client = LlmClient::new(config);

                while let Ok(command) = command_rx.recv() {
                    match command {
                        LlmCommand::Generate { prompt, request_id } => {
                            let started = Instant::now();
                            let response = runtime.block_on(client.generate(&prompt));
                            send_complete(&event_tx, response, request_id, started);
                        }
                        LlmCommand::Chat {
                            messages,
                            request_id,
                        } => {
                            let started = Instant::now();
                            let response = runtime.block_on(client.chat(&messages));
                            send_complete(&event_tx, response, request_id, started);
                        }
                        LlmCommand::Shutdown => break,
                    }
                }

                info!("LLM worker stopped");
                let _ = event_tx.send(LlmEvent::Shutdown);
            })
            .map_err(|e| PatterError::ChannelError(format!("Failed to spawn LLM worker: {e}")))?;

        Ok(())
    }
}

fn send_complete(
    event_tx: &Sender<LlmEvent>,
    response: String,
    request_id: Uuid,
    started: Instant,
) {
    let total_ms = started.elapsed().as_millis() as u64;
    debug!("Request {request_id} completed in {total_ms}ms");
    let _ = event_tx.send(LlmEvent::Complete {
        response,
        request_id,
        total_ms,
    });
}

use crate::{PatterError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{info, warn};

/// An opaque platform text-to-speech service. `speak` blocks until the
/// utterance has been voiced in full.
pub trait Synthesizer: Send + 'static {
    fn speak(&mut self, text: &str) -> Result<()>;
}

/// Synthesizer that voices nothing and returns immediately. Used when the
/// host has no speech capability, so the speaking phase still completes.
pub struct NullSynthesizer;

impl Synthesizer for NullSynthesizer {
    fn speak(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Commands accepted by the synthesis pipeline
#[derive(Debug, Clone)]
pub enum SynthesisCommand {
    /// Voice the given text
    Speak(String),
    /// Shut down the pipeline worker
    Shutdown,
}

/// Events emitted by the synthesis pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEvent {
    /// The most recent utterance finished (or failed and was skipped)
    Finished,
    /// The pipeline worker has shut down
    Shutdown,
}

/// Synthesis pipeline with channel-based communication
pub struct SynthesisPipeline {
    synthesizer: Box<dyn Synthesizer>,
    command_tx: Sender<SynthesisCommand>,
    command_rx: Receiver<SynthesisCommand>,
    event_tx: Sender<SynthesisEvent>,
    event_rx: Receiver<SynthesisEvent>,
}

impl SynthesisPipeline {
    pub fn new(synthesizer: Box<dyn Synthesizer>) -> Self {
        let (command_tx, command_rx) = bounded(16);
        let (event_tx, event_rx) = bounded(16);

        Self {
            synthesizer,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    /// Get a sender for commands
    pub fn command_sender(&self) -> Sender<SynthesisCommand> {
        self.command_tx.clone()
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<SynthesisEvent> {
        self.event_rx.clone()
    }

    /// Start the pipeline worker thread
    pub fn start_worker(self) -> Result<()> {
        let mut synthesizer = self.synthesizer;
        let command_rx = self.command_rx.clone();
        let event_tx = self.event_tx.clone();

        std::thread::Builder::new()
            .name("synthesis-worker".to_string())
            .spawn(move || {
                info!("Synthesis worker starting");

                while let Ok(command) = command_rx.recv() {
                    match command {
                        SynthesisCommand::Speak(text) => {
                            if let Err(e) = synthesizer.speak(&text) {
                                warn!("Synthesis failed, showing text only: {e}");
                            }
                            let _ = event_tx.send(SynthesisEvent::Finished);
                        }
                        SynthesisCommand::Shutdown => break,
                    }
                }

                info!("Synthesis worker stopped");
                let _ = event_tx.send(SynthesisEvent::Shutdown);
            })
            .map_err(|e| {
                PatterError::ChannelError(format!("Failed to spawn synthesis worker: {e}"))
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingSynthesizer {
        spoken: Arc<AtomicUsize>,
    }

    impl Synthesizer for CountingSynthesizer {
        fn speak(&mut self, _text: &str) -> crate::Result<()> {
            self.spoken.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingSynthesizer;

    impl Synthesizer for FailingSynthesizer {
        fn speak(&mut self, _text: &str) -> crate::Result<()> {
            Err(crate::PatterError::SynthesisError("no voice".to_string()))
        }
    }

    #[test]
    fn test_each_utterance_reports_finished() {
        let spoken = Arc::new(AtomicUsize::new(0));
        let pipeline = SynthesisPipeline::new(Box::new(CountingSynthesizer {
            spoken: spoken.clone(),
        }));
        let commands = pipeline.command_sender();
        let events = pipeline.event_receiver();
        pipeline.start_worker().unwrap();

        commands
            .send(SynthesisCommand::Speak("hello".to_string()))
            .unwrap();
        commands
            .send(SynthesisCommand::Speak("again".to_string()))
            .unwrap();

        for _ in 0..2 {
            assert_eq!(
                events.recv_timeout(Duration::from_secs(2)).unwrap(),
                SynthesisEvent::Finished
            );
        }
        assert_eq!(spoken.load(Ordering::SeqCst), 2);

        commands.send(SynthesisCommand::Shutdown).unwrap();
    }

    #[test]
    fn test_failure_still_finishes() {
        let pipeline = SynthesisPipeline::new(Box::new(FailingSynthesizer));
        let commands = pipeline.command_sender();
        let events = pipeline.event_receiver();
        pipeline.start_worker().unwrap();

        commands
            .send(SynthesisCommand::Speak("hello".to_string()))
            .unwrap();
        assert_eq!(
            events.recv_timeout(Duration::from_secs(2)).unwrap(),
            SynthesisEvent::Finished
        );

        commands.send(SynthesisCommand::Shutdown).unwrap();
    }

    #[test]
    fn test_null_synthesizer_finishes_immediately() {
        let pipeline = SynthesisPipeline::new(Box::new(NullSynthesizer));
        let commands = pipeline.command_sender();
        let events = pipeline.event_receiver();
        pipeline.start_worker().unwrap();

        commands
            .send(SynthesisCommand::Speak("unheard".to_string()))
            .unwrap();
        assert_eq!(
            events.recv_timeout(Duration::from_secs(2)).unwrap(),
            SynthesisEvent::Finished
        );

        commands.send(SynthesisCommand::Shutdown).unwrap();
    }
}
